use chrono::Local;
use comfy_table::{Cell, Table};

use crate::aggregate::PayrollSummary;
use crate::backend::ListQuery;
use crate::cli::{page_footer, Context, ListArgs, PayrollFields};
use crate::derive::Derive;
use crate::error::Result;
use crate::fmt::{balance_label, money, status_label};
use crate::forms::PayrollForm;
use crate::models::{PaymentStatus, PayrollRecord};
use crate::screen::{Screen, Submission};

pub(super) fn print_table(rows: &[&PayrollRecord]) {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Month", "Staff", "Base", "Allowances", "Deductions", "Net", "Status",
    ]);
    for r in rows {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.month),
            Cell::new(&r.staff_name),
            Cell::new(money(r.base_salary)),
            Cell::new(money(r.allowances)),
            Cell::new(money(r.deductions)),
            Cell::new(balance_label(r.net_salary)),
            Cell::new(status_label(r.payment_status)),
        ]);
    }
    println!("Payroll\n{table}");
}

fn print_summary(s: &PayrollSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Net payroll", "Paid", "Pending", "Lines"]);
    table.add_row(vec![
        money(s.total_net),
        money(s.paid),
        money(s.pending),
        s.staff.to_string(),
    ]);
    println!("{table}");
}

fn apply_fields(form: &mut PayrollForm, fields: &PayrollFields) {
    let overrides = [
        (&fields.staff, &mut form.staff_name),
        (&fields.month, &mut form.month),
        (&fields.base, &mut form.base_salary),
        (&fields.allowances, &mut form.allowances),
        (&fields.deductions, &mut form.deductions),
    ];
    for (given, slot) in overrides {
        if let Some(v) = given {
            *slot = v.clone();
        }
    }
    if let Some(s) = fields.status {
        form.payment_status = Some(s.into());
    }
}

pub fn list(ctx: &Context, status: Option<PaymentStatus>, args: &ListArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let mut screen: Screen<PayrollRecord> = ctx.screen();
    screen.load(&store, &ctx.page_query(args.page).with_status(status))?;

    print_table(&screen.visible(args.filter.as_deref().unwrap_or("")));
    println!("{}", page_footer(args.page, screen.page()));

    let all: Screen<PayrollRecord> = ctx.load_all(&store, ListQuery::default())?;
    print_summary(all.summary());
    Ok(())
}

pub fn add(ctx: &Context, fields: &PayrollFields) -> Result<()> {
    let mut form = PayrollForm {
        month: Local::now().date_naive().format("%Y-%m").to_string(),
        ..Default::default()
    };
    apply_fields(&mut form, fields);
    let form = form.derive_with(&ctx.settings.derive_rules());
    let draft = form.validate()?;

    let store = ctx.open_store()?;
    let mut screen: Screen<PayrollRecord> = ctx.load_all(&store, ListQuery::default())?;
    let id = screen.submit(&store, Submission::Create(draft))?;

    if let Some(r) = screen.find(id) {
        println!(
            "Added payroll #{id}: {} for {}, net {}",
            r.staff_name,
            r.month,
            money(r.net_salary)
        );
        if r.net_salary < 0.0 {
            println!("Warning: deductions exceed base salary plus allowances.");
        }
    }
    print_summary(screen.summary());
    Ok(())
}

pub fn update(ctx: &Context, id: i64, fields: &PayrollFields) -> Result<()> {
    let store = ctx.open_store()?;
    let mut form = PayrollForm::from_record(&store.get_payroll(id)?);
    apply_fields(&mut form, fields);
    let form = form.derive_with(&ctx.settings.derive_rules());
    let draft = form.validate()?;

    let mut screen: Screen<PayrollRecord> = ctx.load_all(&store, ListQuery::default())?;
    screen.submit(&store, Submission::Update(id, draft))?;

    if let Some(r) = screen.find(id) {
        println!(
            "Updated payroll #{id}: net {} ({})",
            money(r.net_salary),
            r.payment_status
        );
    }
    print_summary(screen.summary());
    Ok(())
}

pub fn delete(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    let mut screen: Screen<PayrollRecord> = ctx.load_all(&store, ListQuery::default())?;
    screen.submit(&store, Submission::Delete(id))?;
    println!("Deleted payroll #{id}");
    print_summary(screen.summary());
    Ok(())
}

pub fn summary(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let screen: Screen<PayrollRecord> = ctx.load_all(&store, ListQuery::default())?;
    print_summary(screen.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StatusArg;

    #[test]
    fn test_apply_fields_then_derive_net() {
        let mut form = PayrollForm::default();
        apply_fields(
            &mut form,
            &PayrollFields {
                staff: Some("R. Iyer".into()),
                base: Some("50000".into()),
                allowances: Some("5000".into()),
                deductions: Some("2000".into()),
                status: Some(StatusArg::Paid),
                ..Default::default()
            },
        );
        let form = form.derive();
        assert_eq!(form.net_salary, 53000.0);
        assert_eq!(form.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(form.month, "");
    }
}
