use chrono::Local;
use comfy_table::{Cell, Table};

use crate::aggregate::SummaryTotals;
use crate::backend::ListQuery;
use crate::cli::{page_footer, Context, LedgerFields, ListArgs};
use crate::derive::Derive;
use crate::error::Result;
use crate::fmt::{balance_label, money, status_label};
use crate::forms::LedgerForm;
use crate::models::{LedgerKind, LedgerRecord, PaymentStatus};
use crate::screen::{Screen, Submission};

fn heading(kind: Option<LedgerKind>) -> &'static str {
    match kind {
        Some(LedgerKind::Fee) => "Fees",
        Some(LedgerKind::Expense) => "Expenses",
        Some(LedgerKind::Maintenance) => "Maintenance",
        None => "Ledger",
    }
}

pub(super) fn print_table(title: &str, rows: &[&LedgerRecord]) {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Kind", "Party", "Category", "Amount", "Paid", "Balance", "Status",
    ]);
    for r in rows {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(r.date),
            Cell::new(r.kind),
            Cell::new(&r.party),
            Cell::new(&r.category),
            Cell::new(money(r.amount)),
            Cell::new(money(r.paid_amount)),
            Cell::new(balance_label(r.balance)),
            Cell::new(status_label(r.status)),
        ]);
    }
    println!("{title}\n{table}");
}

fn print_summary(s: &SummaryTotals) {
    let mut table = Table::new();
    table.set_header(vec!["Total", "Paid", "Pending"]);
    table.add_row(vec![money(s.total), money(s.paid), money(s.pending)]);
    println!("{table}");
    println!(
        "{} records: {} paid, {} partial, {} pending",
        s.counts.total(),
        s.counts.paid,
        s.counts.partial,
        s.counts.pending
    );
}

/// Copy the flags the user passed over the form. Omitted flags keep the
/// form's current value.
fn apply_fields(form: &mut LedgerForm, fields: &LedgerFields) {
    let overrides = [
        (&fields.student, &mut form.student_id),
        (&fields.party, &mut form.party),
        (&fields.category, &mut form.category),
        (&fields.description, &mut form.description),
        (&fields.amount, &mut form.amount),
        (&fields.paid, &mut form.paid_amount),
        (&fields.date, &mut form.date),
    ];
    for (given, slot) in overrides {
        if let Some(v) = given {
            *slot = v.clone();
        }
    }
    match fields.status {
        Some(s) => form.status = Some(s.into()),
        // New amounts without a status: let the amounts decide again.
        None if fields.amount.is_some() || fields.paid.is_some() => form.status = None,
        None => {}
    }
}

pub fn list(
    ctx: &Context,
    kind: Option<LedgerKind>,
    status: Option<PaymentStatus>,
    args: &ListArgs,
) -> Result<()> {
    let store = ctx.open_store()?;
    let mut screen: Screen<LedgerRecord> = ctx.screen();
    let query = ctx.page_query(args.page).with_kind(kind).with_status(status);
    screen.load(&store, &query)?;

    let rows = screen.visible(args.filter.as_deref().unwrap_or(""));
    print_table(heading(kind), &rows);
    println!("{}", page_footer(args.page, screen.page()));

    // Cards cover every record of the kind, whatever page or status is shown.
    let all: Screen<LedgerRecord> = ctx.load_all(&store, ListQuery::default().with_kind(kind))?;
    print_summary(all.summary());
    Ok(())
}

pub fn add(ctx: &Context, kind: LedgerKind, fields: &LedgerFields) -> Result<()> {
    let mut form = LedgerForm::new(kind);
    form.date = Local::now().date_naive().format("%Y-%m-%d").to_string();
    apply_fields(&mut form, fields);
    let form = form.derive_with(&ctx.settings.derive_rules());
    let draft = form.validate()?;

    let store = ctx.open_store()?;
    let mut screen: Screen<LedgerRecord> =
        ctx.load_all(&store, ListQuery::default().with_kind(Some(kind)))?;
    let id = screen.submit(&store, Submission::Create(draft))?;

    if let Some(r) = screen.find(id) {
        println!(
            "Added {} #{id}: {} {} ({} pending, {})",
            r.kind,
            r.party,
            money(r.amount),
            money(r.balance),
            r.status
        );
    }
    print_summary(screen.summary());
    Ok(())
}

pub fn update(ctx: &Context, id: i64, fields: &LedgerFields) -> Result<()> {
    let store = ctx.open_store()?;
    let current = store.get_ledger(id)?;
    let mut form = LedgerForm::from_record(&current);
    apply_fields(&mut form, fields);
    let form = form.derive_with(&ctx.settings.derive_rules());
    let draft = form.validate()?;

    let mut screen: Screen<LedgerRecord> =
        ctx.load_all(&store, ListQuery::default().with_kind(Some(current.kind)))?;
    screen.submit(&store, Submission::Update(id, draft))?;

    if let Some(r) = screen.find(id) {
        println!(
            "Updated {} #{id}: {} paid of {} ({})",
            r.kind,
            money(r.paid_amount),
            money(r.amount),
            r.status
        );
    }
    print_summary(screen.summary());
    Ok(())
}

pub fn delete(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    let current = store.get_ledger(id)?;
    let mut screen: Screen<LedgerRecord> =
        ctx.load_all(&store, ListQuery::default().with_kind(Some(current.kind)))?;
    screen.submit(&store, Submission::Delete(id))?;

    println!("Deleted {} #{id}", current.kind);
    print_summary(screen.summary());
    Ok(())
}

pub fn summary(ctx: &Context, kind: Option<LedgerKind>) -> Result<()> {
    let store = ctx.open_store()?;
    let screen: Screen<LedgerRecord> = ctx.load_all(&store, ListQuery::default().with_kind(kind))?;
    println!("{}", heading(kind));
    print_summary(screen.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StatusArg;

    #[test]
    fn test_apply_fields_overrides_only_given() {
        let mut form = LedgerForm::new(LedgerKind::Expense);
        form.party = "Stationery Mart".into();
        form.amount = "120".into();
        let fields = LedgerFields {
            paid: Some("120".into()),
            ..Default::default()
        };
        apply_fields(&mut form, &fields);
        assert_eq!(form.party, "Stationery Mart");
        assert_eq!(form.amount, "120");
        assert_eq!(form.paid_amount, "120");
    }

    #[test]
    fn test_new_amounts_clear_stored_status() {
        let mut form = LedgerForm::new(LedgerKind::Fee);
        form.status = Some(PaymentStatus::Pending);
        apply_fields(
            &mut form,
            &LedgerFields {
                amount: Some("500".into()),
                ..Default::default()
            },
        );
        assert_eq!(form.status, None);
    }

    #[test]
    fn test_explicit_status_wins() {
        let mut form = LedgerForm::new(LedgerKind::Fee);
        apply_fields(
            &mut form,
            &LedgerFields {
                paid: Some("0".into()),
                status: Some(StatusArg::Paid),
                ..Default::default()
            },
        );
        assert_eq!(form.status, Some(PaymentStatus::Paid));
    }
}
