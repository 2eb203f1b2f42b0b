use comfy_table::{Cell, Table};

use crate::aggregate::MarkSummary;
use crate::backend::ListQuery;
use crate::cli::{page_footer, Context, ListArgs};
use crate::derive::Derive;
use crate::error::Result;
use crate::fmt::grade_label;
use crate::forms::MarkForm;
use crate::models::{MarkRecord, RecordId};
use crate::screen::{Screen, Submission};

pub(super) fn print_table(rows: &[&MarkRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Student", "Subject", "Exam", "Marks", "%", "Grade"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.student_name),
            Cell::new(&r.subject),
            Cell::new(&r.exam),
            Cell::new(format!("{}/{}", r.marks_obtained, r.max_marks)),
            Cell::new(format!("{:.1}", r.percentage())),
            Cell::new(grade_label(r.grade)),
        ]);
    }
    println!("Marks\n{table}");
}

fn print_summary(s: &MarkSummary) {
    println!(
        "{} marks, average {:.2}, {} passed",
        s.count, s.average, s.pass_count
    );
    if s.distribution.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(s.distribution.keys().map(|g| g.as_str()).collect::<Vec<_>>());
    table.add_row(s.distribution.values().map(|n| n.to_string()).collect::<Vec<_>>());
    println!("{table}");
}

fn student_query(student: Option<RecordId>) -> ListQuery {
    ListQuery::default().with_student(student)
}

pub fn list(ctx: &Context, student: Option<RecordId>, args: &ListArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let mut screen: Screen<MarkRecord> = ctx.screen();
    screen.load(&store, &ctx.page_query(args.page).with_student(student))?;

    print_table(&screen.visible(args.filter.as_deref().unwrap_or("")));
    println!("{}", page_footer(args.page, screen.page()));

    let all: Screen<MarkRecord> = ctx.load_all(&store, student_query(student))?;
    print_summary(all.summary());
    Ok(())
}

pub fn add(
    ctx: &Context,
    student: &str,
    subject: &str,
    exam: &str,
    marks: &str,
    max_marks: Option<&str>,
) -> Result<()> {
    let form = MarkForm {
        student_id: student.to_string(),
        subject: subject.to_string(),
        exam: exam.to_string(),
        marks_obtained: marks.to_string(),
        max_marks: max_marks.unwrap_or_default().to_string(),
        grade: None,
    }
    .derive_with(&ctx.settings.derive_rules());
    let draft = form.validate()?;
    let student_id = draft.student_id;

    let store = ctx.open_store()?;
    let mut screen: Screen<MarkRecord> = ctx.load_all(&store, student_query(Some(student_id)))?;
    let id = screen.submit(&store, Submission::Create(draft))?;

    if let Some(r) = screen.find(id) {
        println!(
            "Added mark #{id}: {} {} {} = {} ({})",
            r.student_name,
            r.subject,
            r.exam,
            r.marks_obtained,
            form.grade_label()
        );
    }
    print_summary(screen.summary());
    Ok(())
}

pub fn delete(ctx: &Context, id: RecordId) -> Result<()> {
    let store = ctx.open_store()?;
    let current = store.get_mark(id)?;
    let mut screen: Screen<MarkRecord> =
        ctx.load_all(&store, student_query(Some(current.student_id)))?;
    screen.submit(&store, Submission::Delete(id))?;
    println!("Deleted mark #{id} ({} {})", current.student_name, current.subject);
    print_summary(screen.summary());
    Ok(())
}

pub fn summary(ctx: &Context, student: Option<RecordId>) -> Result<()> {
    let store = ctx.open_store()?;
    let screen: Screen<MarkRecord> = ctx.load_all(&store, student_query(student))?;
    print_summary(screen.summary());
    Ok(())
}
