//! Sample data for the demo database.
//!
//! Demo mode is always opt-in (`campus demo`, `--demo`) and writes to its
//! own database file. Nothing falls back to this data when a real fetch
//! fails.

use chrono::{Datelike, Local, Months, NaiveDate};

use crate::backend::Backend;
use crate::error::Result;
use crate::models::{
    LedgerDraft, LedgerKind, LedgerRecord, MarkDraft, MarkRecord, PaymentStatus, PayrollDraft,
    PayrollRecord,
};
use crate::store::Store;

// (name, roll number, department)
const STUDENTS: &[(&str, &str, &str)] = &[
    ("Asha Rao", "CS-2023-001", "Computer Science"),
    ("Ben Cole", "ME-2023-014", "Mechanical"),
    ("Chen Wei", "CS-2023-022", "Computer Science"),
    ("Divya Nair", "EE-2023-007", "Electrical"),
    ("Emeka Obi", "CE-2023-031", "Civil"),
    ("Farah Khan", "EE-2023-019", "Electrical"),
    ("Gabriel Silva", "ME-2023-027", "Mechanical"),
    ("Hana Sato", "CS-2023-040", "Computer Science"),
];

// (category, amount)
const FEES: &[(&str, f64)] = &[
    ("Tuition", 45000.0),
    ("Hostel", 18000.0),
    ("Library", 1500.0),
    ("Transport", 6000.0),
];

// (vendor, category, description, amount)
const EXPENSES: &[(&str, &str, &str, f64)] = &[
    ("Sigma Scientific", "Lab supplies", "Glassware restock", 12450.0),
    ("PaperWorks Ltd", "Stationery", "Exam answer booklets", 3800.0),
    ("CityNet", "Utilities", "Campus broadband", 9200.0),
    ("Green Canteen", "Events", "Orientation catering", 15600.0),
];

// (requester, area, description, amount)
const MAINTENANCE: &[(&str, &str, &str, f64)] = &[
    ("Hostel Block A", "Plumbing", "Replace water heater", 7400.0),
    ("Library", "Electrical", "Reading room lighting", 5100.0),
    ("Auditorium", "HVAC", "Annual AC servicing", 11800.0),
];

// (name, base salary, allowances, deductions)
const STAFF: &[(&str, f64, f64, f64)] = &[
    ("Dr. Meera Iyer", 92000.0, 12000.0, 8400.0),
    ("Prof. Daniel Okafor", 85000.0, 9500.0, 7600.0),
    ("Lata Menon", 38000.0, 3000.0, 2100.0),
    ("Ravi Kumar", 26000.0, 1500.0, 1200.0),
];

const SUBJECTS: &[&str] = &["Mathematics", "Physics", "Programming"];
const EXAMS: &[&str] = &["Midterm", "Final"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoCounts {
    pub students: usize,
    pub ledger: usize,
    pub payroll: usize,
    pub marks: usize,
}

fn months_back(today: NaiveDate, n: u32) -> NaiveDate {
    today
        .with_day(1)
        .and_then(|d| d.checked_sub_months(Months::new(n)))
        .unwrap_or(today)
}

fn day_in(month_start: NaiveDate, day: u32) -> NaiveDate {
    month_start.with_day(day).unwrap_or(month_start)
}

/// Spread payments so every status shows up: pending, partial, paid.
fn paid_share(idx: usize) -> f64 {
    match idx % 3 {
        0 => 0.0,
        1 => 0.4,
        _ => 1.0,
    }
}

/// Marks spread across the whole grade table.
fn demo_marks(student: usize, subject: usize, exam: usize) -> f64 {
    (36 + (student * 17 + subject * 11 + exam * 7) % 64) as f64
}

fn clear(store: &Store) -> Result<()> {
    store
        .conn()
        .execute_batch("DELETE FROM marks; DELETE FROM payroll; DELETE FROM ledger; DELETE FROM students;")?;
    Ok(())
}

/// Wipe the demo database and fill it with a term's worth of records.
pub fn seed(store: &Store) -> Result<DemoCounts> {
    seed_as_of(store, Local::now().date_naive())
}

pub fn seed_as_of(store: &Store, today: NaiveDate) -> Result<DemoCounts> {
    clear(store)?;
    let mut counts = DemoCounts::default();

    let mut student_ids = Vec::new();
    for (name, roll, dept) in STUDENTS {
        student_ids.push(store.add_student(name, roll, Some(*dept))?.id);
        counts.students += 1;
    }

    let term_start = months_back(today, 2);
    for (i, student_id) in student_ids.iter().enumerate() {
        for (j, (category, amount)) in FEES.iter().enumerate() {
            let paid = (amount * paid_share(i + j) * 100.0).round() / 100.0;
            let status = crate::derive::suggested_status(*amount, paid);
            let _: LedgerRecord = store.create(&LedgerDraft {
                kind: LedgerKind::Fee,
                student_id: Some(*student_id),
                party: None,
                category: category.to_string(),
                description: None,
                amount: *amount,
                paid_amount: paid,
                status,
                date: day_in(term_start, 5 + j as u32),
            })?;
            counts.ledger += 1;
        }
    }

    let rows = EXPENSES
        .iter()
        .map(|(p, c, d, a)| (LedgerKind::Expense, p, c, d, a))
        .chain(MAINTENANCE.iter().map(|(p, c, d, a)| (LedgerKind::Maintenance, p, c, d, a)));
    for (i, (kind, party, category, description, amount)) in rows.enumerate() {
        let paid = (amount * paid_share(i) * 100.0).round() / 100.0;
        let _: LedgerRecord = store.create(&LedgerDraft {
            kind,
            student_id: None,
            party: Some(party.to_string()),
            category: category.to_string(),
            description: Some(description.to_string()),
            amount: *amount,
            paid_amount: paid,
            status: crate::derive::suggested_status(*amount, paid),
            date: day_in(months_back(today, (i % 3) as u32), 10 + i as u32),
        })?;
        counts.ledger += 1;
    }

    // Last three months; only the current one is still unpaid.
    for back in (0..3u32).rev() {
        let month = months_back(today, back);
        for (name, base, allowances, deductions) in STAFF {
            let _: PayrollRecord = store.create(&PayrollDraft {
                staff_name: name.to_string(),
                month: format!("{:04}-{:02}", month.year(), month.month()),
                base_salary: *base,
                allowances: *allowances,
                deductions: *deductions,
                payment_status: if back == 0 {
                    PaymentStatus::Pending
                } else {
                    PaymentStatus::Paid
                },
            })?;
            counts.payroll += 1;
        }
    }

    for (i, student_id) in student_ids.iter().enumerate() {
        for (s, subject) in SUBJECTS.iter().enumerate() {
            for (e, exam) in EXAMS.iter().enumerate() {
                let _: MarkRecord = store.create(&MarkDraft {
                    student_id: *student_id,
                    subject: subject.to_string(),
                    exam: exam.to_string(),
                    marks_obtained: demo_marks(i, s, e),
                    max_marks: 100.0,
                })?;
                counts.marks += 1;
            }
        }
    }

    tracing::info!(?counts, "demo data seeded");
    Ok(counts)
}
