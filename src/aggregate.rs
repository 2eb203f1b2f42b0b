use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Grade, LedgerRecord, MarkRecord, PaymentStatus, PayrollRecord};

fn to_cents(v: f64) -> i64 {
    (v * 100.0).round() as i64
}

fn from_cents(c: i64) -> f64 {
    c as f64 / 100.0
}

/// Summary cards for a screen, recomputed from its full list.
pub trait Summarize: Sized {
    type Summary: Clone + Default + PartialEq + std::fmt::Debug;

    fn summarize(records: &[Self]) -> Self::Summary;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub partial: usize,
    pub paid: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: PaymentStatus) {
        match status {
            PaymentStatus::Pending => self.pending += 1,
            PaymentStatus::Partial => self.partial += 1,
            PaymentStatus::Paid => self.paid += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.partial + self.paid
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryTotals {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    pub counts: StatusCounts,
}

impl SummaryTotals {
    /// `total == paid + pending`, compared in whole cents.
    pub fn is_balanced(&self) -> bool {
        to_cents(self.total) == to_cents(self.paid) + to_cents(self.pending)
    }
}

pub fn aggregate(records: &[LedgerRecord]) -> SummaryTotals {
    let mut total = 0i64;
    let mut paid = 0i64;
    let mut counts = StatusCounts::default();
    for r in records {
        total += to_cents(r.amount);
        paid += to_cents(r.settled_amount());
        counts.bump(r.status);
    }
    SummaryTotals {
        total: from_cents(total),
        paid: from_cents(paid),
        pending: from_cents(total - paid),
        counts,
    }
}

impl Summarize for LedgerRecord {
    type Summary = SummaryTotals;

    fn summarize(records: &[Self]) -> SummaryTotals {
        aggregate(records)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PayrollSummary {
    pub total_net: f64,
    pub paid: f64,
    pub pending: f64,
    pub staff: usize,
}

pub fn aggregate_payroll(records: &[PayrollRecord]) -> PayrollSummary {
    let mut total = 0i64;
    let mut paid = 0i64;
    for r in records {
        let net = to_cents(r.net_salary);
        total += net;
        if r.payment_status == PaymentStatus::Paid {
            paid += net;
        }
    }
    PayrollSummary {
        total_net: from_cents(total),
        paid: from_cents(paid),
        pending: from_cents(total - paid),
        staff: records.len(),
    }
}

impl Summarize for PayrollRecord {
    type Summary = PayrollSummary;

    fn summarize(records: &[Self]) -> PayrollSummary {
        aggregate_payroll(records)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkSummary {
    pub count: usize,
    pub average: f64,
    pub pass_count: usize,
    pub distribution: BTreeMap<Grade, usize>,
}

pub fn aggregate_marks(records: &[MarkRecord]) -> MarkSummary {
    let mut summary = MarkSummary {
        count: records.len(),
        ..Default::default()
    };
    if records.is_empty() {
        return summary;
    }
    let sum: f64 = records.iter().map(|m| m.marks_obtained).sum();
    summary.average = (sum / records.len() as f64 * 100.0).round() / 100.0;
    for grade in records.iter().filter_map(|m| m.grade) {
        if grade.is_pass() {
            summary.pass_count += 1;
        }
        *summary.distribution.entry(grade).or_insert(0) += 1;
    }
    summary
}

impl Summarize for MarkRecord {
    type Summary = MarkSummary;

    fn summarize(records: &[Self]) -> MarkSummary {
        aggregate_marks(records)
    }
}
