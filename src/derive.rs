//! Dependent-field computation.
//!
//! Everything here is a pure function of the independent fields, so a form
//! can re-run it on every keystroke and tests need no UI or database.

use serde::{Deserialize, Serialize};

use crate::models::{Grade, LedgerRecord, MarkRecord, PaymentStatus, PayrollRecord};

/// How a negative pending amount (overpayment) is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Show `amount - paid` as-is, negative included.
    #[default]
    Signed,
    /// Floor the pending amount at zero.
    ClampToZero,
}

impl BalancePolicy {
    pub fn apply(self, pending: f64) -> f64 {
        match self {
            BalancePolicy::Signed => pending,
            BalancePolicy::ClampToZero => pending.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriveRules {
    pub balance: BalancePolicy,
}

pub trait Derive: Sized {
    fn derive_with(self, rules: &DeriveRules) -> Self;

    fn derive(self) -> Self {
        self.derive_with(&DeriveRules::default())
    }
}

/// Grade thresholds on absolute marks, checked top-down.
pub const GRADE_THRESHOLDS: &[(f64, Grade)] = &[
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::C),
    (40.0, Grade::D),
];

/// Parse a numeric form field; blanks and garbage count as zero.
pub fn parse_or_default(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn net_salary(base_salary: f64, allowances: f64, deductions: f64) -> f64 {
    base_salary + allowances - deductions
}

pub fn pending_amount(total: f64, paid: f64, policy: BalancePolicy) -> f64 {
    policy.apply(total - paid)
}

/// Status implied by the amounts when the user hasn't picked one.
pub fn suggested_status(amount: f64, paid: f64) -> PaymentStatus {
    if paid <= 0.0 {
        PaymentStatus::Pending
    } else if paid >= amount {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    }
}

pub fn grade_for_marks(marks: f64) -> Grade {
    GRADE_THRESHOLDS
        .iter()
        .find(|(min, _)| marks >= *min)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

/// Grade for raw form input. Empty or unparseable input has no grade.
pub fn grade_from_input(input: &str) -> Option<Grade> {
    let marks = input.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(grade_for_marks(marks))
}

impl Derive for LedgerRecord {
    fn derive_with(mut self, rules: &DeriveRules) -> Self {
        self.balance = pending_amount(self.amount, self.paid_amount, rules.balance);
        self
    }
}

impl Derive for PayrollRecord {
    fn derive_with(mut self, _rules: &DeriveRules) -> Self {
        self.net_salary = net_salary(self.base_salary, self.allowances, self.deductions);
        self
    }
}

impl Derive for MarkRecord {
    fn derive_with(mut self, _rules: &DeriveRules) -> Self {
        self.grade = if self.marks_obtained.is_finite() {
            Some(grade_for_marks(self.marks_obtained))
        } else {
            None
        };
        self
    }
}
