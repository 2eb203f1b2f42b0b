use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type RecordId = i64;

/// Placeholder shown when a related row is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Anything a screen keeps in its in-memory list.
pub trait Record: Clone {
    /// Validated input sent to the backend on create/update.
    type Draft;

    fn id(&self) -> RecordId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which finance screen a ledger row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Fee,
    Expense,
    Maintenance,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LedgerKind::Fee => "fee",
            LedgerKind::Expense => "expense",
            LedgerKind::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fee" | "fees" => Some(LedgerKind::Fee),
            "expense" | "expenses" => Some(LedgerKind::Expense),
            "maintenance" => Some(LedgerKind::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grades, best first. `Ord` follows that order so a grade
/// distribution prints A+ before F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn is_pass(self) -> bool {
        self != Grade::F
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub roll_number: String,
    pub department: Option<String>,
    pub is_active: bool,
}

/// A fee, expense or maintenance line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: RecordId,
    pub kind: LedgerKind,
    pub student_id: Option<RecordId>,
    /// Student name for fees, vendor or requester otherwise.
    pub party: String,
    pub category: String,
    pub description: Option<String>,
    pub amount: f64,
    pub paid_amount: f64,
    /// Derived: `amount - paid_amount`.
    pub balance: f64,
    pub status: PaymentStatus,
    pub date: NaiveDate,
}

impl LedgerRecord {
    /// What this line contributes to the "paid" summary card.
    pub fn settled_amount(&self) -> f64 {
        if self.status == PaymentStatus::Paid && self.paid_amount == 0.0 {
            self.amount
        } else {
            self.paid_amount
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDraft {
    pub kind: LedgerKind,
    pub student_id: Option<RecordId>,
    pub party: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub amount: f64,
    pub paid_amount: f64,
    pub status: PaymentStatus,
    pub date: NaiveDate,
}

impl Record for LedgerRecord {
    type Draft = LedgerDraft;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: RecordId,
    pub staff_name: String,
    /// YYYY-MM
    pub month: String,
    pub base_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    /// Derived: `base_salary + allowances - deductions`.
    pub net_salary: f64,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollDraft {
    pub staff_name: String,
    pub month: String,
    pub base_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub payment_status: PaymentStatus,
}

impl Record for PayrollRecord {
    type Draft = PayrollDraft;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkRecord {
    pub id: RecordId,
    pub student_id: RecordId,
    pub student_name: String,
    pub subject: String,
    pub exam: String,
    pub marks_obtained: f64,
    pub max_marks: f64,
    /// Derived from `marks_obtained`.
    pub grade: Option<Grade>,
}

impl MarkRecord {
    pub fn percentage(&self) -> f64 {
        if self.max_marks <= 0.0 {
            0.0
        } else {
            self.marks_obtained / self.max_marks * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkDraft {
    pub student_id: RecordId,
    pub subject: String,
    pub exam: String,
    pub marks_obtained: f64,
    pub max_marks: f64,
}

impl Record for MarkRecord {
    type Draft = MarkDraft;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(PaymentStatus::parse("PAID"), Some(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::parse(" partial "), Some(PaymentStatus::Partial));
        assert_eq!(PaymentStatus::parse("overdue"), None);
    }

    #[test]
    fn test_kind_accepts_plural() {
        assert_eq!(LedgerKind::parse("fees"), Some(LedgerKind::Fee));
        assert_eq!(LedgerKind::parse("expenses"), Some(LedgerKind::Expense));
        assert_eq!(LedgerKind::parse("transport"), None);
    }

    #[test]
    fn test_grade_order_best_first() {
        assert!(Grade::APlus < Grade::A);
        assert!(Grade::D < Grade::F);
        assert!(!Grade::F.is_pass());
        assert!(Grade::D.is_pass());
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::BPlus).unwrap(), "\"B+\"");
        let g: Grade = serde_json::from_str("\"A+\"").unwrap();
        assert_eq!(g, Grade::APlus);
    }

    #[test]
    fn test_settled_amount_uses_amount_for_paid_without_payment() {
        let mut r = LedgerRecord {
            id: 1,
            kind: LedgerKind::Fee,
            student_id: None,
            party: "N/A".into(),
            category: "Tuition".into(),
            description: None,
            amount: 500.0,
            paid_amount: 0.0,
            balance: 500.0,
            status: PaymentStatus::Paid,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert_eq!(r.settled_amount(), 500.0);
        r.status = PaymentStatus::Pending;
        assert_eq!(r.settled_amount(), 0.0);
        r.paid_amount = 200.0;
        r.status = PaymentStatus::Partial;
        assert_eq!(r.settled_amount(), 200.0);
    }

    #[test]
    fn test_percentage_guards_zero_max() {
        let m = MarkRecord {
            id: 1,
            student_id: 1,
            student_name: "A".into(),
            subject: "Math".into(),
            exam: "Midterm".into(),
            marks_obtained: 45.0,
            max_marks: 0.0,
            grade: None,
        };
        assert_eq!(m.percentage(), 0.0);
        let m = MarkRecord { max_marks: 50.0, ..m };
        assert_eq!(m.percentage(), 90.0);
    }
}
