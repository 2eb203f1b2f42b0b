//! Form state as the user types it.
//!
//! Inputs stay as strings so a half-typed number never blocks derivation;
//! the dependent fields are refreshed by [`Derive`] using the
//! parse-or-default rule. `validate` is the gate before anything is sent
//! to the backend and is strict where derivation is lenient.

use chrono::NaiveDate;

use crate::derive::{
    grade_from_input, net_salary, parse_or_default, pending_amount, suggested_status, Derive,
    DeriveRules,
};
use crate::error::ValidationError;
use crate::models::{
    Grade, LedgerDraft, LedgerKind, LedgerRecord, MarkDraft, PaymentStatus, PayrollDraft,
    PayrollRecord, RecordId,
};

pub const DEFAULT_MAX_MARKS: f64 = 100.0;

type Checked<T> = std::result::Result<T, ValidationError>;

fn required<'a>(field: &'static str, value: &'a str) -> Checked<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(v)
    }
}

fn number(field: &'static str, value: &str) -> Checked<f64> {
    let v = required(field, value)?;
    match v.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::NotNumeric {
            field,
            value: v.to_string(),
        }),
    }
}

fn optional_number(field: &'static str, value: &str) -> Checked<f64> {
    if value.trim().is_empty() {
        Ok(0.0)
    } else {
        number(field, value)
    }
}

fn non_negative(field: &'static str, value: f64) -> Checked<f64> {
    if value < 0.0 {
        Err(ValidationError::Negative { field, value })
    } else {
        Ok(value)
    }
}

fn id(field: &'static str, value: &str) -> Checked<RecordId> {
    let v = required(field, value)?;
    v.parse::<RecordId>().map_err(|_| ValidationError::NotNumeric {
        field,
        value: v.to_string(),
    })
}

fn date(field: &'static str, value: &str) -> Checked<NaiveDate> {
    let v = required(field, value)?;
    NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: v.to_string(),
    })
}

fn month(field: &'static str, value: &str) -> Checked<String> {
    let v = required(field, value)?;
    NaiveDate::parse_from_str(&format!("{v}-01"), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m").to_string())
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: v.to_string(),
        })
}

fn optional_text(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

// ---------------------------------------------------------------------------
// Ledger (fees, expenses, maintenance)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerForm {
    pub kind: LedgerKind,
    pub student_id: String,
    pub party: String,
    pub category: String,
    pub description: String,
    pub amount: String,
    pub paid_amount: String,
    pub date: String,
    /// `None` means "work it out from the amounts".
    pub status: Option<PaymentStatus>,
    pub pending: f64,
    pub suggested_status: PaymentStatus,
}

impl LedgerForm {
    pub fn new(kind: LedgerKind) -> Self {
        Self {
            kind,
            student_id: String::new(),
            party: String::new(),
            category: String::new(),
            description: String::new(),
            amount: String::new(),
            paid_amount: String::new(),
            date: String::new(),
            status: None,
            pending: 0.0,
            suggested_status: PaymentStatus::Pending,
        }
    }

    /// Pre-fill the form for editing an existing record.
    pub fn from_record(r: &LedgerRecord) -> Self {
        Self {
            kind: r.kind,
            student_id: r.student_id.map(|id| id.to_string()).unwrap_or_default(),
            // Fees show the student's name here; it is not stored.
            party: if r.student_id.is_some() {
                String::new()
            } else {
                r.party.clone()
            },
            category: r.category.clone(),
            description: r.description.clone().unwrap_or_default(),
            amount: r.amount.to_string(),
            paid_amount: r.paid_amount.to_string(),
            date: r.date.format("%Y-%m-%d").to_string(),
            status: Some(r.status),
            pending: r.balance,
            suggested_status: r.status,
        }
        .derive()
    }

    pub fn validate(&self) -> Checked<LedgerDraft> {
        let student_id = if self.kind == LedgerKind::Fee {
            Some(id("student", &self.student_id)?)
        } else if self.student_id.trim().is_empty() {
            None
        } else {
            Some(id("student", &self.student_id)?)
        };
        let party = optional_text(&self.party);
        if student_id.is_none() && party.is_none() {
            return Err(ValidationError::MissingField("party"));
        }
        let category = required("category", &self.category)?.to_string();
        let amount = non_negative("amount", number("amount", &self.amount)?)?;
        let paid_amount = non_negative("paid amount", optional_number("paid amount", &self.paid_amount)?)?;
        if paid_amount > amount {
            return Err(ValidationError::Overpayment {
                amount,
                paid: paid_amount,
            });
        }
        let date = date("date", &self.date)?;

        Ok(LedgerDraft {
            kind: self.kind,
            student_id,
            party,
            category,
            description: optional_text(&self.description),
            amount,
            paid_amount,
            status: self
                .status
                .unwrap_or_else(|| suggested_status(amount, paid_amount)),
            date,
        })
    }
}

impl Derive for LedgerForm {
    fn derive_with(mut self, rules: &DeriveRules) -> Self {
        let amount = parse_or_default(&self.amount);
        let paid = parse_or_default(&self.paid_amount);
        self.pending = pending_amount(amount, paid, rules.balance);
        self.suggested_status = suggested_status(amount, paid);
        self
    }
}

// ---------------------------------------------------------------------------
// Payroll
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayrollForm {
    pub staff_name: String,
    pub month: String,
    pub base_salary: String,
    pub allowances: String,
    pub deductions: String,
    pub payment_status: Option<PaymentStatus>,
    pub net_salary: f64,
}

impl PayrollForm {
    pub fn from_record(r: &PayrollRecord) -> Self {
        Self {
            staff_name: r.staff_name.clone(),
            month: r.month.clone(),
            base_salary: r.base_salary.to_string(),
            allowances: r.allowances.to_string(),
            deductions: r.deductions.to_string(),
            payment_status: Some(r.payment_status),
            net_salary: r.net_salary,
        }
        .derive()
    }

    pub fn validate(&self) -> Checked<PayrollDraft> {
        Ok(PayrollDraft {
            staff_name: required("staff name", &self.staff_name)?.to_string(),
            month: month("month", &self.month)?,
            base_salary: non_negative("base salary", number("base salary", &self.base_salary)?)?,
            allowances: non_negative("allowances", optional_number("allowances", &self.allowances)?)?,
            deductions: non_negative("deductions", optional_number("deductions", &self.deductions)?)?,
            payment_status: self.payment_status.unwrap_or(PaymentStatus::Pending),
        })
    }
}

impl Derive for PayrollForm {
    fn derive_with(mut self, _rules: &DeriveRules) -> Self {
        self.net_salary = net_salary(
            parse_or_default(&self.base_salary),
            parse_or_default(&self.allowances),
            parse_or_default(&self.deductions),
        );
        self
    }
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkForm {
    pub student_id: String,
    pub subject: String,
    pub exam: String,
    pub marks_obtained: String,
    pub max_marks: String,
    pub grade: Option<Grade>,
}

impl MarkForm {
    /// The grade as the marks-entry column shows it: blank when there is none.
    pub fn grade_label(&self) -> &'static str {
        self.grade.map(Grade::as_str).unwrap_or("")
    }

    pub fn validate(&self) -> Checked<MarkDraft> {
        let student_id = id("student", &self.student_id)?;
        let subject = required("subject", &self.subject)?.to_string();
        let exam = required("exam", &self.exam)?.to_string();
        let max_marks = if self.max_marks.trim().is_empty() {
            DEFAULT_MAX_MARKS
        } else {
            number("max marks", &self.max_marks)?
        };
        if max_marks <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "max marks",
                value: max_marks,
            });
        }
        let marks_obtained = number("marks", &self.marks_obtained)?;
        if !(0.0..=max_marks).contains(&marks_obtained) {
            return Err(ValidationError::OutOfRange {
                field: "marks",
                value: marks_obtained,
                max: max_marks,
            });
        }
        Ok(MarkDraft {
            student_id,
            subject,
            exam,
            marks_obtained,
            max_marks,
        })
    }
}

impl Derive for MarkForm {
    fn derive_with(mut self, _rules: &DeriveRules) -> Self {
        self.grade = grade_from_input(&self.marks_obtained);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::BalancePolicy;

    fn fee_form(amount: &str, paid: &str) -> LedgerForm {
        LedgerForm {
            student_id: "7".into(),
            category: "Tuition".into(),
            amount: amount.into(),
            paid_amount: paid.into(),
            date: "2025-07-01".into(),
            ..LedgerForm::new(LedgerKind::Fee)
        }
    }

    #[test]
    fn test_ledger_form_derives_pending() {
        let f = fee_form("1000", "600").derive();
        assert_eq!(f.pending, 400.0);
        assert_eq!(f.suggested_status, PaymentStatus::Partial);
    }

    #[test]
    fn test_overpayment_derives_then_blocks_submit() {
        let f = fee_form("1000", "1200").derive();
        assert_eq!(f.pending, -200.0);
        let clamped = fee_form("1000", "1200").derive_with(&DeriveRules {
            balance: BalancePolicy::ClampToZero,
        });
        assert_eq!(clamped.pending, 0.0);
        assert_eq!(
            f.validate(),
            Err(ValidationError::Overpayment {
                amount: 1000.0,
                paid: 1200.0
            })
        );
    }

    #[test]
    fn test_half_typed_numbers_count_as_zero() {
        let f = fee_form("1000", "6o0").derive();
        assert_eq!(f.pending, 1000.0);
        assert!(matches!(
            f.validate(),
            Err(ValidationError::NotNumeric { field: "paid amount", .. })
        ));
    }

    #[test]
    fn test_ledger_validate_happy_path() {
        let draft = fee_form("1000", "").validate().unwrap();
        assert_eq!(draft.student_id, Some(7));
        assert_eq!(draft.paid_amount, 0.0);
        assert_eq!(draft.status, PaymentStatus::Pending);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn test_explicit_status_wins() {
        let mut f = fee_form("1000", "");
        f.status = Some(PaymentStatus::Paid);
        assert_eq!(f.validate().unwrap().status, PaymentStatus::Paid);
    }

    #[test]
    fn test_fee_requires_student() {
        let mut f = fee_form("1000", "0");
        f.student_id.clear();
        assert_eq!(f.validate(), Err(ValidationError::MissingField("student")));
    }

    #[test]
    fn test_expense_needs_party_not_student() {
        let mut f = LedgerForm::new(LedgerKind::Expense);
        f.category = "Lab supplies".into();
        f.amount = "250".into();
        f.date = "2025-02-14".into();
        assert_eq!(f.validate(), Err(ValidationError::MissingField("party")));
        f.party = "Sigma Scientific".into();
        let draft = f.validate().unwrap();
        assert_eq!(draft.student_id, None);
        assert_eq!(draft.party.as_deref(), Some("Sigma Scientific"));
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut f = fee_form("10", "0");
        f.date = "07/01/2025".into();
        assert!(matches!(f.validate(), Err(ValidationError::InvalidDate { .. })));
    }

    #[test]
    fn test_payroll_form_net_salary() {
        let f = PayrollForm {
            staff_name: "M. Okafor".into(),
            month: "2025-04".into(),
            base_salary: "40000".into(),
            allowances: "3500".into(),
            deductions: "abc".into(),
            ..Default::default()
        }
        .derive();
        assert_eq!(f.net_salary, 43500.0);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_payroll_validate_defaults() {
        let draft = PayrollForm {
            staff_name: "M. Okafor".into(),
            month: "2025-4".into(),
            base_salary: "40000".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(draft.month, "2025-04");
        assert_eq!(draft.allowances, 0.0);
        assert_eq!(draft.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_payroll_bad_month() {
        let f = PayrollForm {
            staff_name: "X".into(),
            month: "2025-13".into(),
            base_salary: "1".into(),
            ..Default::default()
        };
        assert!(matches!(f.validate(), Err(ValidationError::InvalidDate { field: "month", .. })));
    }

    #[test]
    fn test_mark_form_grade_label() {
        let mut f = MarkForm {
            marks_obtained: "".into(),
            ..Default::default()
        }
        .derive();
        assert_eq!(f.grade_label(), "");
        f.marks_obtained = "72".into();
        let f = f.derive();
        assert_eq!(f.grade_label(), "B+");
    }

    #[test]
    fn test_mark_validate_range() {
        let f = MarkForm {
            student_id: "3".into(),
            subject: "Chemistry".into(),
            exam: "Final".into(),
            marks_obtained: "105".into(),
            max_marks: "".into(),
            grade: None,
        };
        assert!(matches!(f.validate(), Err(ValidationError::OutOfRange { field: "marks", .. })));
        let ok = MarkForm {
            marks_obtained: "88".into(),
            ..f
        }
        .validate()
        .unwrap();
        assert_eq!(ok.max_marks, DEFAULT_MAX_MARKS);
    }

    #[test]
    fn test_mark_max_must_be_positive() {
        let f = MarkForm {
            student_id: "3".into(),
            subject: "Chemistry".into(),
            exam: "Final".into(),
            marks_obtained: "0".into(),
            max_marks: "0".into(),
            grade: None,
        };
        let err = f.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotPositive {
                field: "max marks",
                value: 0.0
            }
        );
        assert_eq!(err.to_string(), "max marks must be greater than 0, got 0");
    }
}
