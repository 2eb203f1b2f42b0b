use colored::{ColoredString, Colorize};

use crate::models::{Grade, PaymentStatus};

/// Currency with thousands separators: 1234.5 -> "$1,234.50".
pub fn money(val: f64) -> String {
    let cents = (val.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if val < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn status_label(status: PaymentStatus) -> ColoredString {
    match status {
        PaymentStatus::Paid => status.as_str().green(),
        PaymentStatus::Partial => status.as_str().yellow(),
        PaymentStatus::Pending => status.as_str().red(),
    }
}

/// Blank when there is no grade.
pub fn grade_label(grade: Option<Grade>) -> ColoredString {
    match grade {
        Some(Grade::F) => "F".red().bold(),
        Some(g) => g.as_str().normal(),
        None => "".normal(),
    }
}

pub fn balance_label(balance: f64) -> ColoredString {
    if balance < 0.0 {
        money(balance).red()
    } else {
        money(balance).normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
        assert_eq!(money(999.999), "$1,000.00");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(money(-0.001), "$0.00");
    }

    #[test]
    fn test_grade_label_blank_for_none() {
        colored::control::set_override(false);
        assert_eq!(grade_label(None).to_string(), "");
        assert_eq!(grade_label(Some(Grade::BPlus)).to_string(), "B+");
    }
}
