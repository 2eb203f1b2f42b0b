//! Client-side filtering and search-as-you-type bookkeeping.

use std::time::{Duration, Instant};

use crate::models::{LedgerRecord, MarkRecord, PayrollRecord};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Records that can be matched against a free-text term.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(&needle))
    }
}

impl Searchable for LedgerRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.party.as_str(), self.category.as_str(), self.status.as_str()];
        if let Some(d) = &self.description {
            fields.push(d.as_str());
        }
        fields
    }
}

impl Searchable for PayrollRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.staff_name.as_str(),
            self.month.as_str(),
            self.payment_status.as_str(),
        ]
    }
}

impl Searchable for MarkRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.subject.as_str(),
            self.exam.as_str(),
        ]
    }
}

/// The filtered view. Summaries are never computed from this.
pub fn filter<'a, R: Searchable>(records: &'a [R], term: &str) -> Vec<&'a R> {
    records.iter().filter(|r| r.matches(term)).collect()
}

/// Holds the latest keystroke until input has been quiet for `delay`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, term: &str, now: Instant) {
        self.pending = Some((term.to_string(), now));
    }

    /// The term to query, once the delay has elapsed since the last input.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = matches!(
            &self.pending,
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay
        );
        if ready {
            self.pending.take().map(|(term, _)| term)
        } else {
            None
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Orders search responses so an older one can never replace a newer one.
#[derive(Debug)]
pub struct SearchSequencer<T> {
    issued: u64,
    shown: u64,
    results: Option<Vec<T>>,
}

impl<T> Default for SearchSequencer<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            shown: 0,
            results: None,
        }
    }
}

impl<T> SearchSequencer<T> {
    pub fn issue(&mut self) -> SearchTicket {
        self.issued += 1;
        SearchTicket(self.issued)
    }

    /// Returns false when the response is older than what is on screen.
    pub fn accept(&mut self, ticket: SearchTicket, results: Vec<T>) -> bool {
        if ticket.0 <= self.shown {
            tracing::debug!(ticket = ticket.0, shown = self.shown, "discarding stale search response");
            return false;
        }
        self.shown = ticket.0;
        self.results = Some(results);
        true
    }

    /// Mark a ticket as answered without results (the query failed).
    pub fn reject(&mut self, ticket: SearchTicket) {
        if ticket.0 > self.shown {
            self.shown = ticket.0;
        }
    }

    pub fn results(&self) -> Option<&[T]> {
        self.results.as_deref()
    }

    pub fn clear(&mut self) {
        self.results = None;
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::Derive;
    use crate::models::{LedgerKind, PaymentStatus};
    use chrono::NaiveDate;

    fn fee(id: i64, party: &str, category: &str) -> LedgerRecord {
        LedgerRecord {
            id,
            kind: LedgerKind::Fee,
            student_id: Some(id),
            party: party.into(),
            category: category.into(),
            description: None,
            amount: 100.0,
            paid_amount: 0.0,
            balance: 0.0,
            status: PaymentStatus::Pending,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
        .derive()
    }

    #[test]
    fn test_filter_case_insensitive() {
        let list = vec![fee(1, "Asha Rao", "Tuition"), fee(2, "Ben Cole", "Hostel")];
        let hits = filter(&list, "HOSTEL");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        assert_eq!(filter(&list, "rao").len(), 1);
    }

    #[test]
    fn test_empty_term_matches_all() {
        let list = vec![fee(1, "A", "Tuition"), fee(2, "B", "Bus")];
        assert_eq!(filter(&list, "  ").len(), 2);
    }

    #[test]
    fn test_debouncer_waits_for_quiet() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.input("as", start);
        d.input("ash", start + Duration::from_millis(200));
        assert_eq!(d.poll(start + Duration::from_millis(600)), None);
        assert_eq!(d.poll(start + Duration::from_millis(700)), Some("ash".to_string()));
        assert!(!d.is_waiting());
        assert_eq!(d.poll(start + Duration::from_millis(2000)), None);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut seq = SearchSequencer::default();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.accept(second, vec!["new"]));
        assert!(!seq.accept(first, vec!["old"]));
        assert_eq!(seq.results(), Some(&["new"][..]));
    }

    #[test]
    fn test_in_order_responses_both_shown() {
        let mut seq = SearchSequencer::default();
        let first = seq.issue();
        assert!(seq.accept(first, vec![1]));
        let second = seq.issue();
        assert!(seq.is_current(second));
        assert!(seq.accept(second, vec![2]));
        assert_eq!(seq.results(), Some(&[2][..]));
    }

    #[test]
    fn test_rejected_ticket_blocks_older_responses() {
        let mut seq: SearchSequencer<i32> = SearchSequencer::default();
        let first = seq.issue();
        let second = seq.issue();
        seq.reject(second);
        assert!(!seq.accept(first, vec![1]));
        assert_eq!(seq.results(), None);
    }
}
