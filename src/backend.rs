//! The interface screens use to reach the system of record.

use serde::Serialize;

use crate::error::Result;
use crate::models::{LedgerKind, PaymentStatus, Record, RecordId};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Server-side filters plus pagination. Filters a record type has no
/// column for are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub term: Option<String>,
    pub status: Option<PaymentStatus>,
    pub kind: Option<LedgerKind>,
    pub student_id: Option<RecordId>,
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            term: None,
            status: None,
            kind: None,
            student_id: None,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: Option<LedgerKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_status(mut self, status: Option<PaymentStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_term(mut self, term: Option<String>) -> Self {
        self.term = term.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_student(mut self, student_id: Option<RecordId>) -> Self {
        self.student_id = student_id;
        self
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit()
    }

    pub(crate) fn limit(&self) -> i64 {
        self.per_page.max(1) as i64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total_pages: u32,
    pub total_items: u64,
}

impl PageInfo {
    pub fn new(total_items: u64, per_page: u32) -> Self {
        let per_page = u64::from(per_page.max(1));
        Self {
            total_pages: total_items.div_ceil(per_page) as u32,
            total_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub data: Vec<R>,
    pub pagination: PageInfo,
}

pub trait Backend<R: Record> {
    fn fetch_list(&self, query: &ListQuery) -> Result<Page<R>>;

    /// Returns the stored record with its server-assigned id.
    fn create(&self, draft: &R::Draft) -> Result<R>;

    fn update(&self, id: RecordId, draft: &R::Draft) -> Result<R>;

    fn delete(&self, id: RecordId) -> Result<()>;

    fn search(&self, term: &str) -> Result<Vec<R>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_rounds_up() {
        assert_eq!(PageInfo::new(0, 20).total_pages, 0);
        assert_eq!(PageInfo::new(1, 20).total_pages, 1);
        assert_eq!(PageInfo::new(40, 20).total_pages, 2);
        assert_eq!(PageInfo::new(41, 20).total_pages, 3);
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        assert_eq!(PageInfo::new(3, 0).total_pages, 3);
        let q = ListQuery::page(0, 0);
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(ListQuery::page(3, 20).offset(), 40);
    }

    #[test]
    fn test_blank_term_dropped() {
        let q = ListQuery::default().with_term(Some("  ".into()));
        assert_eq!(q.term, None);
    }
}
