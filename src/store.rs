//! SQLite-backed [`Backend`] used by the CLI and tests.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use crate::backend::{Backend, ListQuery, Page, PageInfo};
use crate::db::{get_connection, init_db};
use crate::derive::{Derive, DeriveRules};
use crate::error::{CmsError, Result};
use crate::models::{
    LedgerDraft, LedgerKind, LedgerRecord, MarkDraft, MarkRecord, PaymentStatus, PayrollDraft,
    PayrollRecord, RecordId, Student, NOT_AVAILABLE,
};

const SEARCH_LIMIT: i64 = 100;

const LEDGER_SELECT: &str = "SELECT l.id, l.kind, l.student_id, s.name, l.party, l.category, \
     l.description, l.amount, l.paid_amount, l.status, l.date";
const LEDGER_FROM: &str = "FROM ledger l LEFT JOIN students s ON l.student_id = s.id";

const PAYROLL_SELECT: &str = "SELECT p.id, p.staff_name, p.month, p.base_salary, p.allowances, \
     p.deductions, p.payment_status";
const PAYROLL_FROM: &str = "FROM payroll p";

const MARK_SELECT: &str = "SELECT m.id, m.student_id, s.name, m.subject, m.exam, \
     m.marks_obtained, m.max_marks";
const MARK_FROM: &str = "FROM marks m LEFT JOIN students s ON m.student_id = s.id";

/// `%term%` with the term's own wildcards escaped; pair with `ESCAPE '\'`.
fn like(term: &str) -> Value {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Value::Text(format!("%{escaped}%"))
}

fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_default()
}

fn ledger_row(row: &Row<'_>) -> rusqlite::Result<LedgerRecord> {
    let kind: String = row.get(1)?;
    let student_name: Option<String> = row.get(3)?;
    let party: Option<String> = row.get(4)?;
    let status: String = row.get(9)?;
    let date: String = row.get(10)?;
    Ok(LedgerRecord {
        id: row.get(0)?,
        kind: LedgerKind::parse(&kind).unwrap_or(LedgerKind::Expense),
        student_id: row.get(2)?,
        party: student_name
            .or(party)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        category: row.get(5)?,
        description: row.get(6)?,
        amount: row.get(7)?,
        paid_amount: row.get(8)?,
        balance: 0.0,
        status: PaymentStatus::parse(&status).unwrap_or(PaymentStatus::Pending),
        date: parse_date(&date),
    })
}

fn payroll_row(row: &Row<'_>) -> rusqlite::Result<PayrollRecord> {
    let status: String = row.get(6)?;
    Ok(PayrollRecord {
        id: row.get(0)?,
        staff_name: row.get(1)?,
        month: row.get(2)?,
        base_salary: row.get(3)?,
        allowances: row.get(4)?,
        deductions: row.get(5)?,
        net_salary: 0.0,
        payment_status: PaymentStatus::parse(&status).unwrap_or(PaymentStatus::Pending),
    })
}

fn mark_row(row: &Row<'_>) -> rusqlite::Result<MarkRecord> {
    let student_name: Option<String> = row.get(2)?;
    Ok(MarkRecord {
        id: row.get(0)?,
        student_id: row.get(1)?,
        student_name: student_name.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        subject: row.get(3)?,
        exam: row.get(4)?,
        marks_obtained: row.get(5)?,
        max_marks: row.get(6)?,
        grade: None,
    })
}

fn where_sql(clauses: &[&str]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

pub struct Store {
    conn: Connection,
    rules: DeriveRules,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self {
            conn,
            rules: DeriveRules::default(),
        })
    }

    pub fn with_rules(mut self, rules: DeriveRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    #[allow(clippy::too_many_arguments)]
    fn fetch_page<R, F>(
        &self,
        select: &str,
        from: &str,
        clauses: &[&str],
        params: &[Value],
        order: &str,
        query: &ListQuery,
        map: F,
    ) -> Result<Page<R>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<R>,
    {
        let filter = where_sql(clauses);
        let total_items: i64 = self.conn.query_row(
            &format!("SELECT count(*) {from}{filter}"),
            params_from_iter(params.iter()),
            |r| r.get(0),
        )?;
        let sql = format!(
            "{select} {from}{filter} ORDER BY {order} LIMIT {} OFFSET {}",
            query.limit(),
            query.offset()
        );
        tracing::debug!(%sql, "fetching page");
        let mut stmt = self.conn.prepare(&sql)?;
        let data = stmt
            .query_map(params_from_iter(params.iter()), map)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            pagination: PageInfo::new(total_items.max(0) as u64, query.per_page),
        })
    }

    fn search_rows<R, F>(
        &self,
        select: &str,
        from: &str,
        clause: &str,
        params: &[Value],
        order: &str,
        map: F,
    ) -> Result<Vec<R>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<R>,
    {
        let sql = format!("{select} {from} WHERE {clause} ORDER BY {order} LIMIT {SEARCH_LIMIT}");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), map)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // Students
    // -----------------------------------------------------------------------

    pub fn add_student(&self, name: &str, roll_number: &str, department: Option<&str>) -> Result<Student> {
        self.conn.execute(
            "INSERT INTO students (name, roll_number, department) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, roll_number, department],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "student added");
        Ok(Student {
            id,
            name: name.to_string(),
            roll_number: roll_number.to_string(),
            department: department.map(str::to_string),
            is_active: true,
        })
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, roll_number, department, is_active FROM students \
             WHERE is_active = 1 ORDER BY name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Student {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    roll_number: row.get(2)?,
                    department: row.get(3)?,
                    is_active: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Soft delete: fees and marks keep resolving the student's name.
    pub fn remove_student(&self, id: RecordId) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE students SET is_active = 0 WHERE id = ?1 AND is_active = 1",
            [id],
        )?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "student", id });
        }
        Ok(())
    }

    /// Fees and marks may only be written against an active student.
    fn ensure_active_student(&self, id: RecordId) -> Result<()> {
        self.conn
            .query_row(
                "SELECT 1 FROM students WHERE id = ?1 AND is_active = 1",
                [id],
                |_| Ok(()),
            )
            .optional()?
            .ok_or(CmsError::NotFound { entity: "student", id })
    }

    /// Check the student only when a write moves the row to a different one,
    /// so existing rows of a deactivated student can still be edited.
    fn ensure_student_change(&self, table: &str, id: RecordId, student_id: RecordId) -> Result<()> {
        let current: Option<Option<RecordId>> = self
            .conn
            .query_row(
                &format!("SELECT student_id FROM {table} WHERE id = ?1"),
                [id],
                |r| r.get(0),
            )
            .optional()?;
        if current.flatten() == Some(student_id) {
            Ok(())
        } else {
            self.ensure_active_student(student_id)
        }
    }

    // -----------------------------------------------------------------------
    // Single-record lookups
    // -----------------------------------------------------------------------

    pub fn get_ledger(&self, id: RecordId) -> Result<LedgerRecord> {
        self.conn
            .query_row(&format!("{LEDGER_SELECT} {LEDGER_FROM} WHERE l.id = ?1"), [id], ledger_row)
            .optional()?
            .map(|r| r.derive_with(&self.rules))
            .ok_or(CmsError::NotFound { entity: "ledger record", id })
    }

    pub fn get_payroll(&self, id: RecordId) -> Result<PayrollRecord> {
        self.conn
            .query_row(&format!("{PAYROLL_SELECT} {PAYROLL_FROM} WHERE p.id = ?1"), [id], payroll_row)
            .optional()?
            .map(|r| r.derive_with(&self.rules))
            .ok_or(CmsError::NotFound { entity: "payroll record", id })
    }

    pub fn get_mark(&self, id: RecordId) -> Result<MarkRecord> {
        self.conn
            .query_row(&format!("{MARK_SELECT} {MARK_FROM} WHERE m.id = ?1"), [id], mark_row)
            .optional()?
            .map(|r| r.derive_with(&self.rules))
            .ok_or(CmsError::NotFound { entity: "mark", id })
    }
}

impl Backend<LedgerRecord> for Store {
    fn fetch_list(&self, query: &ListQuery) -> Result<Page<LedgerRecord>> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if let Some(kind) = query.kind {
            clauses.push("l.kind = ?");
            params.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(status) = query.status {
            clauses.push("l.status = ?");
            params.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(student_id) = query.student_id {
            clauses.push("l.student_id = ?");
            params.push(Value::Integer(student_id));
        }
        if let Some(term) = &query.term {
            clauses.push("(s.name LIKE ? ESCAPE '\\' OR l.party LIKE ? ESCAPE '\\' OR \
                 l.category LIKE ? ESCAPE '\\' OR l.description LIKE ? ESCAPE '\\')");
            params.extend(std::iter::repeat(like(term)).take(4));
        }
        let mut page = self.fetch_page(
            LEDGER_SELECT,
            LEDGER_FROM,
            &clauses,
            &params,
            "l.date, l.id",
            query,
            ledger_row,
        )?;
        page.data = page.data.into_iter().map(|r| r.derive_with(&self.rules)).collect();
        Ok(page)
    }

    fn create(&self, draft: &LedgerDraft) -> Result<LedgerRecord> {
        if let Some(student_id) = draft.student_id {
            self.ensure_active_student(student_id)?;
        }
        self.conn.execute(
            "INSERT INTO ledger (kind, student_id, party, category, description, amount, paid_amount, status, date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                draft.kind.as_str(),
                draft.student_id,
                draft.party,
                draft.category,
                draft.description,
                draft.amount,
                draft.paid_amount,
                draft.status.as_str(),
                draft.date.format("%Y-%m-%d").to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, kind = %draft.kind, "ledger record created");
        self.get_ledger(id)
    }

    fn update(&self, id: RecordId, draft: &LedgerDraft) -> Result<LedgerRecord> {
        if let Some(student_id) = draft.student_id {
            self.ensure_student_change("ledger", id, student_id)?;
        }
        let changed = self.conn.execute(
            "UPDATE ledger SET kind = ?1, student_id = ?2, party = ?3, category = ?4, description = ?5, \
             amount = ?6, paid_amount = ?7, status = ?8, date = ?9, updated_at = datetime('now') \
             WHERE id = ?10",
            rusqlite::params![
                draft.kind.as_str(),
                draft.student_id,
                draft.party,
                draft.category,
                draft.description,
                draft.amount,
                draft.paid_amount,
                draft.status.as_str(),
                draft.date.format("%Y-%m-%d").to_string(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "ledger record", id });
        }
        tracing::debug!(id, "ledger record updated");
        self.get_ledger(id)
    }

    fn delete(&self, id: RecordId) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM ledger WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "ledger record", id });
        }
        tracing::debug!(id, "ledger record deleted");
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<LedgerRecord>> {
        let rows = self.search_rows(
            LEDGER_SELECT,
            LEDGER_FROM,
            "(s.name LIKE ?1 ESCAPE '\\' OR l.party LIKE ?1 ESCAPE '\\' OR \
                 l.category LIKE ?1 ESCAPE '\\' OR l.description LIKE ?1 ESCAPE '\\')",
            &[like(term)],
            "l.date DESC, l.id DESC",
            ledger_row,
        )?;
        Ok(rows.into_iter().map(|r| r.derive_with(&self.rules)).collect())
    }
}

impl Backend<PayrollRecord> for Store {
    fn fetch_list(&self, query: &ListQuery) -> Result<Page<PayrollRecord>> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if let Some(status) = query.status {
            clauses.push("p.payment_status = ?");
            params.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(term) = &query.term {
            clauses.push("(p.staff_name LIKE ? ESCAPE '\\' OR p.month LIKE ? ESCAPE '\\')");
            params.extend(std::iter::repeat(like(term)).take(2));
        }
        let mut page = self.fetch_page(
            PAYROLL_SELECT,
            PAYROLL_FROM,
            &clauses,
            &params,
            "p.month, p.staff_name, p.id",
            query,
            payroll_row,
        )?;
        page.data = page.data.into_iter().map(|r| r.derive_with(&self.rules)).collect();
        Ok(page)
    }

    fn create(&self, draft: &PayrollDraft) -> Result<PayrollRecord> {
        self.conn.execute(
            "INSERT INTO payroll (staff_name, month, base_salary, allowances, deductions, payment_status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                draft.staff_name,
                draft.month,
                draft.base_salary,
                draft.allowances,
                draft.deductions,
                draft.payment_status.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "payroll record created");
        self.get_payroll(id)
    }

    fn update(&self, id: RecordId, draft: &PayrollDraft) -> Result<PayrollRecord> {
        let changed = self.conn.execute(
            "UPDATE payroll SET staff_name = ?1, month = ?2, base_salary = ?3, allowances = ?4, \
             deductions = ?5, payment_status = ?6, updated_at = datetime('now') WHERE id = ?7",
            rusqlite::params![
                draft.staff_name,
                draft.month,
                draft.base_salary,
                draft.allowances,
                draft.deductions,
                draft.payment_status.as_str(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "payroll record", id });
        }
        self.get_payroll(id)
    }

    fn delete(&self, id: RecordId) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM payroll WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "payroll record", id });
        }
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<PayrollRecord>> {
        let rows = self.search_rows(
            PAYROLL_SELECT,
            PAYROLL_FROM,
            "(p.staff_name LIKE ?1 ESCAPE '\\' OR p.month LIKE ?1 ESCAPE '\\')",
            &[like(term)],
            "p.month DESC, p.id DESC",
            payroll_row,
        )?;
        Ok(rows.into_iter().map(|r| r.derive_with(&self.rules)).collect())
    }
}

impl Backend<MarkRecord> for Store {
    fn fetch_list(&self, query: &ListQuery) -> Result<Page<MarkRecord>> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if let Some(student_id) = query.student_id {
            clauses.push("m.student_id = ?");
            params.push(Value::Integer(student_id));
        }
        if let Some(term) = &query.term {
            clauses.push("(s.name LIKE ? ESCAPE '\\' OR \
                 m.subject LIKE ? ESCAPE '\\' OR m.exam LIKE ? ESCAPE '\\')");
            params.extend(std::iter::repeat(like(term)).take(3));
        }
        let mut page = self.fetch_page(
            MARK_SELECT,
            MARK_FROM,
            &clauses,
            &params,
            "m.subject, m.exam, m.id",
            query,
            mark_row,
        )?;
        page.data = page.data.into_iter().map(|r| r.derive_with(&self.rules)).collect();
        Ok(page)
    }

    fn create(&self, draft: &MarkDraft) -> Result<MarkRecord> {
        self.ensure_active_student(draft.student_id)?;
        self.conn.execute(
            "INSERT INTO marks (student_id, subject, exam, marks_obtained, max_marks) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                draft.student_id,
                draft.subject,
                draft.exam,
                draft.marks_obtained,
                draft.max_marks,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, student_id = draft.student_id, "mark recorded");
        self.get_mark(id)
    }

    fn update(&self, id: RecordId, draft: &MarkDraft) -> Result<MarkRecord> {
        self.ensure_student_change("marks", id, draft.student_id)?;
        let changed = self.conn.execute(
            "UPDATE marks SET student_id = ?1, subject = ?2, exam = ?3, marks_obtained = ?4, \
             max_marks = ?5, updated_at = datetime('now') WHERE id = ?6",
            rusqlite::params![
                draft.student_id,
                draft.subject,
                draft.exam,
                draft.marks_obtained,
                draft.max_marks,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "mark", id });
        }
        self.get_mark(id)
    }

    fn delete(&self, id: RecordId) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM marks WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CmsError::NotFound { entity: "mark", id });
        }
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<MarkRecord>> {
        let rows = self.search_rows(
            MARK_SELECT,
            MARK_FROM,
            "(s.name LIKE ?1 ESCAPE '\\' OR \
                 m.subject LIKE ?1 ESCAPE '\\' OR m.exam LIKE ?1 ESCAPE '\\')",
            &[like(term)],
            "m.id DESC",
            mark_row,
        )?;
        Ok(rows.into_iter().map(|r| r.derive_with(&self.rules)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::BalancePolicy;
    use crate::models::Grade;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn fee_draft(student_id: RecordId, amount: f64, paid: f64) -> LedgerDraft {
        LedgerDraft {
            kind: LedgerKind::Fee,
            student_id: Some(student_id),
            party: None,
            category: "Tuition".into(),
            description: None,
            amount,
            paid_amount: paid,
            status: PaymentStatus::Partial,
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
        }
    }

    fn expense_draft(party: &str, amount: f64) -> LedgerDraft {
        LedgerDraft {
            kind: LedgerKind::Expense,
            student_id: None,
            party: Some(party.into()),
            category: "Lab supplies".into(),
            description: Some("Beakers".into()),
            amount,
            paid_amount: 0.0,
            status: PaymentStatus::Pending,
            date: NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
        }
    }

    #[test]
    fn test_create_fee_resolves_student_and_derives_balance() {
        let (_dir, store) = test_store();
        let s = store.add_student("Asha Rao", "CS-001", Some("CS")).unwrap();
        let rec: LedgerRecord = store.create(&fee_draft(s.id, 1000.0, 600.0)).unwrap();
        assert_eq!(rec.party, "Asha Rao");
        assert_eq!(rec.balance, 400.0);
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
    }

    #[test]
    fn test_missing_student_falls_back_to_na() {
        let (_dir, store) = test_store();
        // Rows left behind by older databases that had no foreign keys.
        store
            .conn()
            .execute_batch(
                "PRAGMA foreign_keys=OFF;
                 INSERT INTO ledger (kind, student_id, category, amount, date)
                     VALUES ('fee', 999, 'Tuition', 100, '2025-08-01');
                 INSERT INTO marks (student_id, subject, exam, marks_obtained)
                     VALUES (999, 'Math', 'Final', 81);",
            )
            .unwrap();
        let rec = store.get_ledger(1).unwrap();
        assert_eq!(rec.party, NOT_AVAILABLE);
        let mark = store.get_mark(1).unwrap();
        assert_eq!(mark.student_name, NOT_AVAILABLE);
        assert_eq!(mark.grade, Some(Grade::A));
    }

    #[test]
    fn test_unknown_student_is_rejected() {
        let (_dir, store) = test_store();
        let fee: Result<LedgerRecord> = store.create(&fee_draft(999, 100.0, 0.0));
        assert!(matches!(fee, Err(CmsError::NotFound { entity: "student", id: 999 })));
        let mark: Result<MarkRecord> = store.create(&MarkDraft {
            student_id: 999,
            subject: "Math".into(),
            exam: "Final".into(),
            marks_obtained: 81.0,
            max_marks: 100.0,
        });
        assert!(matches!(mark, Err(CmsError::NotFound { entity: "student", .. })));
    }

    #[test]
    fn test_inactive_student_only_blocks_new_links() {
        let (_dir, store) = test_store();
        let gone = store.add_student("Ben Cole", "ME-002", None).unwrap();
        let other = store.add_student("Chen Wei", "CS-022", None).unwrap();
        let rec: LedgerRecord = store.create(&fee_draft(gone.id, 500.0, 0.0)).unwrap();
        store.remove_student(gone.id).unwrap();

        let fresh: Result<LedgerRecord> = store.create(&fee_draft(gone.id, 50.0, 0.0));
        assert!(matches!(fresh, Err(CmsError::NotFound { entity: "student", .. })));

        // Recording a payment on the existing fee still works.
        let paid: LedgerRecord = store.update(rec.id, &fee_draft(gone.id, 500.0, 500.0)).unwrap();
        assert_eq!(paid.balance, 0.0);

        let moved: LedgerRecord = store.update(rec.id, &fee_draft(other.id, 500.0, 500.0)).unwrap();
        assert_eq!(moved.party, "Chen Wei");
        let back: Result<LedgerRecord> = store.update(rec.id, &fee_draft(gone.id, 500.0, 500.0));
        assert!(back.is_err());
    }

    #[test]
    fn test_soft_deleted_student_still_resolves() {
        let (_dir, store) = test_store();
        let s = store.add_student("Ben Cole", "ME-002", None).unwrap();
        let rec: LedgerRecord = store.create(&fee_draft(s.id, 500.0, 0.0)).unwrap();
        store.remove_student(s.id).unwrap();
        assert!(store.list_students().unwrap().is_empty());
        assert_eq!(store.get_ledger(rec.id).unwrap().party, "Ben Cole");
        assert!(matches!(store.remove_student(s.id), Err(CmsError::NotFound { .. })));
    }

    #[test]
    fn test_fetch_list_filters_and_paginates() {
        let (_dir, store) = test_store();
        let s = store.add_student("Asha Rao", "CS-001", None).unwrap();
        for i in 0..5 {
            let _: LedgerRecord = store.create(&fee_draft(s.id, 100.0 * (i + 1) as f64, 0.0)).unwrap();
        }
        let _: LedgerRecord = store.create(&expense_draft("Sigma Scientific", 75.0)).unwrap();

        let fees: Page<LedgerRecord> = store
            .fetch_list(&ListQuery::page(1, 2).with_kind(Some(LedgerKind::Fee)))
            .unwrap();
        assert_eq!(fees.data.len(), 2);
        assert_eq!(fees.pagination.total_items, 5);
        assert_eq!(fees.pagination.total_pages, 3);

        let last: Page<LedgerRecord> = store
            .fetch_list(&ListQuery::page(3, 2).with_kind(Some(LedgerKind::Fee)))
            .unwrap();
        assert_eq!(last.data.len(), 1);

        let sigma: Page<LedgerRecord> = store
            .fetch_list(&ListQuery::default().with_term(Some("sigma".into())))
            .unwrap();
        assert_eq!(sigma.data.len(), 1);
        assert_eq!(sigma.data[0].kind, LedgerKind::Expense);
    }

    #[test]
    fn test_update_and_delete_ledger() {
        let (_dir, store) = test_store();
        let rec: LedgerRecord = store.create(&expense_draft("Acme", 300.0)).unwrap();
        let mut draft = expense_draft("Acme", 300.0);
        draft.paid_amount = 300.0;
        draft.status = PaymentStatus::Paid;
        let updated: LedgerRecord = store.update(rec.id, &draft).unwrap();
        assert_eq!(updated.balance, 0.0);
        assert_eq!(updated.status, PaymentStatus::Paid);

        Backend::<LedgerRecord>::delete(&store, rec.id).unwrap();
        assert!(matches!(store.get_ledger(rec.id), Err(CmsError::NotFound { .. })));
        assert!(matches!(
            Backend::<LedgerRecord>::delete(&store, rec.id),
            Err(CmsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_dir, store) = test_store();
        let res: Result<LedgerRecord> = store.update(77, &expense_draft("Acme", 1.0));
        assert!(matches!(res, Err(CmsError::NotFound { id: 77, .. })));
    }

    #[test]
    fn test_clamp_rules_apply_on_read() {
        let (_dir, store) = test_store();
        store
            .conn()
            .execute(
                "INSERT INTO ledger (kind, party, category, amount, paid_amount, status, date) \
                 VALUES ('fee', 'Legacy', 'Tuition', 100, 150, 'paid', '2024-01-01')",
                [],
            )
            .unwrap();
        let id = store.conn().last_insert_rowid();
        assert_eq!(store.get_ledger(id).unwrap().balance, -50.0);
        let store = store.with_rules(DeriveRules {
            balance: BalancePolicy::ClampToZero,
        });
        assert_eq!(store.get_ledger(id).unwrap().balance, 0.0);
    }

    #[test]
    fn test_payroll_roundtrip_derives_net() {
        let (_dir, store) = test_store();
        let rec: PayrollRecord = store
            .create(&PayrollDraft {
                staff_name: "M. Okafor".into(),
                month: "2025-04".into(),
                base_salary: 40000.0,
                allowances: 3500.0,
                deductions: 1200.0,
                payment_status: PaymentStatus::Pending,
            })
            .unwrap();
        assert_eq!(rec.net_salary, 42300.0);
        let found: Vec<PayrollRecord> = store.search("okafor").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_marks_filter_by_student() {
        let (_dir, store) = test_store();
        let a = store.add_student("Asha", "R1", None).unwrap();
        let b = store.add_student("Ben", "R2", None).unwrap();
        for (sid, marks) in [(a.id, 92.0), (a.id, 58.0), (b.id, 33.0)] {
            let _: MarkRecord = store
                .create(&MarkDraft {
                    student_id: sid,
                    subject: "Physics".into(),
                    exam: "Unit test".into(),
                    marks_obtained: marks,
                    max_marks: 100.0,
                })
                .unwrap();
        }
        let page: Page<MarkRecord> = store
            .fetch_list(&ListQuery::default().with_student(Some(a.id)))
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|m| m.student_name == "Asha"));
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let (_dir, store) = test_store();
        for party in ["A_1 Traders", "AB1 Traders", "50% Off Mart", "500 Supplies"] {
            let _: LedgerRecord = store.create(&expense_draft(party, 10.0)).unwrap();
        }
        let underscore: Vec<LedgerRecord> = store.search("A_1").unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].party, "A_1 Traders");
        let percent: Vec<LedgerRecord> = store.search("50%").unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].party, "50% Off Mart");
    }
}
