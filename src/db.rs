use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

// Derived columns (balance, net salary, grade) are not stored; they are
// recomputed on every read.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    roll_number TEXT NOT NULL UNIQUE,
    department TEXT,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS ledger (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL,
    student_id INTEGER,
    party TEXT,
    category TEXT NOT NULL,
    description TEXT,
    amount REAL NOT NULL,
    paid_amount REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    date TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT,
    FOREIGN KEY (student_id) REFERENCES students(id)
);

CREATE TABLE IF NOT EXISTS payroll (
    id INTEGER PRIMARY KEY,
    staff_name TEXT NOT NULL,
    month TEXT NOT NULL,
    base_salary REAL NOT NULL,
    allowances REAL NOT NULL DEFAULT 0,
    deductions REAL NOT NULL DEFAULT 0,
    payment_status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT
);

CREATE TABLE IF NOT EXISTS marks (
    id INTEGER PRIMARY KEY,
    student_id INTEGER NOT NULL,
    subject TEXT NOT NULL,
    exam TEXT NOT NULL,
    marks_obtained REAL NOT NULL,
    max_marks REAL NOT NULL DEFAULT 100,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT,
    FOREIGN KEY (student_id) REFERENCES students(id)
);

CREATE INDEX IF NOT EXISTS idx_ledger_kind ON ledger(kind);
CREATE INDEX IF NOT EXISTS idx_marks_student ON marks(student_id);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["students", "ledger", "payroll", "marks"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_roll_number_unique() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO students (name, roll_number) VALUES ('A', 'R1')", []).unwrap();
        let dup = conn.execute("INSERT INTO students (name, roll_number) VALUES ('B', 'R1')", []);
        assert!(dup.is_err());
    }

    #[test]
    fn test_marks_require_existing_student() {
        let (_dir, conn) = test_db();
        let orphan = conn.execute(
            "INSERT INTO marks (student_id, subject, exam, marks_obtained) VALUES (999, 'Math', 'Final', 70)",
            [],
        );
        assert!(orphan.is_err());
        let orphan_fee = conn.execute(
            "INSERT INTO ledger (kind, student_id, category, amount, date) VALUES ('fee', 999, 'Tuition', 100, '2025-09-01')",
            [],
        );
        assert!(orphan_fee.is_err());
    }
}
