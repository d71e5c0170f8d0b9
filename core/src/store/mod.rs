//! SQLite persistence layer: the data source the reports read from.
//!
//! RULE: Only the store talks to the database.
//! Analytics code receives materialized `Transaction` rows and never
//! executes SQL.

mod sales;

pub use sales::parse_sale_date;

use crate::error::ReportResult;
use rusqlite::Connection;

pub struct SalesStore {
    conn: Connection,
}

impl SalesStore {
    pub fn open(path: &str) -> ReportResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and demo runs).
    pub fn in_memory() -> ReportResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ReportResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_sales.sql"))?;
        Ok(())
    }
}
