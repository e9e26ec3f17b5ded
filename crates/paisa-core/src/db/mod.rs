//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `transactions` - Income/expense transaction CRUD and range queries
//! - `bills` - Bill and recurring-template operations
//! - `upi` - UPI payment records
//! - `categories` - Category list/create and default seeding

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod bills;
mod categories;
mod transactions;
mod upi;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;
        db.seed_default_categories()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/paisa_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Transactions (income and expenses)
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                kind TEXT NOT NULL,                        -- income, expense
                amount REAL NOT NULL CHECK (amount >= 0),
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date DATE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_kind ON transactions(kind);

            -- Bills: recurring templates (is_recurring = 1, parent_bill_id NULL)
            -- and payable instances (parent_bill_id set)
            CREATE TABLE IF NOT EXISTS bills (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                due_date DATE NOT NULL,
                is_paid BOOLEAN NOT NULL DEFAULT 0,
                category TEXT NOT NULL DEFAULT 'Credit Card',
                source TEXT NOT NULL DEFAULT 'manual',     -- manual, email, sms, recurring
                is_recurring BOOLEAN NOT NULL DEFAULT 0,
                recurring_day INTEGER,                     -- 1-31, templates only
                parent_bill_id INTEGER REFERENCES bills(id) ON DELETE CASCADE,
                -- Calendar month of the due date, stored for the uniqueness
                -- constraint below
                due_month TEXT GENERATED ALWAYS AS (strftime('%Y-%m', due_date)) STORED,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_bills_due_date ON bills(due_date);
            CREATE INDEX IF NOT EXISTS idx_bills_is_paid ON bills(is_paid);

            -- One instance per (template, calendar month). Concurrent
            -- materializers race on insert; the index makes the second
            -- insert a no-op instead of a duplicate.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_bills_parent_month
                ON bills(parent_bill_id, due_month)
                WHERE parent_bill_id IS NOT NULL;

            -- UPI payments (informational records)
            CREATE TABLE IF NOT EXISTS upi_payments (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL CHECK (amount >= 0),
                recipient TEXT NOT NULL,
                upi_id TEXT NOT NULL,
                date DATE NOT NULL,
                status TEXT NOT NULL DEFAULT 'completed',  -- completed, pending, failed
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_upi_payments_date ON upi_payments(date);

            -- Categories
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,                        -- income, expense
                icon TEXT NOT NULL DEFAULT '💰',
                color TEXT NOT NULL DEFAULT '#4CAF50',
                UNIQUE(name, kind)
            );
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
