//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use std::str::FromStr;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionKind, YearMonth};

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind_str: String = row.get(1)?;
    let date_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;

    Ok(Transaction {
        id: row.get(0)?,
        kind: TransactionKind::from_str(&kind_str).unwrap_or(TransactionKind::Expense),
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
        created_at: parse_datetime(&created_at_str),
    })
}

const TRANSACTION_COLUMNS: &str = "id, kind, amount, category, description, date, created_at";

impl Database {
    /// Insert a transaction, returning its new ID
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO transactions (kind, amount, category, description, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                tx.kind.as_str(),
                tx.amount,
                tx.category,
                tx.description,
                tx.date.to_string(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;

        conn.query_row(
            &format!(
                "SELECT {} FROM transactions WHERE id = ?",
                TRANSACTION_COLUMNS
            ),
            params![id],
            row_to_transaction,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Transaction {} not found", id)))
    }

    /// List transactions, newest first, with optional kind and month filters
    ///
    /// Month filtering uses a half-open date range rather than matching on
    /// the textual form of the date column.
    pub fn list_transactions(
        &self,
        kind: Option<TransactionKind>,
        month: Option<YearMonth>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(k) = kind {
            conditions.push("kind = ?".to_string());
            params_vec.push(Box::new(k.as_str().to_string()));
        }

        if let Some(m) = month {
            let (from, to) = m.date_range();
            conditions.push("date >= ? AND date < ?".to_string());
            params_vec.push(Box::new(from.to_string()));
            params_vec.push(Box::new(to.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM transactions {} ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let transactions = stmt
            .query_map(params_refs.as_slice(), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// List transactions with dates in `[from, to)`, oldest first
    pub fn list_transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE date >= ? AND date < ? ORDER BY date, id",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(
                params![from.to_string(), to.to_string()],
                row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Replace a transaction's fields
    pub fn update_transaction(&self, id: i64, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE transactions
            SET kind = ?, amount = ?, category = ?, description = ?, date = ?
            WHERE id = ?
            "#,
            params![
                tx.kind.as_str(),
                tx.amount,
                tx.category,
                tx.description,
                tx.date.to_string(),
                id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }

        drop(conn);
        self.get_transaction(id)
    }

    /// Delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;

        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }

        Ok(())
    }
}
