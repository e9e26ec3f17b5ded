//! UPI payment records

use chrono::NaiveDate;
use rusqlite::{params, Row};
use std::str::FromStr;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewUpiPayment, UpiPayment, UpiStatus};

fn row_to_payment(row: &Row<'_>) -> rusqlite::Result<UpiPayment> {
    let date_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;

    Ok(UpiPayment {
        id: row.get(0)?,
        amount: row.get(1)?,
        recipient: row.get(2)?,
        upi_id: row.get(3)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
        status: UpiStatus::from_str(&status_str).unwrap_or_default(),
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Insert a UPI payment, returning its new ID
    pub fn insert_upi_payment(&self, payment: &NewUpiPayment) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO upi_payments (amount, recipient, upi_id, date, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                payment.amount,
                payment.recipient,
                payment.upi_id,
                payment.date.to_string(),
                payment.status.as_str(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List UPI payments, newest first
    pub fn list_upi_payments(&self) -> Result<Vec<UpiPayment>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, amount, recipient, upi_id, date, status, created_at
            FROM upi_payments
            ORDER BY date DESC, id DESC
            "#,
        )?;

        let payments = stmt
            .query_map([], row_to_payment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }
}
