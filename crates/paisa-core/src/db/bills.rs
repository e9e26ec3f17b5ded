//! Bill and recurring-template operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use std::str::FromStr;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Bill, BillSource, NewBill, YearMonth};

fn row_to_bill(row: &Row<'_>) -> rusqlite::Result<Bill> {
    let due_date_str: String = row.get(3)?;
    let source_str: String = row.get(6)?;
    let created_at_str: String = row.get(10)?;

    Ok(Bill {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        due_date: NaiveDate::parse_from_str(&due_date_str, "%Y-%m-%d").unwrap_or_default(),
        is_paid: row.get(4)?,
        category: row.get(5)?,
        source: BillSource::from_str(&source_str).unwrap_or_default(),
        is_recurring: row.get(7)?,
        recurring_day: row.get(8)?,
        parent_bill_id: row.get(9)?,
        created_at: parse_datetime(&created_at_str),
    })
}

const BILL_COLUMNS: &str = "id, name, amount, due_date, is_paid, category, source, is_recurring, \
                            recurring_day, parent_bill_id, created_at";

impl Database {
    /// Insert a bill (template or instance), returning its new ID
    pub fn insert_bill(&self, bill: &NewBill) -> Result<i64> {
        if bill.is_recurring && bill.parent_bill_id.is_none() {
            let day = bill
                .recurring_day
                .ok_or_else(|| Error::InvalidData("Recurring bill requires a day".to_string()))?;
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidData(format!(
                    "Recurring day out of range: {}",
                    day
                )));
            }
        }

        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO bills (name, amount, due_date, is_paid, category, source, is_recurring, recurring_day, parent_bill_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                bill.name,
                bill.amount,
                bill.due_date.to_string(),
                bill.is_paid,
                bill.category,
                bill.source.as_str(),
                bill.is_recurring,
                bill.recurring_day,
                bill.parent_bill_id,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a bill by ID
    pub fn get_bill(&self, id: i64) -> Result<Bill> {
        let conn = self.conn()?;

        conn.query_row(
            &format!("SELECT {} FROM bills WHERE id = ?", BILL_COLUMNS),
            params![id],
            row_to_bill,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Bill {} not found", id)))
    }

    /// List all bills (templates and instances), due date ascending
    pub fn list_bills(&self, is_paid: Option<bool>) -> Result<Vec<Bill>> {
        let conn = self.conn()?;

        let (sql, params_vec): (String, Vec<Box<dyn rusqlite::ToSql>>) = match is_paid {
            Some(paid) => (
                format!(
                    "SELECT {} FROM bills WHERE is_paid = ? ORDER BY due_date, id",
                    BILL_COLUMNS
                ),
                vec![Box::new(paid)],
            ),
            None => (
                format!("SELECT {} FROM bills ORDER BY due_date, id", BILL_COLUMNS),
                vec![],
            ),
        };

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let bills = stmt
            .query_map(params_refs.as_slice(), row_to_bill)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bills)
    }

    /// List recurring templates (is_recurring, no parent)
    pub fn list_recurring_templates(&self) -> Result<Vec<Bill>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bills WHERE is_recurring = 1 AND parent_bill_id IS NULL ORDER BY id",
            BILL_COLUMNS
        ))?;

        let bills = stmt
            .query_map([], row_to_bill)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bills)
    }

    /// Find the instance materialized from a template for a given month
    pub fn find_bill_instance(&self, template_id: i64, month: YearMonth) -> Result<Option<Bill>> {
        let conn = self.conn()?;
        let (from, to) = month.date_range();

        let bill = conn
            .query_row(
                &format!(
                    "SELECT {} FROM bills WHERE parent_bill_id = ? AND due_date >= ? AND due_date < ?",
                    BILL_COLUMNS
                ),
                params![template_id, from.to_string(), to.to_string()],
                row_to_bill,
            )
            .optional()?;

        Ok(bill)
    }

    /// Atomically create a template's instance for the month of `due_date`
    ///
    /// Relies on the unique index on (parent_bill_id, due_month): when another
    /// writer created the instance first, the insert is a no-op and this
    /// returns None. This is the compare-and-insert primitive that keeps
    /// materialization idempotent under concurrency.
    pub fn insert_bill_instance(&self, template: &Bill, due_date: NaiveDate) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            r#"
            INSERT INTO bills (name, amount, due_date, is_paid, category, source, is_recurring, recurring_day, parent_bill_id)
            VALUES (?, ?, ?, 0, ?, ?, 0, NULL, ?)
            ON CONFLICT(parent_bill_id, due_month) WHERE parent_bill_id IS NOT NULL DO NOTHING
            "#,
            params![
                template.name,
                template.amount,
                due_date.to_string(),
                template.category,
                BillSource::Recurring.as_str(),
                template.id,
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(conn.last_insert_rowid()))
    }

    /// List payable bills (everything except templates) due in `[from, to)`
    pub fn list_payable_bills_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Bill>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM bills
            WHERE due_date >= ? AND due_date < ?
              AND NOT (is_recurring = 1 AND parent_bill_id IS NULL)
            ORDER BY due_date, id
            "#,
            BILL_COLUMNS
        ))?;

        let bills = stmt
            .query_map(params![from.to_string(), to.to_string()], row_to_bill)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bills)
    }

    /// Replace a bill's fields
    pub fn update_bill(&self, id: i64, bill: &NewBill) -> Result<Bill> {
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE bills
            SET name = ?, amount = ?, due_date = ?, is_paid = ?, category = ?,
                source = ?, is_recurring = ?, recurring_day = ?, parent_bill_id = ?
            WHERE id = ?
            "#,
            params![
                bill.name,
                bill.amount,
                bill.due_date.to_string(),
                bill.is_paid,
                bill.category,
                bill.source.as_str(),
                bill.is_recurring,
                bill.recurring_day,
                bill.parent_bill_id,
                id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Bill {} not found", id)));
        }

        drop(conn);
        self.get_bill(id)
    }

    /// Mark a bill paid or unpaid
    pub fn set_bill_paid(&self, id: i64, is_paid: bool) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE bills SET is_paid = ? WHERE id = ?",
            params![is_paid, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Bill {} not found", id)));
        }

        Ok(())
    }

    /// Delete a bill; deleting a template cascades to its instances
    pub fn delete_bill(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;

        let deleted = conn.execute("DELETE FROM bills WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Bill {} not found", id)));
        }

        Ok(())
    }
}
