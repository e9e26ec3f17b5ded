//! Recurring-bill materialization
//!
//! Bills marked recurring act as templates; each calendar month every
//! template gets exactly one payable instance. There is no background
//! scheduler: every bill-reading operation calls
//! [`ensure_current_month_instances`] first, so instances appear lazily on
//! the first read of the month.
//!
//! Idempotency is guaranteed by the unique index on
//! `(parent_bill_id, due_month)` - a concurrent or repeated call finds the
//! insert reduced to a no-op rather than creating a duplicate.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Bill, YearMonth};

/// Ensure every recurring template has an instance for the current month
///
/// Returns the number of instances created (0 when everything already
/// existed). Per-template failures are logged and skipped so one malformed
/// template cannot block the rest.
pub fn ensure_current_month_instances(db: &Database) -> Result<usize> {
    let today = chrono::Local::now().date_naive();
    materialize_for_month(db, YearMonth::containing(today))
}

/// Ensure every recurring template has an instance for the given month
pub fn materialize_for_month(db: &Database, month: YearMonth) -> Result<usize> {
    let templates = db.list_recurring_templates()?;
    let mut created = 0;

    for template in &templates {
        match materialize_template(db, template, month) {
            Ok(Some(id)) => {
                debug!(
                    template_id = template.id,
                    instance_id = id,
                    month = %month,
                    "Materialized recurring bill instance"
                );
                created += 1;
            }
            Ok(None) => {}
            Err(e) => {
                // Availability over strict consistency: skip and move on
                warn!(
                    template_id = template.id,
                    name = %template.name,
                    error = %e,
                    "Failed to materialize recurring bill"
                );
            }
        }
    }

    Ok(created)
}

/// Materialize a single template for a month, if not already present
///
/// Returns the new instance ID, or None when the instance already exists
/// (including when a concurrent writer created it between our check and
/// insert - the unique index absorbs that race).
fn materialize_template(db: &Database, template: &Bill, month: YearMonth) -> Result<Option<i64>> {
    if db.find_bill_instance(template.id, month)?.is_some() {
        return Ok(None);
    }

    let due_date = template_due_date(template, month)?;
    db.insert_bill_instance(template, due_date)
}

/// Due date for a template's instance in a month
///
/// The template's day is clamped to the last valid day of the month, so a
/// day-31 template falls due on Feb 28/29 rather than rolling into March.
fn template_due_date(template: &Bill, month: YearMonth) -> Result<NaiveDate> {
    let day = template.recurring_day.ok_or_else(|| {
        Error::InvalidData(format!(
            "Template {} has no recurring day",
            template.id
        ))
    })?;

    Ok(month.with_day_clamped(day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillSource, NewBill};

    fn gym_template() -> NewBill {
        NewBill {
            name: "Gym".to_string(),
            amount: 50.0,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            is_paid: false,
            category: "Health".to_string(),
            source: BillSource::Manual,
            is_recurring: true,
            recurring_day: Some(5),
            parent_bill_id: None,
        }
    }

    #[test]
    fn test_materializes_one_instance_per_template() {
        let db = Database::in_memory().unwrap();
        let template_id = db.insert_bill(&gym_template()).unwrap();

        let month = YearMonth {
            year: 2024,
            month: 3,
        };
        let created = materialize_for_month(&db, month).unwrap();
        assert_eq!(created, 1);

        let instance = db.find_bill_instance(template_id, month).unwrap().unwrap();
        assert_eq!(
            instance.due_date,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(!instance.is_paid);
        assert_eq!(instance.source, BillSource::Recurring);
        assert_eq!(instance.parent_bill_id, Some(template_id));
        assert_eq!(instance.amount, 50.0);
    }

    #[test]
    fn test_repeated_materialization_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let template_id = db.insert_bill(&gym_template()).unwrap();

        let month = YearMonth {
            year: 2024,
            month: 3,
        };
        assert_eq!(materialize_for_month(&db, month).unwrap(), 1);
        assert_eq!(materialize_for_month(&db, month).unwrap(), 0);
        assert_eq!(materialize_for_month(&db, month).unwrap(), 0);

        let (from, to) = month.date_range();
        let instances: Vec<_> = db
            .list_payable_bills_between(from, to)
            .unwrap()
            .into_iter()
            .filter(|b| b.parent_bill_id == Some(template_id))
            .collect();
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_distinct_months_get_distinct_instances() {
        let db = Database::in_memory().unwrap();
        let template_id = db.insert_bill(&gym_template()).unwrap();

        let march = YearMonth {
            year: 2024,
            month: 3,
        };
        let april = YearMonth {
            year: 2024,
            month: 4,
        };
        assert_eq!(materialize_for_month(&db, march).unwrap(), 1);
        assert_eq!(materialize_for_month(&db, april).unwrap(), 1);

        assert!(db.find_bill_instance(template_id, march).unwrap().is_some());
        assert!(db.find_bill_instance(template_id, april).unwrap().is_some());
    }

    #[test]
    fn test_day_31_clamps_in_february() {
        let db = Database::in_memory().unwrap();
        let mut template = gym_template();
        template.name = "Rent".to_string();
        template.recurring_day = Some(31);
        let template_id = db.insert_bill(&template).unwrap();

        let feb = YearMonth {
            year: 2023,
            month: 2,
        };
        assert_eq!(materialize_for_month(&db, feb).unwrap(), 1);

        let instance = db.find_bill_instance(template_id, feb).unwrap().unwrap();
        assert_eq!(
            instance.due_date,
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_malformed_template_is_skipped() {
        let db = Database::in_memory().unwrap();
        db.insert_bill(&gym_template()).unwrap();

        // Clear the recurring day behind the API's back to simulate a
        // malformed template row
        let conn = db.conn().unwrap();
        conn.execute(
            "UPDATE bills SET recurring_day = NULL WHERE name = 'Gym'",
            [],
        )
        .unwrap();
        drop(conn);

        let mut healthy = gym_template();
        healthy.name = "Internet".to_string();
        healthy.recurring_day = Some(10);
        let healthy_id = db.insert_bill(&healthy).unwrap();

        let month = YearMonth {
            year: 2024,
            month: 3,
        };
        // The malformed template is skipped; the healthy one still gets
        // its instance
        assert_eq!(materialize_for_month(&db, month).unwrap(), 1);
        assert!(db.find_bill_instance(healthy_id, month).unwrap().is_some());
    }

    #[test]
    fn test_instance_insert_race_is_absorbed() {
        let db = Database::in_memory().unwrap();
        let template_id = db.insert_bill(&gym_template()).unwrap();
        let template = db.get_bill(template_id).unwrap();

        let due = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        // Two writers insert the same (template, month) pair; the second
        // hits the unique index and becomes a no-op
        assert!(db.insert_bill_instance(&template, due).unwrap().is_some());
        assert!(db.insert_bill_instance(&template, due).unwrap().is_none());
    }
}
