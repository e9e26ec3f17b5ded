//! Advisory report assembly
//!
//! Gathers a 90-day trailing window of transactions plus the bill catalog,
//! reduces them to aggregates, and hands the aggregates to the extraction
//! oracle for natural-language synthesis. The oracle never sees raw rows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};

use crate::ai::{
    ExtractionBackend, ExtractionClient, FinancialInsights, InsightRequest, LoanObligation,
};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Bill, Transaction, TransactionKind, YearMonth};
use crate::recurring;

/// Days of transaction history fed into the report
const WINDOW_DAYS: i64 = 90;

/// Templates whose name contains one of these count as loan-like
const LOAN_KEYWORDS: &[&str] = &["loan", "emi", "credit"];

/// How many spending categories the prompt carries
const TOP_CATEGORY_LIMIT: usize = 5;

/// Build the aggregate bundle for the oracle prompt
///
/// `bills` is the full catalog, templates included. Averages divide by the
/// number of distinct months observed in the window; with no observed
/// months both averages are zero.
pub fn build_insight_request(transactions: &[Transaction], bills: &[Bill]) -> InsightRequest {
    let months: BTreeSet<YearMonth> = transactions
        .iter()
        .map(|t| YearMonth::containing(t.date))
        .collect();

    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income)
        .map(|t| t.amount)
        .sum();
    let total_expense: f64 = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
        .map(|t| t.amount)
        .sum();

    let (avg_monthly_income, avg_monthly_expense) = if months.is_empty() {
        (0.0, 0.0)
    } else {
        let n = months.len() as f64;
        (total_income / n, total_expense / n)
    };

    let loan_obligations = bills
        .iter()
        .filter(|b| b.is_template())
        .filter(|b| {
            let name = b.name.to_lowercase();
            LOAN_KEYWORDS.iter().any(|kw| name.contains(kw))
        })
        .map(|b| LoanObligation {
            name: b.name.clone(),
            amount: b.amount,
        })
        .collect();

    let mut spend_by_category: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions {
        if tx.kind == TransactionKind::Expense {
            *spend_by_category.entry(tx.category.clone()).or_insert(0.0) += tx.amount;
        }
    }
    let mut top_categories: Vec<(String, f64)> = spend_by_category.into_iter().collect();
    // Largest spend first; the BTreeMap ordering breaks amount ties by name
    top_categories.sort_by(|a, b| b.1.total_cmp(&a.1));
    top_categories.truncate(TOP_CATEGORY_LIMIT);

    let unpaid_bills_total = bills
        .iter()
        .filter(|b| !b.is_template() && !b.is_paid)
        .map(|b| b.amount)
        .sum();
    let recurring_total = bills
        .iter()
        .filter(|b| b.is_template())
        .map(|b| b.amount)
        .sum();

    InsightRequest {
        months_observed: months.len(),
        avg_monthly_income,
        avg_monthly_expense,
        loan_obligations,
        top_categories,
        unpaid_bills_total,
        recurring_total,
    }
}

/// Produce the advisory report as of `today`
///
/// Materializes the current month's recurring instances first so the bill
/// snapshot is complete. Oracle transport failures propagate; malformed
/// oracle output degrades to the typed fallback inside the backend.
pub async fn advisory_report(
    db: &Database,
    oracle: &ExtractionClient,
    today: NaiveDate,
) -> Result<FinancialInsights> {
    recurring::materialize_for_month(db, YearMonth::containing(today))?;

    let from = today - Duration::days(WINDOW_DAYS);
    let to = today + Duration::days(1);
    let transactions = db.list_transactions_between(from, to)?;
    let bills = db.list_bills(None)?;

    let request = build_insight_request(&transactions, &bills);
    tracing::debug!(
        months = request.months_observed,
        loans = request.loan_obligations.len(),
        "Requesting advisory report"
    );

    oracle.financial_insights(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillSource;
    use chrono::Utc;

    fn tx(kind: TransactionKind, amount: f64, category: &str, date: &str) -> Transaction {
        Transaction {
            id: 0,
            kind,
            amount,
            category: category.to_string(),
            description: String::new(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            created_at: Utc::now(),
        }
    }

    fn template(name: &str, amount: f64) -> Bill {
        Bill {
            id: 0,
            name: name.to_string(),
            amount,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            is_paid: false,
            category: "Bills".to_string(),
            source: BillSource::Manual,
            is_recurring: true,
            recurring_day: Some(1),
            parent_bill_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_averages_divide_by_distinct_months() {
        let transactions = vec![
            tx(TransactionKind::Income, 1000.0, "Salary", "2024-01-05"),
            tx(TransactionKind::Income, 1000.0, "Salary", "2024-02-05"),
            tx(TransactionKind::Expense, 300.0, "Food", "2024-02-10"),
        ];

        let request = build_insight_request(&transactions, &[]);
        assert_eq!(request.months_observed, 2);
        assert_eq!(request.avg_monthly_income, 1000.0);
        assert_eq!(request.avg_monthly_expense, 150.0);
    }

    #[test]
    fn test_no_months_means_zero_averages() {
        let request = build_insight_request(&[], &[]);
        assert_eq!(request.months_observed, 0);
        assert_eq!(request.avg_monthly_income, 0.0);
        assert_eq!(request.avg_monthly_expense, 0.0);
    }

    #[test]
    fn test_loan_like_templates_matched_case_insensitively() {
        let bills = vec![
            template("Car LOAN", 5000.0),
            template("Home EMI", 12000.0),
            template("Credit Card", 3000.0),
            template("Gym", 50.0),
        ];

        let request = build_insight_request(&[], &bills);
        let names: Vec<_> = request
            .loan_obligations
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Car LOAN", "Home EMI", "Credit Card"]);
    }

    #[test]
    fn test_top_categories_ranked_and_truncated() {
        let mut transactions = Vec::new();
        for (i, category) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            transactions.push(tx(
                TransactionKind::Expense,
                (i as f64 + 1.0) * 10.0,
                category,
                "2024-03-01",
            ));
        }

        let request = build_insight_request(&transactions, &[]);
        assert_eq!(request.top_categories.len(), 5);
        assert_eq!(request.top_categories[0].0, "G");
        assert_eq!(request.top_categories[0].1, 70.0);
        assert_eq!(request.top_categories[4].0, "C");
    }

    #[test]
    fn test_bill_totals_split_templates_from_instances() {
        let mut instance = template("Gym", 50.0);
        instance.is_recurring = false;
        instance.recurring_day = None;
        instance.parent_bill_id = Some(1);
        instance.source = BillSource::Recurring;

        let mut paid = instance.clone();
        paid.is_paid = true;
        paid.amount = 80.0;

        let bills = vec![template("Rent", 15000.0), instance, paid];
        let request = build_insight_request(&[], &bills);
        assert_eq!(request.recurring_total, 15000.0);
        assert_eq!(request.unpaid_bills_total, 50.0);
    }

    #[tokio::test]
    async fn test_advisory_report_with_mock_oracle() {
        let db = Database::in_memory().unwrap();
        db.insert_bill(&crate::models::NewBill {
            name: "Car Loan".to_string(),
            amount: 5000.0,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            is_paid: false,
            category: "Bills".to_string(),
            source: BillSource::Manual,
            is_recurring: true,
            recurring_day: Some(10),
            parent_bill_id: None,
        })
        .unwrap();

        let oracle = ExtractionClient::mock();
        let today = chrono::Local::now().date_naive();
        let report = advisory_report(&db, &oracle, today).await.unwrap();
        assert!(report.financial_health_score > 0);

        // The materializer ran: the loan template has a current-month instance
        let month = YearMonth::containing(today);
        let templates = db.list_recurring_templates().unwrap();
        assert!(db
            .find_bill_instance(templates[0].id, month)
            .unwrap()
            .is_some());
    }
}
