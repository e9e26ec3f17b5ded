//! Financial metrics derived from transactions and bills
//!
//! Every derivation here is a pure computation over a snapshot fetched from
//! the database. The bill-based reports (amount required, pocket money)
//! materialize the current month's recurring instances before reading, so
//! callers always see the month's obligations.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Transaction, TransactionKind, YearMonth};
use crate::recurring;

/// Income/expense totals with an expense-only category breakdown
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    /// Expense totals per category; categories without expenses are absent
    pub category_breakdown: BTreeMap<String, f64>,
}

/// One month of income/expense flow
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyFlow {
    /// Calendar month, formatted YYYY-MM
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// Near-term obligations for the current month
#[derive(Debug, Clone, Serialize)]
pub struct AmountRequiredReport {
    pub month: String,
    /// Expenses so far plus unpaid bills due this month
    pub amount_required: f64,
    pub expense_total: f64,
    pub unpaid_bills: f64,
    pub paid_bills: f64,
    /// Unpaid recurring obligations, estimated from the template amount when
    /// no instance has been materialized yet. Informational; not part of
    /// `amount_required`.
    pub recurring_unpaid: f64,
}

/// Discretionary budget for the rest of the month
#[derive(Debug, Clone, Serialize)]
pub struct PocketMoneyReport {
    pub month: String,
    pub pocket_money: f64,
    pub daily_spendable: f64,
    pub days_remaining: u32,
    pub total_income: f64,
    pub total_expense: f64,
    pub unpaid_bills: f64,
    /// Sum of all recurring template amounts, for display only
    pub total_recurring: f64,
}

/// Sum transaction amounts of one kind
fn total_of_kind(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}

/// Summarize a transaction snapshot
pub fn summarize(transactions: &[Transaction]) -> SummaryReport {
    let total_income = total_of_kind(transactions, TransactionKind::Income);
    let total_expense = total_of_kind(transactions, TransactionKind::Expense);

    let mut category_breakdown: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions {
        if tx.kind == TransactionKind::Expense {
            *category_breakdown.entry(tx.category.clone()).or_insert(0.0) += tx.amount;
        }
    }

    SummaryReport {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        category_breakdown,
    }
}

/// Group transactions into per-month flows: the most recent 6 observed
/// months, chronologically ascending. Months with no transactions are
/// absent rather than zero-filled.
pub fn monthly_flows(transactions: &[Transaction]) -> Vec<MonthlyFlow> {
    let mut by_month: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();
    for tx in transactions {
        let entry = by_month
            .entry(YearMonth::containing(tx.date))
            .or_insert((0.0, 0.0));
        match tx.kind {
            TransactionKind::Income => entry.0 += tx.amount,
            TransactionKind::Expense => entry.1 += tx.amount,
        }
    }

    let skip = by_month.len().saturating_sub(6);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(month, (income, expense))| MonthlyFlow {
            month: month.to_string(),
            income,
            expense,
        })
        .collect()
}

/// Pocket-money arithmetic, floor-guarded against negative values and
/// empty day ranges
pub fn pocket_money_amounts(
    income: f64,
    expense: f64,
    unpaid_bills: f64,
    days_remaining: i64,
) -> (f64, f64) {
    let pocket = (income - expense - unpaid_bills).max(0.0);
    let daily = if days_remaining <= 0 {
        0.0
    } else {
        (pocket / days_remaining as f64).max(0.0)
    };
    (pocket, daily)
}

/// Summary over all transactions, or one month of them
pub fn summary(db: &Database, month: Option<YearMonth>) -> Result<SummaryReport> {
    let transactions = match month {
        Some(m) => {
            let (from, to) = m.date_range();
            db.list_transactions_between(from, to)?
        }
        None => db.list_transactions(None, None)?,
    };
    Ok(summarize(&transactions))
}

/// Monthly income/expense chart data over the whole history
pub fn monthly_chart(db: &Database) -> Result<Vec<MonthlyFlow>> {
    let transactions = db.list_transactions(None, None)?;
    Ok(monthly_flows(&transactions))
}

/// Amount required to cover the current month, as of `today`
pub fn amount_required(db: &Database, today: NaiveDate) -> Result<AmountRequiredReport> {
    let month = YearMonth::containing(today);
    recurring::materialize_for_month(db, month)?;

    let (from, to) = month.date_range();
    let transactions = db.list_transactions_between(from, to)?;
    let expense_total = total_of_kind(&transactions, TransactionKind::Expense);

    let bills = db.list_payable_bills_between(from, to)?;
    let unpaid_bills: f64 = bills.iter().filter(|b| !b.is_paid).map(|b| b.amount).sum();
    let paid_bills: f64 = bills.iter().filter(|b| b.is_paid).map(|b| b.amount).sum();

    // Per template: the materialized instance's amount while it remains
    // unpaid, or the template's base amount as an estimate when no instance
    // exists yet. Computed independently of amount_required.
    let mut recurring_unpaid = 0.0;
    for template in db.list_recurring_templates()? {
        match db.find_bill_instance(template.id, month)? {
            Some(instance) if !instance.is_paid => recurring_unpaid += instance.amount,
            Some(_) => {}
            None => recurring_unpaid += template.amount,
        }
    }

    Ok(AmountRequiredReport {
        month: month.to_string(),
        amount_required: expense_total + unpaid_bills,
        expense_total,
        unpaid_bills,
        paid_bills,
        recurring_unpaid,
    })
}

/// Discretionary daily budget for the rest of the month, as of `today`
pub fn pocket_money(db: &Database, today: NaiveDate) -> Result<PocketMoneyReport> {
    let month = YearMonth::containing(today);
    recurring::materialize_for_month(db, month)?;

    let (from, to) = month.date_range();
    let transactions = db.list_transactions_between(from, to)?;
    let total_income = total_of_kind(&transactions, TransactionKind::Income);
    let total_expense = total_of_kind(&transactions, TransactionKind::Expense);

    let unpaid_bills: f64 = db
        .list_payable_bills_between(from, to)?
        .iter()
        .filter(|b| !b.is_paid)
        .map(|b| b.amount)
        .sum();

    let total_recurring: f64 = db
        .list_recurring_templates()?
        .iter()
        .map(|t| t.amount)
        .sum();

    let days_remaining = month.days_in_month() as i64 - today.day() as i64 + 1;
    let (pocket_money, daily_spendable) =
        pocket_money_amounts(total_income, total_expense, unpaid_bills, days_remaining);

    Ok(PocketMoneyReport {
        month: month.to_string(),
        pocket_money,
        daily_spendable,
        days_remaining: days_remaining.max(0) as u32,
        total_income,
        total_expense,
        unpaid_bills,
        total_recurring,
    })
}
