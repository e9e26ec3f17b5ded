//! Types for extraction-oracle requests and responses

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::TransactionKind;

/// Fields extracted from a receipt image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub amount: f64,
    pub merchant: String,
    pub date: NaiveDate,
    pub category: String,
}

/// Result of parsing a banking SMS
#[derive(Debug, Clone, PartialEq)]
pub enum SmsParse {
    /// The message is not a banking transaction
    NotTransaction,
    /// A recognized debit or credit
    Transaction(SmsTransaction),
}

/// Transaction details extracted from an SMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub merchant: String,
    pub date: NaiveDate,
    pub is_upi: bool,
    pub category: String,
}

/// Result of parsing an email for a credit-card bill
#[derive(Debug, Clone, PartialEq)]
pub enum EmailParse {
    /// The email is not a credit-card bill
    NotBill,
    /// A recognized bill
    Bill(EmailBill),
}

/// Bill details extracted from an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailBill {
    pub bill_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

/// A loan-like recurring obligation included in the advisory prompt
#[derive(Debug, Clone, Serialize)]
pub struct LoanObligation {
    pub name: String,
    pub amount: f64,
}

/// Aggregates handed to the oracle for advisory-report synthesis
///
/// Assembled by the advisor from a 90-day transaction window plus the bill
/// catalog; the oracle only ever sees these derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct InsightRequest {
    pub months_observed: usize,
    pub avg_monthly_income: f64,
    pub avg_monthly_expense: f64,
    pub loan_obligations: Vec<LoanObligation>,
    /// Top spending categories, largest first, at most five
    pub top_categories: Vec<(String, f64)>,
    pub unpaid_bills_total: f64,
    pub recurring_total: f64,
}

/// Loan payoff strategy section of the advisory report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanStrategy {
    pub current_timeline: String,
    pub accelerated_timeline: String,
    pub recommendation: String,
}

/// A category where spending could be reduced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub category: String,
    pub current: f64,
    pub suggested: f64,
    pub savings: f64,
    pub tip: String,
}

/// Balance projections section of the advisory report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projections {
    pub six_month: String,
    pub one_year: String,
}

/// The advisory report synthesized by the oracle
///
/// Always fully populated: when the oracle's output cannot be decoded the
/// deterministic [`fallback`](Self::fallback) stands in, so consumers never
/// handle a partial report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialInsights {
    pub loan_strategy: LoanStrategy,
    pub savings_opportunities: Vec<SavingsOpportunity>,
    pub spending_insights: Vec<String>,
    pub financial_health_score: i64,
    pub top_recommendations: Vec<String>,
    pub projections: Projections,
}

impl FinancialInsights {
    /// Deterministic stand-in used when the oracle's output cannot be parsed
    pub fn fallback() -> Self {
        Self {
            loan_strategy: LoanStrategy {
                current_timeline: "Unable to analyze loan timeline right now".to_string(),
                accelerated_timeline: "Unable to analyze loan timeline right now".to_string(),
                recommendation: "Keep making payments on time and review your loans monthly"
                    .to_string(),
            },
            savings_opportunities: vec![],
            spending_insights: vec![
                "Detailed insights are temporarily unavailable; your spending data is safe"
                    .to_string(),
            ],
            financial_health_score: 70,
            top_recommendations: vec![
                "Track your expenses regularly".to_string(),
                "Pay bills before their due dates".to_string(),
                "Set aside part of your income as savings".to_string(),
            ],
            projections: Projections {
                six_month: "Projection unavailable".to_string(),
                one_year: "Projection unavailable".to_string(),
            },
        }
    }
}
