//! Mock backend for testing
//!
//! Returns predictable responses for all oracle operations, so handlers and
//! the advisor can be exercised without a running LLM server.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::TransactionKind;

use super::types::{
    EmailBill, EmailParse, FinancialInsights, InsightRequest, LoanStrategy, ParsedReceipt,
    Projections, SavingsOpportunity, SmsParse, SmsTransaction,
};
use super::ExtractionBackend;

/// Mock oracle backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl ExtractionBackend for MockBackend {
    async fn scan_receipt(&self, _image_base64: &str) -> Result<ParsedReceipt> {
        Ok(ParsedReceipt {
            amount: 420.50,
            merchant: "Fresh Mart".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            category: "Food".to_string(),
        })
    }

    async fn parse_sms(&self, body: &str, received_on: NaiveDate) -> Result<SmsParse> {
        let lower = body.to_lowercase();

        let kind = if lower.contains("debited") || lower.contains("debit") {
            TransactionKind::Expense
        } else if lower.contains("credited") || lower.contains("credit") {
            TransactionKind::Income
        } else {
            return Ok(SmsParse::NotTransaction);
        };

        Ok(SmsParse::Transaction(SmsTransaction {
            kind,
            amount: 1500.0,
            merchant: "Mock Merchant".to_string(),
            date: received_on,
            is_upi: lower.contains("upi"),
            category: "Bills".to_string(),
        }))
    }

    async fn parse_email(&self, subject: &str, _body: &str) -> Result<EmailParse> {
        let lower = subject.to_lowercase();
        if !lower.contains("bill") && !lower.contains("statement") {
            return Ok(EmailParse::NotBill);
        }

        Ok(EmailParse::Bill(EmailBill {
            bill_name: "Mock Bank Credit Card".to_string(),
            amount: 8430.0,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
        }))
    }

    async fn financial_insights(&self, request: &InsightRequest) -> Result<FinancialInsights> {
        let savings_opportunities = request
            .top_categories
            .first()
            .map(|(category, amount)| {
                vec![SavingsOpportunity {
                    category: category.clone(),
                    current: *amount,
                    suggested: amount * 0.8,
                    savings: amount * 0.2,
                    tip: format!("Trim {} spending by a fifth", category),
                }]
            })
            .unwrap_or_default();

        Ok(FinancialInsights {
            loan_strategy: LoanStrategy {
                current_timeline: "24 months at the current pace".to_string(),
                accelerated_timeline: "18 months with extra payments".to_string(),
                recommendation: "Round up each loan payment".to_string(),
            },
            savings_opportunities,
            spending_insights: vec!["Spending is stable month over month".to_string()],
            financial_health_score: 82,
            top_recommendations: vec!["Automate your savings".to_string()],
            projections: Projections {
                six_month: "Modest savings growth".to_string(),
                one_year: "A comfortable emergency fund".to_string(),
            },
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
