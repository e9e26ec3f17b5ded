//! Paisa Core Library
//!
//! Shared functionality for the Paisa budget planner:
//! - Database access and migrations
//! - Recurring-bill materialization (lazy, idempotent, once per month)
//! - Financial metrics: summaries, monthly series, amount required,
//!   pocket money
//! - Advisory report assembly
//! - Pluggable extraction-oracle backends (Ollama, mock)

pub mod advisor;
pub mod ai;
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod recurring;

pub use ai::{
    EmailBill, EmailParse, ExtractionBackend, ExtractionClient, FinancialInsights, InsightRequest,
    MockBackend, OllamaBackend, ParsedReceipt, SmsParse, SmsTransaction,
};
pub use analytics::{AmountRequiredReport, MonthlyFlow, PocketMoneyReport, SummaryReport};
pub use config::{AppConfig, OracleConfig};
pub use db::Database;
pub use error::{Error, Result};
