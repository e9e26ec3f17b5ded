//! Extraction-oracle abstraction
//!
//! The oracle turns unstructured input (receipt images, banking SMS,
//! credit-card emails) into structured fields, and synthesizes the advisory
//! report from pre-computed aggregates. It is the system's only
//! non-deterministic dependency.
//!
//! # Architecture
//!
//! - `ExtractionBackend` trait: defines the oracle operations
//! - `ExtractionClient` enum: concrete wrapper providing Clone +
//!   compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! Backends are constructed from an explicit [`OracleConfig`]; nothing in
//! this module reads the environment.

mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use types::*;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::OracleConfig;
use crate::error::Result;

/// Trait defining the oracle operations
///
/// All backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Extract transaction fields from a base64-encoded receipt image
    async fn scan_receipt(&self, image_base64: &str) -> Result<ParsedReceipt>;

    /// Classify a banking SMS and extract transaction fields
    async fn parse_sms(&self, body: &str, received_on: NaiveDate) -> Result<SmsParse>;

    /// Classify an email and extract credit-card bill fields
    async fn parse_email(&self, subject: &str, body: &str) -> Result<EmailParse>;

    /// Synthesize the advisory report from pre-computed aggregates
    ///
    /// Never fails on malformed oracle output - the typed fallback report
    /// stands in. Transport failures still surface as errors.
    async fn financial_insights(&self, request: &InsightRequest) -> Result<FinancialInsights>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete oracle client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ExtractionClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ExtractionClient {
    /// Create a client from oracle configuration
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        Ok(ExtractionClient::Ollama(OllamaBackend::new(config)?))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ExtractionClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ExtractionBackend for ExtractionClient {
    async fn scan_receipt(&self, image_base64: &str) -> Result<ParsedReceipt> {
        match self {
            ExtractionClient::Ollama(b) => b.scan_receipt(image_base64).await,
            ExtractionClient::Mock(b) => b.scan_receipt(image_base64).await,
        }
    }

    async fn parse_sms(&self, body: &str, received_on: NaiveDate) -> Result<SmsParse> {
        match self {
            ExtractionClient::Ollama(b) => b.parse_sms(body, received_on).await,
            ExtractionClient::Mock(b) => b.parse_sms(body, received_on).await,
        }
    }

    async fn parse_email(&self, subject: &str, body: &str) -> Result<EmailParse> {
        match self {
            ExtractionClient::Ollama(b) => b.parse_email(subject, body).await,
            ExtractionClient::Mock(b) => b.parse_email(subject, body).await,
        }
    }

    async fn financial_insights(&self, request: &InsightRequest) -> Result<FinancialInsights> {
        match self {
            ExtractionClient::Ollama(b) => b.financial_insights(request).await,
            ExtractionClient::Mock(b) => b.financial_insights(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ExtractionClient::Ollama(b) => b.health_check().await,
            ExtractionClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ExtractionClient::Ollama(b) => b.model(),
            ExtractionClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ExtractionClient::Ollama(b) => b.host(),
            ExtractionClient::Mock(b) => b.host(),
        }
    }
}
