//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. Receipt images go to the vision
//! model as base64 payloads; SMS/email/advisory prompts go to the text
//! model. Every call runs under the configured timeout.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::{Error, Result};

use super::parsing::{
    parse_email_fields, parse_financial_insights, parse_receipt_fields, parse_sms_fields,
};
use super::types::{EmailParse, FinancialInsights, InsightRequest, ParsedReceipt, SmsParse};
use super::ExtractionBackend;

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    vision_model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend from oracle configuration
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            vision_model: config
                .vision_model
                .clone()
                .unwrap_or_else(|| config.model.clone()),
        })
    }

    /// Send a text prompt and return the raw response
    async fn generate(&self, prompt: String) -> Result<String> {
        self.request(OllamaRequest {
            model: self.model.clone(),
            prompt,
            images: None,
            stream: false,
        })
        .await
    }

    /// Send a prompt plus a base64 image to the vision model
    async fn generate_with_image(&self, prompt: String, image_base64: String) -> Result<String> {
        self.request(OllamaRequest {
            model: self.vision_model.clone(),
            prompt,
            images: Some(vec![image_base64]),
            stream: false,
        })
        .await
    }

    async fn request(&self, request: OllamaRequest) -> Result<String> {
        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Oracle(format!("Oracle returned HTTP {}", status)));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(model = %request.model, "Oracle response: {}", ollama_response.response);

        Ok(ollama_response.response)
    }
}

/// Request to the Ollama generate API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    stream: bool,
}

/// Response from the Ollama generate API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl ExtractionBackend for OllamaBackend {
    async fn scan_receipt(&self, image_base64: &str) -> Result<ParsedReceipt> {
        // Reject payloads that aren't base64 before shipping them upstream
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(image_base64)
            .map_err(|e| Error::InvalidData(format!("Receipt image is not base64: {}", e)))?;

        let prompt = "You are a receipt OCR assistant. Extract the following from this receipt:\n\
                      1. Total amount (just the number)\n\
                      2. Merchant/store name\n\
                      3. Date (in YYYY-MM-DD format; if not visible use today's date)\n\
                      4. Category (choose from: Food, Transport, Shopping, Bills, Entertainment, Health, Other)\n\
                      \n\
                      Respond in this exact format:\n\
                      Amount: [number]\n\
                      Merchant: [name]\n\
                      Date: [YYYY-MM-DD]\n\
                      Category: [category]"
            .to_string();

        let response = self
            .generate_with_image(prompt, image_base64.to_string())
            .await?;

        let today = chrono::Local::now().date_naive();
        Ok(parse_receipt_fields(&response, today))
    }

    async fn parse_sms(&self, body: &str, received_on: NaiveDate) -> Result<SmsParse> {
        let prompt = format!(
            "You are an SMS parser for banking transactions. Parse this SMS and identify \
             whether it is a banking transaction (credit/debit):\n\
             SMS: {}\n\
             \n\
             If it is a transaction, respond in this format:\n\
             Type: [debit/credit]\n\
             Amount: [number]\n\
             Merchant: [name or N/A]\n\
             Date: [YYYY-MM-DD]\n\
             IsUPI: [yes/no]\n\
             \n\
             If it is not a banking transaction, respond with: NOT_TRANSACTION",
            body
        );

        let response = self.generate(prompt).await?;
        Ok(parse_sms_fields(&response, received_on))
    }

    async fn parse_email(&self, subject: &str, body: &str) -> Result<EmailParse> {
        // Long marketing emails drown the signal; the first 500 chars carry
        // the bill fields when there is one
        let body: String = body.chars().take(500).collect();

        let prompt = format!(
            "You are an email parser for credit card bills. Parse this email and identify \
             whether it is a credit card bill:\n\
             Subject: {}\n\
             Body: {}\n\
             \n\
             If it is a credit card bill, respond in this format:\n\
             BillName: [bank name + credit card]\n\
             Amount: [number]\n\
             DueDate: [YYYY-MM-DD]\n\
             \n\
             If it is not a credit card bill, respond with: NOT_BILL",
            subject, body
        );

        let response = self.generate(prompt).await?;
        let today = chrono::Local::now().date_naive();
        Ok(parse_email_fields(&response, today))
    }

    async fn financial_insights(&self, request: &InsightRequest) -> Result<FinancialInsights> {
        let loans = if request.loan_obligations.is_empty() {
            "none".to_string()
        } else {
            request
                .loan_obligations
                .iter()
                .map(|l| format!("{} ({:.2}/month)", l.name, l.amount))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let categories = request
            .top_categories
            .iter()
            .map(|(name, amount)| format!("{}: {:.2}", name, amount))
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = format!(
            "You are a personal financial advisor. Based on the data below, produce a \
             financial health report.\n\
             \n\
             Average monthly income: {:.2}\n\
             Average monthly expenses: {:.2}\n\
             Months of data: {}\n\
             Loan-like recurring obligations: {}\n\
             Top spending categories: {}\n\
             Unpaid bills total: {:.2}\n\
             Total recurring obligations: {:.2}\n\
             \n\
             Respond with ONLY a JSON object in exactly this schema:\n\
             {{\n\
               \"loan_strategy\": {{\"current_timeline\": \"...\", \"accelerated_timeline\": \"...\", \"recommendation\": \"...\"}},\n\
               \"savings_opportunities\": [{{\"category\": \"...\", \"current\": 0, \"suggested\": 0, \"savings\": 0, \"tip\": \"...\"}}],\n\
               \"spending_insights\": [\"...\"],\n\
               \"financial_health_score\": 0,\n\
               \"top_recommendations\": [\"...\"],\n\
               \"projections\": {{\"six_month\": \"...\", \"one_year\": \"...\"}}\n\
             }}",
            request.avg_monthly_income,
            request.avg_monthly_expense,
            request.months_observed,
            loans,
            categories,
            request.unpaid_bills_total,
            request.recurring_total,
        );

        let response = self.generate(prompt).await?;
        Ok(parse_financial_insights(&response))
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
