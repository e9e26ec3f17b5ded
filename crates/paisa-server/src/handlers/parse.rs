//! Oracle-backed parsing handlers: receipt OCR, SMS, and email
//!
//! These endpoints fail fast when the oracle is unreachable; malformed
//! oracle output degrades to per-field defaults inside the core.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use paisa_core::ai::{
    EmailBill, EmailParse, ExtractionBackend, ExtractionClient, ParsedReceipt, SmsParse,
    SmsTransaction,
};

/// Pull the oracle out of state or fail with 503
fn oracle(state: &AppState) -> Result<&ExtractionClient, AppError> {
    state
        .oracle
        .as_ref()
        .ok_or_else(|| AppError::unavailable("Extraction oracle not configured"))
}

/// POST /api/ocr/receipt request body
#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub image_base64: String,
}

/// POST /api/parse/sms request body
#[derive(Debug, Deserialize)]
pub struct SmsRequest {
    pub body: String,
    pub date: NaiveDate,
}

/// POST /api/parse/email request body
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Serialize)]
pub struct SmsParseResponse {
    pub is_transaction: bool,
    // A None flattens to no extra fields at all
    #[serde(flatten)]
    pub transaction: Option<SmsTransaction>,
}

#[derive(Serialize)]
pub struct EmailParseResponse {
    pub is_bill: bool,
    #[serde(flatten)]
    pub bill: Option<EmailBill>,
}

/// POST /api/ocr/receipt - Extract transaction fields from a receipt image
pub async fn scan_receipt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReceiptRequest>,
) -> Result<Json<ParsedReceipt>, AppError> {
    let receipt = oracle(&state)?.scan_receipt(&request.image_base64).await?;
    Ok(Json(receipt))
}

/// POST /api/parse/sms - Classify a banking SMS
pub async fn parse_sms(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SmsRequest>,
) -> Result<Json<SmsParseResponse>, AppError> {
    let parsed = oracle(&state)?
        .parse_sms(&request.body, request.date)
        .await?;

    let response = match parsed {
        SmsParse::NotTransaction => SmsParseResponse {
            is_transaction: false,
            transaction: None,
        },
        SmsParse::Transaction(tx) => SmsParseResponse {
            is_transaction: true,
            transaction: Some(tx),
        },
    };
    Ok(Json(response))
}

/// POST /api/parse/email - Classify an email as a credit-card bill
pub async fn parse_email(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<EmailParseResponse>, AppError> {
    let parsed = oracle(&state)?
        .parse_email(&request.subject, &request.body)
        .await?;

    let response = match parsed {
        EmailParse::NotBill => EmailParseResponse {
            is_bill: false,
            bill: None,
        },
        EmailParse::Bill(bill) => EmailParseResponse {
            is_bill: true,
            bill: Some(bill),
        },
    };
    Ok(Json(response))
}
