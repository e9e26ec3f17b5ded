//! Response parsing for extraction-oracle output
//!
//! The oracle answers with labeled lines ("Amount: 420.50") for the
//! receipt/SMS/email operations and with JSON for the advisory report.
//! Labeled-field extraction is best-effort with a named default per field;
//! the advisory JSON is a strict decode with a typed fallback. Partial
//! structured success is preferred over failing a whole request.

use chrono::NaiveDate;
use regex::Regex;

use crate::models::TransactionKind;

use super::types::{
    EmailBill, EmailParse, FinancialInsights, ParsedReceipt, SmsParse, SmsTransaction,
};

/// Extract the first capture of `pattern` from `text`
fn capture<'t>(pattern: &str, text: &'t str) -> Option<&'t str> {
    // Patterns are compile-time constants; an invalid one is a programming
    // error surfaced by the unit tests
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

fn capture_amount(text: &str) -> Option<f64> {
    capture(r"(?i)Amount:\s*([\d.]+)", text).and_then(|s| s.parse().ok())
}

fn capture_date(text: &str) -> Option<NaiveDate> {
    capture(r"Date:\s*(\d{4}-\d{2}-\d{2})", text)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Parse receipt fields from oracle output
///
/// Unmatched fields fall back to named defaults: amount 0.0, merchant
/// "Unknown", category "Other", date = `today`.
pub fn parse_receipt_fields(response: &str, today: NaiveDate) -> ParsedReceipt {
    ParsedReceipt {
        amount: capture_amount(response).unwrap_or(0.0),
        merchant: capture(r"Merchant:\s*(.+)", response)
            .unwrap_or("Unknown")
            .to_string(),
        date: capture_date(response).unwrap_or(today),
        category: capture(r"Category:\s*(.+)", response)
            .unwrap_or("Other")
            .to_string(),
    }
}

/// Parse SMS transaction fields from oracle output
///
/// A NOT_TRANSACTION marker short-circuits; otherwise a debit maps to an
/// expense and anything else to income, with `received_on` as the date
/// fallback.
pub fn parse_sms_fields(response: &str, received_on: NaiveDate) -> SmsParse {
    if response.contains("NOT_TRANSACTION") {
        return SmsParse::NotTransaction;
    }

    let kind = match capture(r"(?i)Type:\s*(debit|credit)", response) {
        Some(t) if t.eq_ignore_ascii_case("debit") => TransactionKind::Expense,
        _ => TransactionKind::Income,
    };

    let is_upi = capture(r"(?i)IsUPI:\s*(yes|no)", response)
        .map(|s| s.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);

    SmsParse::Transaction(SmsTransaction {
        kind,
        amount: capture_amount(response).unwrap_or(0.0),
        merchant: capture(r"Merchant:\s*(.+)", response)
            .unwrap_or("Unknown")
            .to_string(),
        date: capture_date(response).unwrap_or(received_on),
        is_upi,
        category: "Bills".to_string(),
    })
}

/// Parse credit-card bill fields from oracle output
///
/// A NOT_BILL marker short-circuits; an unmatched due date defaults to a
/// week from `today`.
pub fn parse_email_fields(response: &str, today: NaiveDate) -> EmailParse {
    if response.contains("NOT_BILL") {
        return EmailParse::NotBill;
    }

    EmailParse::Bill(EmailBill {
        bill_name: capture(r"BillName:\s*(.+)", response)
            .unwrap_or("Credit Card Bill")
            .to_string(),
        amount: capture_amount(response).unwrap_or(0.0),
        due_date: capture(r"DueDate:\s*(\d{4}-\d{2}-\d{2})", response)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .unwrap_or_else(|| today + chrono::Duration::days(7)),
    })
}

/// Strip a markdown code fence (```json ... ``` or ``` ... ```) wrapper
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Decode the advisory report from oracle output
///
/// Strips code fences, finds the outermost JSON object, and decodes it
/// strictly into [`FinancialInsights`]. Any failure - missing JSON, schema
/// mismatch, truncated output - yields the deterministic fallback report,
/// never an error.
pub fn parse_financial_insights(response: &str) -> FinancialInsights {
    let cleaned = strip_code_fences(response);

    let json_str = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => {
            tracing::warn!("No JSON object in advisory response, using fallback");
            return FinancialInsights::fallback();
        }
    };

    match serde_json::from_str(json_str) {
        Ok(insights) => insights,
        Err(e) => {
            tracing::warn!(error = %e, "Advisory response failed to decode, using fallback");
            FinancialInsights::fallback()
        }
    }
}
