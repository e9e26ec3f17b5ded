//! UPI payment handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use paisa_core::models::{NewUpiPayment, UpiPayment};

#[derive(Serialize)]
pub struct UpiPaymentListResponse {
    pub payments: Vec<UpiPayment>,
}

/// GET /api/upi-payments - List UPI payments
pub async fn list_upi_payments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UpiPaymentListResponse>, AppError> {
    let payments = state.db.list_upi_payments()?;
    Ok(Json(UpiPaymentListResponse { payments }))
}

/// POST /api/upi-payments - Record a UPI payment
pub async fn create_upi_payment(
    State(state): State<Arc<AppState>>,
    Json(new_payment): Json<NewUpiPayment>,
) -> Result<Json<UpiPaymentListResponse>, AppError> {
    if new_payment.amount < 0.0 {
        return Err(AppError::bad_request("Amount must be non-negative"));
    }

    state.db.insert_upi_payment(&new_payment)?;
    let payments = state.db.list_upi_payments()?;
    Ok(Json(UpiPaymentListResponse { payments }))
}
