//! Bill handlers
//!
//! Every read materializes the current month's recurring instances first,
//! so clients always see this month's obligations without a scheduler.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, SuccessResponse};
use paisa_core::models::{Bill, NewBill};
use paisa_core::recurring;

/// Query parameters for listing bills
#[derive(Debug, Deserialize)]
pub struct BillQuery {
    /// Filter by payment status (paid or unpaid)
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct BillListResponse {
    pub bills: Vec<Bill>,
}

#[derive(Serialize)]
pub struct BillResponse {
    pub bill: Bill,
}

/// PATCH /api/bills/:id/paid request body
#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    pub is_paid: bool,
}

/// GET /api/bills - List bills, materializing this month's instances first
pub async fn list_bills(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BillQuery>,
) -> Result<Json<BillListResponse>, AppError> {
    recurring::ensure_current_month_instances(&state.db)?;

    let is_paid = match params.status.as_deref() {
        Some("paid") => Some(true),
        Some("unpaid") => Some(false),
        None => None,
        Some(other) => {
            return Err(AppError::bad_request(&format!(
                "Unknown bill status filter: {}",
                other
            )))
        }
    };

    let bills = state.db.list_bills(is_paid)?;
    Ok(Json(BillListResponse { bills }))
}

/// POST /api/bills - Create a bill or recurring template
pub async fn create_bill(
    State(state): State<Arc<AppState>>,
    Json(new_bill): Json<NewBill>,
) -> Result<Json<BillResponse>, AppError> {
    if new_bill.amount < 0.0 {
        return Err(AppError::bad_request("Amount must be non-negative"));
    }

    let id = state.db.insert_bill(&new_bill)?;
    let bill = state.db.get_bill(id)?;
    Ok(Json(BillResponse { bill }))
}

/// PUT /api/bills/:id - Replace a bill
pub async fn update_bill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(new_bill): Json<NewBill>,
) -> Result<Json<BillResponse>, AppError> {
    if new_bill.amount < 0.0 {
        return Err(AppError::bad_request("Amount must be non-negative"));
    }

    let bill = state.db.update_bill(id, &new_bill)?;
    Ok(Json(BillResponse { bill }))
}

/// PATCH /api/bills/:id/paid - Mark a bill paid or unpaid
pub async fn mark_bill_paid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<MarkPaidRequest>,
) -> Result<Json<BillResponse>, AppError> {
    state.db.set_bill_paid(id, request.is_paid)?;
    let bill = state.db.get_bill(id)?;
    Ok(Json(BillResponse { bill }))
}

/// DELETE /api/bills/:id - Delete a bill (templates cascade to instances)
pub async fn delete_bill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_bill(id)?;
    Ok(Json(SuccessResponse { success: true }))
}
