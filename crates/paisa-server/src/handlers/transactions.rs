//! Transaction handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use paisa_core::models::{NewTransaction, Transaction, TransactionKind, YearMonth};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Filter by kind (income or expense)
    pub kind: Option<String>,
    /// Filter by calendar month (YYYY-MM)
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transaction: Transaction,
}

/// GET /api/transactions - List transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let kind = params
        .kind
        .as_deref()
        .map(TransactionKind::from_str)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    let month = params
        .month
        .as_deref()
        .map(YearMonth::from_str)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    let transactions = state.db.list_transactions(kind, month)?;
    Ok(Json(TransactionListResponse { transactions }))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = state.db.get_transaction(id)?;
    Ok(Json(TransactionResponse { transaction }))
}

/// POST /api/transactions - Create a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(new_tx): Json<NewTransaction>,
) -> Result<Json<TransactionResponse>, AppError> {
    if new_tx.amount < 0.0 {
        return Err(AppError::bad_request("Amount must be non-negative"));
    }

    let id = state.db.insert_transaction(&new_tx)?;
    let transaction = state.db.get_transaction(id)?;
    Ok(Json(TransactionResponse { transaction }))
}

/// PUT /api/transactions/:id - Replace a transaction
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(new_tx): Json<NewTransaction>,
) -> Result<Json<TransactionResponse>, AppError> {
    if new_tx.amount < 0.0 {
        return Err(AppError::bad_request("Amount must be non-negative"));
    }

    let transaction = state.db.update_transaction(id, &new_tx)?;
    Ok(Json(TransactionResponse { transaction }))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<crate::SuccessResponse>, AppError> {
    state.db.delete_transaction(id)?;
    Ok(Json(crate::SuccessResponse { success: true }))
}
