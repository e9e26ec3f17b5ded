//! Analytics handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use paisa_core::ai::FinancialInsights;
use paisa_core::analytics::{
    self, AmountRequiredReport, MonthlyFlow, PocketMoneyReport, SummaryReport,
};
use paisa_core::models::YearMonth;
use paisa_core::advisor;

/// Query parameters for the summary endpoint
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Restrict to a calendar month (YYYY-MM)
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct MonthlyChartResponse {
    pub data: Vec<MonthlyFlow>,
}

/// GET /api/analytics/summary - Totals and category breakdown
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<SummaryReport>, AppError> {
    let month = params
        .month
        .as_deref()
        .map(YearMonth::from_str)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    let report = analytics::summary(&state.db, month)?;
    Ok(Json(report))
}

/// GET /api/analytics/monthly-chart - Last six months of income/expense flow
pub async fn get_monthly_chart(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonthlyChartResponse>, AppError> {
    let data = analytics::monthly_chart(&state.db)?;
    Ok(Json(MonthlyChartResponse { data }))
}

/// GET /api/analytics/amount-required - This month's obligations
pub async fn get_amount_required(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AmountRequiredReport>, AppError> {
    let today = chrono::Local::now().date_naive();
    let report = analytics::amount_required(&state.db, today)?;
    Ok(Json(report))
}

/// GET /api/analytics/pocket-money - Discretionary daily budget
pub async fn get_pocket_money(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PocketMoneyReport>, AppError> {
    let today = chrono::Local::now().date_naive();
    let report = analytics::pocket_money(&state.db, today)?;
    Ok(Json(report))
}

/// GET /api/analytics/ai-insights - Oracle-synthesized advisory report
pub async fn get_ai_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FinancialInsights>, AppError> {
    let oracle = state
        .oracle
        .as_ref()
        .ok_or_else(|| AppError::unavailable("Extraction oracle not configured"))?;

    let today = chrono::Local::now().date_naive();
    let report = advisor::advisory_report(&state.db, oracle, today).await?;
    Ok(Json(report))
}
