//! Paisa Web Server
//!
//! Axum-based REST API for the Paisa budget planner. Routes map onto the
//! core library's operations; the handlers own request validation and
//! error-to-status-code mapping, nothing more.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use paisa_core::ai::{ExtractionBackend, ExtractionClient};
use paisa_core::db::Database;

mod handlers;

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Extraction oracle; None disables the parsing and insights endpoints
    pub oracle: Option<ExtractionClient>,
}

/// Create the application router
pub fn create_router(db: Database, oracle: Option<ExtractionClient>) -> Router {
    if let Some(ref client) = oracle {
        info!(
            host = client.host(),
            model = client.model(),
            "Extraction oracle configured"
        );
    } else {
        info!("Extraction oracle not configured (set ORACLE_HOST to enable parsing and insights)");
    }

    let state = Arc::new(AppState { db, oracle });

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        // Bills
        .route(
            "/bills",
            get(handlers::list_bills).post(handlers::create_bill),
        )
        .route(
            "/bills/:id",
            put(handlers::update_bill).delete(handlers::delete_bill),
        )
        .route("/bills/:id/paid", patch(handlers::mark_bill_paid))
        // UPI payments
        .route(
            "/upi-payments",
            get(handlers::list_upi_payments).post(handlers::create_upi_payment),
        )
        // Oracle-backed parsing
        .route("/ocr/receipt", post(handlers::scan_receipt))
        .route("/parse/sms", post(handlers::parse_sms))
        .route("/parse/email", post(handlers::parse_email))
        // Analytics
        .route("/analytics/summary", get(handlers::get_summary))
        .route("/analytics/monthly-chart", get(handlers::get_monthly_chart))
        .route(
            "/analytics/amount-required",
            get(handlers::get_amount_required),
        )
        .route("/analytics/pocket-money", get(handlers::get_pocket_money))
        .route("/analytics/ai-insights", get(handlers::get_ai_insights));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        // The API serves a local companion app; CORS stays wide open
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Success response
#[derive(serde::Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<paisa_core::Error> for AppError {
    fn from(err: paisa_core::Error) -> Self {
        use paisa_core::Error as CoreError;

        match err {
            CoreError::NotFound(msg) => Self {
                status: StatusCode::NOT_FOUND,
                message: msg,
                internal: None,
            },
            CoreError::InvalidData(msg) => Self {
                status: StatusCode::BAD_REQUEST,
                message: msg,
                internal: None,
            },
            CoreError::Http(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Extraction oracle unreachable".to_string(),
                internal: Some(err.into()),
            },
            CoreError::Oracle(msg) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: msg,
                internal: None,
            },
            _ => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(err.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests;
