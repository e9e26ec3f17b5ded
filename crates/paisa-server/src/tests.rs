//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use paisa_core::ai::ExtractionClient;
use paisa_core::db::Database;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, Some(ExtractionClient::mock()))
}

fn setup_test_app_without_oracle() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    (create_router(db.clone(), None), db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// ========== Categories ==========

#[tokio::test]
async fn test_default_categories_present() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 8);
}

#[tokio::test]
async fn test_create_category() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "name": "Education",
        "kind": "expense",
        "icon": "📚"
    });
    let response = app.oneshot(post_json("/api/categories", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["category"]["name"], "Education");
    assert_eq!(json["category"]["kind"], "expense");
}

// ========== Transactions ==========

#[tokio::test]
async fn test_transaction_create_and_list() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "kind": "expense",
        "amount": 200.0,
        "category": "Food",
        "description": "Groceries",
        "date": "2024-03-05"
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/transactions", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["transaction"]["amount"], 200.0);

    let response = app
        .oneshot(get("/api/transactions?month=2024-03&kind=expense"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transaction_invalid_month_filter() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/api/transactions?month=2024-13"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_transaction_is_404() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/transactions/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_negative_amount_rejected() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "kind": "expense",
        "amount": -5.0,
        "category": "Food",
        "date": "2024-03-05"
    });
    let response = app.oneshot(post_json("/api/transactions", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Bills ==========

#[tokio::test]
async fn test_bill_listing_materializes_recurring_instances() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "name": "Gym",
        "amount": 50.0,
        "due_date": "2024-01-05",
        "category": "Health",
        "is_recurring": true,
        "recurring_day": 5
    });
    let response = app.clone().oneshot(post_json("/api/bills", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // First read creates this month's instance: template + instance
    let response = app.clone().oneshot(get("/api/bills")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let bills = json["bills"].as_array().unwrap();
    assert_eq!(bills.len(), 2);

    let instance = bills
        .iter()
        .find(|b| !b["parent_bill_id"].is_null())
        .expect("materialized instance");
    assert_eq!(instance["source"], "recurring");
    assert_eq!(instance["is_paid"], false);

    // A second read must not create another instance
    let response = app.oneshot(get("/api/bills")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["bills"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bill_status_filter_and_mark_paid() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "name": "Electricity",
        "amount": 1200.0,
        "due_date": "2024-03-20",
        "category": "Bills"
    });
    let response = app.clone().oneshot(post_json("/api/bills", body)).await.unwrap();
    let json = get_body_json(response).await;
    let id = json["bill"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/bills/{}/paid", id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"is_paid": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/bills?status=unpaid")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["bills"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_bill_status_filter_rejected() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/bills?status=overdue")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== UPI payments ==========

#[tokio::test]
async fn test_upi_payment_round_trip() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": 250.0,
        "recipient": "Corner Store",
        "upi_id": "corner@upi",
        "date": "2024-03-09"
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/upi-payments", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/upi-payments")).await.unwrap();
    let json = get_body_json(response).await;
    let payments = json["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["status"], "completed");
}

// ========== Analytics ==========

async fn seed_march_transactions(app: &Router) {
    for (kind, amount, category, date) in [
        ("income", 1000.0, "Salary", "2024-03-01"),
        ("expense", 200.0, "Food", "2024-03-05"),
        ("expense", 300.0, "Bills", "2024-03-10"),
    ] {
        let body = serde_json::json!({
            "kind": kind,
            "amount": amount,
            "category": category,
            "date": date
        });
        let response = app
            .clone()
            .oneshot(post_json("/api/transactions", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_summary_scenario() {
    let app = setup_test_app();
    seed_march_transactions(&app).await;

    let response = app
        .oneshot(get("/api/analytics/summary?month=2024-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_income"], 1000.0);
    assert_eq!(json["total_expense"], 500.0);
    assert_eq!(json["balance"], 500.0);
    assert_eq!(json["category_breakdown"]["Food"], 200.0);
    assert_eq!(json["category_breakdown"]["Bills"], 300.0);
}

#[tokio::test]
async fn test_monthly_chart() {
    let app = setup_test_app();
    seed_march_transactions(&app).await;

    let response = app.oneshot(get("/api/analytics/monthly-chart")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["month"], "2024-03");
    assert_eq!(data[0]["income"], 1000.0);
    assert_eq!(data[0]["expense"], 500.0);
}

#[tokio::test]
async fn test_amount_required_and_pocket_money() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(get("/api/analytics/amount-required"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["amount_required"], 0.0);

    let response = app.oneshot(get("/api/analytics/pocket-money")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["pocket_money"].as_f64().unwrap() >= 0.0);
    assert!(json["daily_spendable"].as_f64().unwrap() >= 0.0);
    assert!(json["days_remaining"].as_u64().unwrap() >= 1);
}

// ========== Oracle-backed endpoints ==========

#[tokio::test]
async fn test_parse_sms_with_mock_oracle() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "body": "Rs 1500 debited via UPI to BigBasket",
        "date": "2024-03-11"
    });
    let response = app.oneshot(post_json("/api/parse/sms", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["is_transaction"], true);
    assert_eq!(json["kind"], "expense");
    assert_eq!(json["is_upi"], true);
}

#[tokio::test]
async fn test_parse_sms_non_transaction() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "body": "Your OTP is 123456",
        "date": "2024-03-11"
    });
    let response = app.oneshot(post_json("/api/parse/sms", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["is_transaction"], false);
    assert!(json.get("amount").is_none());
}

#[tokio::test]
async fn test_parse_email_with_mock_oracle() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "subject": "Your credit card bill is ready",
        "body": "Total due 8430, pay by 2024-03-28"
    });
    let response = app.oneshot(post_json("/api/parse/email", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["is_bill"], true);
    assert_eq!(json["amount"], 8430.0);
}

#[tokio::test]
async fn test_scan_receipt_with_mock_oracle() {
    let app = setup_test_app();

    let body = serde_json::json!({ "image_base64": "aGVsbG8=" });
    let response = app.oneshot(post_json("/api/ocr/receipt", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["merchant"], "Fresh Mart");
    assert_eq!(json["category"], "Food");
}

#[tokio::test]
async fn test_ai_insights_with_mock_oracle() {
    let app = setup_test_app();
    seed_march_transactions(&app).await;

    let response = app.oneshot(get("/api/analytics/ai-insights")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["financial_health_score"].as_i64().unwrap() > 0);
    assert!(json["loan_strategy"]["recommendation"].is_string());
    assert!(json["projections"]["six_month"].is_string());
}

#[tokio::test]
async fn test_oracle_endpoints_unavailable_without_config() {
    let (app, _db) = setup_test_app_without_oracle();

    let body = serde_json::json!({
        "body": "Rs 1500 debited",
        "date": "2024-03-11"
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/parse/sms", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app.oneshot(get("/api/analytics/ai-insights")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analytics_work_without_oracle() {
    let (app, _db) = setup_test_app_without_oracle();

    let response = app
        .clone()
        .oneshot(get("/api/analytics/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/bills")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
