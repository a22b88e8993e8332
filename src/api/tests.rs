use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::{self, format_timestamp, DbPool, GrantExpenditure, GrantReceipt};
use crate::AppState;

use super::create_router;

async fn test_app() -> (Router, DbPool) {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    let state = Arc::new(AppState::new(Config::default(), pool.clone()));
    (create_router(state), pool)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post(app: &Router, action: &str, data: Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/api/grants", Some(json!({ "action": action, "data": data }))).await
}

async fn get(app: &Router, query: &str) -> (StatusCode, Value) {
    send(app, Method::GET, &format!("/api/grants{}", query), None).await
}

fn grant_payload(start: &str, end: &str, frequency: Option<&str>, awarded: f64) -> Value {
    let mut data = json!({
        "name": "Summer Festival Staging",
        "grantor": "Regional Arts Council",
        "grantor_type": "state",
        "amount_awarded": awarded,
        "start_date": start,
        "end_date": end,
        "purpose": "Outdoor stage build",
        "contact_email": "programs@artscouncil.org"
    });
    if let Some(f) = frequency {
        data["reporting_frequency"] = json!(f);
    }
    data
}

async fn create_grant(app: &Router, data: Value) -> String {
    let (status, body) = post(app, "create_grant", data).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["grant"]["id"].as_str().unwrap().to_string()
}

async fn grant_count(pool: &DbPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM grants")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app().await;

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_create_grant_generates_monthly_schedule() {
    let (app, _) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-04-01T00:00:00Z", Some("monthly"), 10_000.0),
    )
    .await;

    let (status, body) = get(&app, &format!("?type=reports&grant_id={}", id)).await;
    assert_eq!(status, StatusCode::OK);

    let reports = body["reports"].as_array().unwrap();
    let due: Vec<&str> = reports.iter().map(|r| r["due_date"].as_str().unwrap()).collect();
    assert_eq!(
        due,
        vec![
            "2025-02-01T00:00:00.000Z",
            "2025-03-01T00:00:00.000Z",
            "2025-04-01T00:00:00.000Z",
            "2025-05-01T00:00:00.000Z",
        ]
    );

    assert_eq!(reports[0]["report_type"], "progress");
    assert_eq!(reports[0]["report_number"], 1);
    assert_eq!(reports[2]["report_number"], 3);
    assert_eq!(reports[3]["report_type"], "final");
    assert!(reports[3]["report_number"].is_null());
    assert!(reports.iter().all(|r| r["status"] == "pending"));
}

#[tokio::test]
async fn test_final_only_schedule_and_no_schedule() {
    let (app, _) = test_app().await;

    let final_only = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", Some("final_only"), 500.0),
    )
    .await;
    let (_, body) = get(&app, &format!("?type=reports&grant_id={}", final_only)).await;
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["report_type"], "final");
    assert_eq!(reports[0]["due_date"], "2025-12-31T00:00:00.000Z");

    let unscheduled = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 500.0),
    )
    .await;
    let (_, body) = get(&app, &format!("?type=reports&grant_id={}", unscheduled)).await;
    assert!(body["reports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_grant_rejects_unknown_frequency() {
    let (app, pool) = test_app().await;

    let (status, body) = post(
        &app,
        "create_grant",
        grant_payload("2025-01-01T00:00:00Z", "2025-07-01T00:00:00Z", Some("fortnightly"), 500.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(grant_count(&pool).await, 0);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM grant_reports")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_create_grant_rejects_oversized_window() {
    let (app, pool) = test_app().await;

    let (status, body) = post(
        &app,
        "create_grant",
        grant_payload("0001-01-01T00:00:00Z", "9999-12-31T00:00:00Z", Some("monthly"), 500.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["end_date"].is_array());
    assert_eq!(grant_count(&pool).await, 0);
}

#[tokio::test]
async fn test_create_grant_validation() {
    let (app, pool) = test_app().await;

    let (status, body) = post(&app, "create_grant", json!({ "name": "Missing everything" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let mut data = grant_payload("2025-06-01T00:00:00Z", "2025-01-01T00:00:00Z", None, 0.0);
    data["contact_email"] = json!("not-an-email");
    let (status, body) = post(&app, "create_grant", data).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = &body["error"]["details"];
    assert!(details["amount_awarded"].is_array());
    assert!(details["end_date"].is_array());
    assert!(details["contact_email"].is_array());

    assert_eq!(grant_count(&pool).await, 0);
}

#[tokio::test]
async fn test_unknown_action_touches_nothing() {
    let (app, pool) = test_app().await;

    let (status, body) = post(
        &app,
        "delete_all_grants",
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 100.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid action");

    let (status, _) = send(&app, Method::POST, "/api/grants", Some(json!({ "data": {} }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(grant_count(&pool).await, 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = test_app().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/grants")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expenditure_balance_enforced() {
    let (app, pool) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 1000.0),
    )
    .await;

    let spend = |amount: f64, category: &str| {
        json!({
            "grant_id": id,
            "amount": amount,
            "expenditure_date": "2025-03-01T00:00:00Z",
            "category": category,
            "description": "Truss rental"
        })
    };

    let (status, body) = post(&app, "record_expenditure", spend(600.0, "equipment")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["remaining_balance"], 400.0);
    assert_eq!(body["expenditure"]["amount"], 600.0);

    let (status, body) = post(&app, "record_expenditure", spend(500.0, "equipment")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Expenditure exceeds remaining grant balance of 400"
    );
    assert_eq!(GrantExpenditure::count_for_grant(&pool, &id).await.unwrap(), 1);

    let (status, body) = post(&app, "record_expenditure", spend(400.0, "labor")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["remaining_balance"], 0.0);
    assert_eq!(body["expenditure"]["category"], "labor");

    let (status, body) = get(&app, &format!("?type=expenditures&grant_id={}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expenditures"].as_array().unwrap().len(), 2);
    assert_eq!(body["by_category"]["equipment"], 600.0);
    assert_eq!(body["by_category"]["labor"], 400.0);
    assert_eq!(body["summary"]["total_spent"], 1000.0);
    assert_eq!(body["summary"]["budget"], 1000.0);
    assert_eq!(body["summary"]["remaining"], 0.0);
}

#[tokio::test]
async fn test_expenditure_for_unknown_grant_is_not_found() {
    let (app, _) = test_app().await;

    let (status, body) = post(
        &app,
        "record_expenditure",
        json!({
            "grant_id": "550e8400-e29b-41d4-a716-446655440000",
            "amount": 10.0,
            "expenditure_date": "2025-03-01T00:00:00Z",
            "category": "travel",
            "description": "Site visit"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_expenditure_accepts_long_free_text() {
    let (app, _) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 1000.0),
    )
    .await;

    let description = "Rigging, truss and motor hire for the main stage. ".repeat(20);
    let (status, body) = post(
        &app,
        "record_expenditure",
        json!({
            "grant_id": id,
            "amount": 50.0,
            "expenditure_date": "2025-03-01T00:00:00Z",
            "category": "equipment rental and related production services ".repeat(8),
            "description": description
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["expenditure"]["description"], description.as_str());

    let (status, _) = post(
        &app,
        "record_expenditure",
        json!({
            "grant_id": id,
            "amount": 50.0,
            "expenditure_date": "2025-03-01T00:00:00Z",
            "category": "   ",
            "description": "Deposit"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grant_scoped_views_require_grant_id() {
    let (app, _) = test_app().await;

    let (status, body) = get(&app, "?type=expenditures").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["grant_id"].is_array());

    let (status, _) = get(&app, "?type=reports").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_report() {
    let (app, _) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", Some("annual"), 500.0),
    )
    .await;

    let (_, body) = get(&app, &format!("?type=reports&grant_id={}", id)).await;
    let report_id = body["reports"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "submit_report",
        json!({
            "report_id": report_id,
            "report_content": "Final numbers attached",
            "attachments": ["budget.pdf", "photos.zip"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["status"], "submitted");
    assert!(body["report"]["submitted_date"].is_string());
    assert_eq!(body["report"]["attachments"], json!(["budget.pdf", "photos.zip"]));

    let (status, _) = post(
        &app,
        "submit_report",
        json!({ "report_id": "550e8400-e29b-41d4-a716-446655440000" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_receive_funds_accumulates() {
    let (app, pool) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 5000.0),
    )
    .await;

    let receive = |amount: f64| {
        json!({
            "grant_id": id,
            "amount": amount,
            "received_date": "2025-02-15T00:00:00Z",
            "notes": "Wire transfer"
        })
    };

    let (status, body) = post(&app, "receive_funds", receive(1500.0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_received"], 1500.0);

    let (_, body) = post(&app, "receive_funds", receive(1000.0)).await;
    assert_eq!(body["total_received"], 2500.0);

    let receipts = GrantReceipt::list_for_grant(&pool, &id).await.unwrap();
    assert_eq!(receipts.len(), 2);
    assert_eq!(receipts.iter().map(|r| r.amount).sum::<f64>(), 2500.0);

    let (status, _) = post(
        &app,
        "receive_funds",
        json!({
            "grant_id": "550e8400-e29b-41d4-a716-446655440000",
            "amount": 10.0,
            "received_date": "2025-02-15T00:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_funding_sources() {
    let (app, _) = test_app().await;

    for (name, source_type, amount) in [
        ("Gala Night", "donation", 2000.0),
        ("Brewery Partner", "sponsorship", 5000.0),
        ("Ticket Presales", "revenue", 3000.0),
        ("Board Match", "donation", 1000.0),
    ] {
        let (status, body) = post(
            &app,
            "create_funding_source",
            json!({ "name": name, "source_type": source_type, "amount": amount }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["source"]["status"], "active");
        assert_eq!(body["source"]["currency"], "USD");
    }

    let (status, body) = get(&app, "?type=funding_sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"].as_array().unwrap().len(), 4);
    assert_eq!(body["by_type"]["donation"]["count"], 2);
    assert_eq!(body["by_type"]["donation"]["total"], 3000.0);
    assert_eq!(body["total_funding"], 11000.0);

    let (status, _) = post(
        &app,
        "create_funding_source",
        json!({ "name": "Mystery", "source_type": "lottery", "amount": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_grant_and_source() {
    let (app, _) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 500.0),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(json!({ "id": id, "type": "grant", "name": "Renamed", "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grant"]["name"], "Renamed");
    assert_eq!(body["grant"]["status"], "pending");
    assert_eq!(body["grant"]["amount_awarded"], 500.0);
    assert_eq!(body["grant"]["grantor"], "Regional Arts Council");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(json!({ "id": id, "type": "vendor", "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid type");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(json!({ "id": "550e8400-e29b-41d4-a716-446655440000", "type": "grant", "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = post(
        &app,
        "create_funding_source",
        json!({ "name": "Gala", "source_type": "donation", "amount": 100.0 }),
    )
    .await;
    let source_id = body["source"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(json!({ "id": source_id, "type": "funding_source", "amount": 250.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["amount"], 250.0);
    assert_eq!(body["source"]["name"], "Gala");
}

#[tokio::test]
async fn test_patch_rejects_inverted_window() {
    let (app, _) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-07-01T00:00:00Z", None, 500.0),
    )
    .await;

    let patch = |fields: Value| {
        let mut body = fields;
        body["id"] = json!(id);
        body["type"] = json!("grant");
        body
    };

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(patch(json!({ "start_date": "2026-01-01T00:00:00Z" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["end_date"].is_array());

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(patch(json!({ "end_date": "2024-12-31T00:00:00Z" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "?type=grants").await;
    assert_eq!(body["grants"][0]["start_date"], "2025-01-01T00:00:00.000Z");
    assert_eq!(body["grants"][0]["end_date"], "2025-07-01T00:00:00.000Z");

    // Moving both dates together is fine
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(patch(json!({
            "start_date": "2026-01-01T00:00:00Z",
            "end_date": "2026-06-30T00:00:00Z"
        }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grant"]["start_date"], "2026-01-01T00:00:00.000Z");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(patch(json!({ "reporting_frequency": "weekly" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = post(
        &app,
        "create_funding_source",
        json!({
            "name": "Season Sponsor",
            "source_type": "sponsorship",
            "amount": 100.0,
            "start_date": "2025-01-01T00:00:00Z",
            "end_date": "2025-12-31T00:00:00Z"
        }),
    )
    .await;
    let source_id = body["source"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/grants",
        Some(json!({
            "id": source_id,
            "type": "funding_source",
            "start_date": "2026-03-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_closes_and_deactivates() {
    let (app, pool) = test_app().await;
    let id = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z", None, 500.0),
    )
    .await;

    let (status, body) =
        send(&app, Method::DELETE, &format!("/api/grants?id={}&type=grant", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = get(&app, "?type=grants&status=closed").await;
    assert_eq!(body["grants"][0]["id"], id.as_str());
    assert_eq!(grant_count(&pool).await, 1);

    let (_, body) = post(
        &app,
        "create_funding_source",
        json!({ "name": "Gala", "source_type": "donation", "amount": 100.0 }),
    )
    .await;
    let source_id = body["source"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/grants?id={}&type=funding_source", source_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "?type=funding_sources").await;
    assert!(body["sources"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::DELETE, "/api/grants?id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "id and type are required");

    let (status, body) = send(&app, Method::DELETE, "/api/grants?id=abc&type=vendor", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid type");

    let (status, _) = send(&app, Method::DELETE, "/api/grants?id=missing&type=grant", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grants_view_enriches_balances() {
    let (app, _) = test_app().await;
    let now = Utc::now();
    let start = format_timestamp(&(now - Duration::days(30)));

    let expiring = create_grant(
        &app,
        grant_payload(&start, &format_timestamp(&(now + Duration::days(20))), None, 2000.0),
    )
    .await;
    create_grant(
        &app,
        grant_payload(&start, &format_timestamp(&(now + Duration::days(400))), None, 1000.0),
    )
    .await;

    let (status, _) = post(
        &app,
        "record_expenditure",
        json!({
            "grant_id": expiring,
            "amount": 500.0,
            "expenditure_date": start,
            "category": "venue",
            "description": "Deposit"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "?type=grants").await;
    assert_eq!(status, StatusCode::OK);

    let grants = body["grants"].as_array().unwrap();
    assert_eq!(grants.len(), 2);
    // Soonest end date first
    assert_eq!(grants[0]["id"], expiring.as_str());
    assert_eq!(grants[0]["total_spent"], 500.0);
    assert_eq!(grants[0]["remaining_balance"], 1500.0);
    assert_eq!(grants[0]["utilization_rate"], 25.0);
    assert_eq!(grants[0]["is_expiring"], true);
    assert_eq!(grants[1]["total_spent"], 0.0);
    assert_eq!(grants[1]["is_expiring"], false);

    assert_eq!(body["by_status"]["active"].as_array().unwrap().len(), 2);
    assert_eq!(body["totals"]["total_awarded"], 3000.0);
    assert_eq!(body["totals"]["total_spent"], 500.0);
    assert_eq!(body["totals"]["total_remaining"], 2500.0);
}

#[tokio::test]
async fn test_compliance_view() {
    let (app, _) = test_app().await;
    let now = Utc::now();

    // Monthly reports started 100 days ago: at least one is overdue
    create_grant(
        &app,
        grant_payload(
            &format_timestamp(&(now - Duration::days(100))),
            &format_timestamp(&(now + Duration::days(200))),
            Some("monthly"),
            1000.0,
        ),
    )
    .await;

    // Quarterly starting now: nothing due for three months
    create_grant(
        &app,
        grant_payload(
            &format_timestamp(&now),
            &format_timestamp(&(now + Duration::days(365))),
            Some("quarterly"),
            1000.0,
        ),
    )
    .await;

    let (status, body) = get(&app, "?type=compliance").await;
    assert_eq!(status, StatusCode::OK);

    let entries = body["compliance"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let overdue = entries
        .iter()
        .find(|c| c["reporting_frequency"] == "monthly")
        .unwrap();
    assert_eq!(overdue["compliance_status"], "non_compliant");
    assert!(overdue["overdue_reports"].as_u64().unwrap() >= 3);

    let fresh = entries
        .iter()
        .find(|c| c["reporting_frequency"] == "quarterly")
        .unwrap();
    assert_eq!(fresh["compliance_status"], "compliant");
    assert_eq!(fresh["overdue_reports"], 0);

    assert_eq!(body["summary"]["total_grants"], 2);
    assert_eq!(body["summary"]["non_compliant"], 1);
    assert_eq!(body["summary"]["compliant"], 1);
}

#[tokio::test]
async fn test_default_summary() {
    let (app, _) = test_app().await;

    create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2099-12-31T00:00:00Z", None, 4000.0),
    )
    .await;
    let closed = create_grant(
        &app,
        grant_payload("2025-01-01T00:00:00Z", "2099-12-31T00:00:00Z", None, 9000.0),
    )
    .await;
    send(&app, Method::DELETE, &format!("/api/grants?id={}&type=grant", closed), None).await;

    post(
        &app,
        "create_funding_source",
        json!({ "name": "Gala", "source_type": "donation", "amount": 750.0 }),
    )
    .await;

    for query in ["", "?type=crew"] {
        let (status, body) = get(&app, query).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["active_grants"], 1);
        assert_eq!(body["summary"]["total_grant_funding"], 4000.0);
        assert_eq!(body["summary"]["funding_sources"], 1);
        assert_eq!(body["summary"]["total_other_funding"], 750.0);
    }
}
