//! HTTP surface tests driving the router directly.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wayfarer_api::{build_router, AppState};
use wayfarer_common::{Config, ErrorBody, Trip};
use wayfarer_planner::mock_trip;
use wayfarer_planner::testing::{sample_trip_json, unconfigured_planner, MockModel};
use wayfarer_planner::TripPlanner;

fn app(planner: TripPlanner) -> Router {
    build_router(Arc::new(AppState { planner }), &Config::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn kyoto_body() -> Value {
    json!({
        "cities": ["Kyoto"],
        "places": "",
        "dates": {"start": "2025-05-01", "end": "2025-05-01"},
        "preferences": ["Local Food & Cuisine"],
        "budget": "Moderate",
        "companions": "Couple",
        "pacing": "Balanced",
        "attachments": []
    })
}

fn edit_body(instructions: &str) -> Value {
    json!({
        "currentTrip": mock_trip("Kyoto", "2025-05-01"),
        "instructions": instructions,
    })
}

// =========================================================================
// /api/generate
// =========================================================================

#[tokio::test]
async fn generate_without_credential_serves_mock() {
    let (status, body) = send(app(unconfigured_planner()), post_json("/api/generate", kyoto_body())).await;

    assert_eq!(status, StatusCode::OK);
    let trip: Trip = serde_json::from_slice(&body).unwrap();
    assert_eq!(trip.trip_name, "Journey to Kyoto");
    assert_eq!(trip.days.len(), 1);
    assert_eq!(trip.days[0].date, "2025-05-01");
    assert_eq!(trip.days[0].activities.len(), 2);
}

#[tokio::test]
async fn generate_returns_trip_from_model() {
    let model = Arc::new(MockModel::new().reply(format!("```json\n{}\n```", sample_trip_json())));
    let (status, body) = send(app(model.planner()), post_json("/api/generate", kyoto_body())).await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["tripName"], "Kyoto in Bloom");
    assert_eq!(value["days"][0]["dayNumber"], 1);
    assert_eq!(value["days"][0]["activities"][0]["coordinates"]["lat"], 34.9671);
}

#[tokio::test]
async fn model_failures_are_500_with_error_body() {
    let cases = [
        (MockModel::new().fail("quota exceeded"), "upstream_failure"),
        (MockModel::new().reply("no itinerary today"), "malformed_output"),
        (MockModel::new().reply(r#"{"tripName": 7}"#), "invalid_output"),
    ];

    for (model, kind) in cases {
        let model = Arc::new(model);
        let (status, body) = send(app(model.planner()), post_json("/api/generate", kyoto_body())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{kind}");
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Failed to generate itinerary");
        assert_eq!(error.kind, kind);
    }
}

#[tokio::test]
async fn missing_cities_is_400() {
    let mut body = kyoto_body();
    body["cities"] = json!([]);
    let (status, bytes) = send(app(unconfigured_planner()), post_json("/api/generate", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.kind, "invalid_request");
}

#[tokio::test]
async fn unknown_budget_is_400() {
    let mut body = kyoto_body();
    body["budget"] = json!("Backpacker");
    let (status, bytes) = send(app(unconfigured_planner()), post_json("/api/generate", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.kind, "invalid_request");
}

#[tokio::test]
async fn malformed_json_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, bytes) = send(app(unconfigured_planner()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(serde_json::from_slice::<ErrorBody>(&bytes).is_ok());
}

// =========================================================================
// /api/edit-trip
// =========================================================================

#[tokio::test]
async fn edit_returns_replacement_trip() {
    let model = Arc::new(MockModel::new().reply(sample_trip_json()));
    let (status, body) = send(
        app(model.planner()),
        post_json("/api/edit-trip", edit_body("Make day one a temple tour")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let trip: Trip = serde_json::from_slice(&body).unwrap();
    assert_eq!(trip.trip_name, "Kyoto in Bloom");
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn edit_without_credential_reports_missing_key() {
    let (status, body) = send(
        app(unconfigured_planner()),
        post_json("/api/edit-trip", edit_body("add a day")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "API Key missing");
    assert_eq!(error.kind, "missing_credential");
}

#[tokio::test]
async fn failed_edit_uses_edit_message() {
    let model = Arc::new(MockModel::new().fail("timeout"));
    let (status, body) = send(
        app(model.planner()),
        post_json("/api/edit-trip", edit_body("swap dinner")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "Failed to edit itinerary");
}

#[tokio::test]
async fn blank_edit_is_400_without_model_call() {
    let model = Arc::new(MockModel::new().reply(sample_trip_json()));
    let (status, _) = send(app(model.planner()), post_json("/api/edit-trip", edit_body("  "))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.call_count(), 0);
}

// =========================================================================
// Misc
// =========================================================================

#[tokio::test]
async fn health_is_ok_and_uncached() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(unconfigured_planner()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}
