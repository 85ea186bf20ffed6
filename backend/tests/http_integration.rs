//! HTTP API tests driving the axum router in-process.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use alloggi_backend::db::repositories::LocalRepository;
use alloggi_backend::db::FullRepository;
use alloggi_backend::http::{create_router, AppState};
use alloggi_backend::models::ReservationStatus;
use alloggi_backend::services::{Notifier, StatusNotification};

#[derive(Default)]
struct RecordingNotifier {
    sent: parking_lot::Mutex<Vec<StatusNotification>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &StatusNotification) -> anyhow::Result<()> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

fn app_with(repo: LocalRepository) -> Router {
    let repo: Arc<dyn FullRepository> = Arc::new(repo);
    create_router(AppState::new(repo))
}

fn app() -> Router {
    app_with(LocalRepository::new())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn listing_body(name: &str, price: &str) -> Value {
    json!({
        "name": name,
        "description": "Two rooms above the harbour.",
        "location": "Camogli",
        "nightly_price": price,
        "max_guests": 4,
        "rooms": 2,
        "bathrooms": 1,
        "amenities": ["wifi"]
    })
}

fn reservation_body(listing_id: &Value, check_in: &str, check_out: &str) -> Value {
    json!({
        "listing_id": listing_id,
        "check_in": check_in,
        "check_out": check_out,
        "guests": 2,
        "guest_name": "luca bianchi",
        "guest_email": "Luca@Example.com",
        "guest_phone": "+39 347 000 1111"
    })
}

async fn create_listing(app: &Router, name: &str, price: &str) -> Value {
    let (status, body) = send(app, Method::POST, "/v1/listings", Some(listing_body(name, price))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].clone()
}

// ==================== Health ====================

#[tokio::test]
async fn test_health_reports_database() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_status_degrades_when_database_is_down() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    let app = app_with(repo);

    let (status, body) = send(&app, Method::GET, "/v1/status", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"]["status"], "error");
}

#[tokio::test]
async fn test_repository_outage_maps_to_503() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    let app = app_with(repo);

    let (status, body) = send(&app, Method::GET, "/v1/listings", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "DATABASE_UNAVAILABLE");
}

// ==================== Listings ====================

#[tokio::test]
async fn test_listing_crud() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "120.00").await;

    let (status, body) = send(&app, Method::GET, &format!("/v1/listings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Casa sul Porto");
    assert_eq!(body["available"], true);
    assert_eq!(decimal(&body["nightly_price"]), "120".parse::<Decimal>().unwrap());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/listings/{id}"),
        Some(json!({ "available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["location"], "Camogli");

    let (status, body) = send(&app, Method::GET, "/v1/listings?available=false", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], id);

    let (status, _) = send(&app, Method::DELETE, &format!("/v1/listings/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/v1/listings/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_listing_returns_field_errors() {
    let app = app();
    let mut body = listing_body("Ok", "-5");
    body["max_guests"] = json!(40);

    let (status, body) = send(&app, Method::POST, "/v1/listings", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["name", "nightly_price", "max_guests"] {
        assert!(body["errors"][field].is_array(), "missing {field}: {body}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/listings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_gets_structured_error() {
    let app = app();
    for uri in ["/v1/listings/abc", "/v1/photos/x1", "/v1/reservations/first/confirm"] {
        let method = if uri.ends_with("/confirm") { Method::POST } else { Method::GET };
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "BAD_REQUEST", "{uri}");
    }
}

#[tokio::test]
async fn test_listing_detail_includes_ordered_photos() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "120.00").await;

    for (order, image) in [(1, "listings/room.jpg"), (0, "listings/front.jpg")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/photos",
            Some(json!({ "listing_id": id, "image": image, "order": order, "kind": "camera" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, Method::GET, &format!("/v1/listings/{id}"), None).await;
    assert_eq!(body["photos"][0]["order"], 0);
    assert_eq!(body["photos"][1]["order"], 1);
    assert_eq!(body["primary_image_url"], "/media/listings/front.jpg");

    let (_, body) = send(&app, Method::GET, "/v1/listings", None).await;
    assert_eq!(body["results"][0]["photo_count"], 2);
}

// ==================== Photos ====================

#[tokio::test]
async fn test_photo_with_both_sources_is_rejected() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "120.00").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/photos",
        Some(json!({
            "listing_id": id,
            "image": "listings/a.jpg",
            "url": "https://img.example/a.jpg"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn test_photo_crud_by_url() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "120.00").await;

    let (status, photo) = send(
        &app,
        Method::POST,
        "/v1/photos",
        Some(json!({ "listing_id": id, "url": "https://img.example/a.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(photo["image_url"], "https://img.example/a.jpg");
    assert_eq!(photo["kind"], "altro");
    let photo_id = photo["id"].clone();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/photos/{photo_id}"),
        Some(json!({ "description": "Sea view" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Sea view");

    let (_, list) = send(&app, Method::GET, &format!("/v1/photos?listing_id={id}"), None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::DELETE, &format!("/v1/photos/{photo_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/v1/photos/{photo_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ==================== Reservations ====================

#[tokio::test]
async fn test_reservation_is_priced_and_pending() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-06-01", "2030-06-04")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["status_display"], "Pending");
    assert_eq!(body["nights"], 3);
    assert_eq!(decimal(&body["total_price"]), "300".parse::<Decimal>().unwrap());
    assert_eq!(body["guest_name"], "Luca Bianchi");
    assert_eq!(body["guest_email"], "luca@example.com");
    assert_eq!(body["is_modifiable"], true);
    assert_eq!(body["is_cancellable"], true);
}

#[tokio::test]
async fn test_overlapping_reservation_conflicts() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;

    let (_, first) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-07-01", "2030-07-05")),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/v1/reservations/{}/confirm", first["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-07-04", "2030-07-08")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_AVAILABLE");

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-07-05", "2030-07-08")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_availability_endpoints() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;
    send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-07-01", "2030-07-05")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/listings/{id}/availability?check_in=2030-07-03&check_out=2030-07-06"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["nights"], 3);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/availability?listing_id={id}&check_in=2030-07-05&check_out=2030-07-06"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["listing_name"], "Casa sul Porto");

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/availability?check_in=2030-07-05&check_out=2030-07-06",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["listing_id"].is_array());

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/v1/listings/{id}/availability?check_in=tomorrow"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_past_check_in_is_rejected() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2020-06-01", "2020-06-04")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"]["check_in"][0],
        "Check-in cannot be in the past."
    );
}

#[tokio::test]
async fn test_overlong_contact_details_are_field_errors() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;
    let mut body = reservation_body(&id, "2030-06-01", "2030-06-04");
    body["guest_phone"] = json!("+39 333 123 4567 8901 2345 6789");

    let (status, body) = send(&app, Method::POST, "/v1/reservations", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["guest_phone"].is_array(), "{body}");
}

#[tokio::test]
async fn test_status_workflow_over_http() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;
    let (_, reservation) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-08-01", "2030-08-03")),
    )
    .await;
    let rid = reservation["id"].clone();
    let status_uri = format!("/v1/reservations/{rid}/status");

    let (status, body) = send(&app, Method::POST, &status_uri, Some(json!({ "status": "PAID" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");

    for next in ["CONFIRMED", "PAID"] {
        let (status, body) =
            send(&app, Method::POST, &status_uri, Some(json!({ "status": next }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], next);
    }

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/reservations/{rid}"),
        Some(json!({ "guests": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");

    let (status, body) = send(&app, Method::POST, &status_uri, Some(json!({ "status": "BOGUS" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cancel_frees_dates_and_lists_by_status() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;
    let (_, reservation) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-09-01", "2030-09-05")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/v1/reservations/{}", reservation["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["is_cancellable"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/v1/reservations/{}/cancel", reservation["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-09-02", "2030-09-04")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/v1/reservations?status=CANCELLED", None).await;
    assert_eq!(body["count"], 1);
    let (_, body) = send(&app, Method::GET, &format!("/v1/reservations?listing_id={id}"), None).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_patch_reservation_reprices() {
    let app = app();
    let id = create_listing(&app, "Casa sul Porto", "80.00").await;
    let (_, reservation) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-10-01", "2030-10-03")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/reservations/{}", reservation["id"]),
        Some(json!({ "check_out": "2030-10-06" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["nights"], 5);
    assert_eq!(decimal(&body["total_price"]), "400".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn test_unknown_reservation_is_404() {
    let (status, body) = send(&app(), Method::GET, "/v1/reservations/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_refuse_notifies_through_configured_notifier() {
    let recorder = Arc::new(RecordingNotifier::default());
    let repo: Arc<dyn FullRepository> = Arc::new(LocalRepository::new());
    let app = create_router(AppState::new(repo).with_notifier(recorder.clone()));
    let id = create_listing(&app, "Casa sul Porto", "100.00").await;
    let (_, reservation) = send(
        &app,
        Method::POST,
        "/v1/reservations",
        Some(reservation_body(&id, "2030-11-01", "2030-11-03")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/v1/reservations/{}/refuse", reservation["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REFUSED");

    for _ in 0..100 {
        if !recorder.sent.lock().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    let sent = recorder.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].status, ReservationStatus::Refused);
    assert_eq!(sent[0].listing_name, "Casa sul Porto");
}
