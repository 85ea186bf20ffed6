//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Request bodies are small JSON documents; uploads are stored elsewhere.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// CORS from `CORS_ALLOWED_ORIGINS`; permissive when no origin is configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let api_v1 = Router::new()
        .route("/status", get(handlers::status))
        // Listings
        .route(
            "/listings",
            get(handlers::list_listings).post(handlers::create_listing),
        )
        .route(
            "/listings/{id}",
            get(handlers::get_listing)
                .put(handlers::replace_listing)
                .patch(handlers::patch_listing)
                .delete(handlers::delete_listing),
        )
        .route(
            "/listings/{id}/availability",
            get(handlers::listing_availability),
        )
        .route("/availability", get(handlers::check_availability))
        // Photos
        .route(
            "/photos",
            get(handlers::list_photos).post(handlers::create_photo),
        )
        .route(
            "/photos/{id}",
            get(handlers::get_photo)
                .patch(handlers::update_photo)
                .delete(handlers::delete_photo),
        )
        // Reservations
        .route(
            "/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(handlers::get_reservation)
                .patch(handlers::update_reservation)
                .delete(handlers::cancel_reservation),
        )
        .route(
            "/reservations/{id}/confirm",
            post(handlers::confirm_reservation),
        )
        .route(
            "/reservations/{id}/refuse",
            post(handlers::refuse_reservation),
        )
        .route(
            "/reservations/{id}/cancel",
            post(handlers::cancel_reservation),
        )
        .route(
            "/reservations/{id}/status",
            post(handlers::change_reservation_status),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
