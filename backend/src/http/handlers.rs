//! HTTP handlers for the REST API.
//!
//! Each handler parses its input, delegates to [`crate::db::services`] and
//! shapes the response DTO.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::dto::{
    AvailabilityQuery, AvailabilityResponse, DatabaseStatus, HealthResponse, ListResponse,
    ListingDetail, ListingQuery, ListingSummary, PhotoDto, PhotoQuery, ReservationDto,
    ReservationQuery, StatusChangeRequest, StatusResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::services::FieldErrors;
use crate::models::{
    DateRange, ListingId, ListingInput, ListingPatch, PhotoId, PhotoInput, PhotoPatch,
    ReservationId, ReservationPatch, ReservationRequest,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type Created<T> = Result<(StatusCode, Json<T>), AppError>;

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Health & Status
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

/// GET /v1/status
///
/// Responds 503 with `status = "degraded"` when the database is unreachable.
pub async fn status(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let (code, database) = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => (
            StatusCode::OK,
            DatabaseStatus {
                status: "ok".to_string(),
                message: "Database connection successful".to_string(),
            },
        ),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            DatabaseStatus {
                status: "error".to_string(),
                message: "Database is not reachable".to_string(),
            },
        ),
        Err(e) => {
            tracing::warn!("Status check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                DatabaseStatus {
                    status: "error".to_string(),
                    message: e.to_string(),
                },
            )
        }
    };

    let overall = if code == StatusCode::OK { "ok" } else { "degraded" };
    (
        code,
        Json(StatusResponse {
            status: overall.to_string(),
            version: API_VERSION.to_string(),
            environment: state.config.environment.clone(),
            timestamp: Utc::now(),
            database,
        }),
    )
}

// =============================================================================
// Listings
// =============================================================================

/// GET /v1/listings
pub async fn list_listings(
    State(state): State<AppState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> HandlerResult<ListResponse<ListingSummary>> {
    let Query(query) = query?;
    let page =
        db_services::list_listings_with_photos(state.repository.as_ref(), &query.into()).await?;
    let media_url = &state.config.media_url;
    Ok(Json(ListResponse::from_page(page, |entry| {
        ListingSummary::new(&entry, media_url)
    })))
}

/// POST /v1/listings
pub async fn create_listing(
    State(state): State<AppState>,
    payload: Result<Json<ListingInput>, JsonRejection>,
) -> Created<ListingDetail> {
    let Json(input) = payload?;
    let listing = db_services::create_listing(state.repository.as_ref(), input).await?;
    let detail = db_services::ListingWithPhotos {
        listing,
        photos: Vec::new(),
    };
    Ok((
        StatusCode::CREATED,
        Json(ListingDetail::new(detail, &state.config.media_url)),
    ))
}

/// GET /v1/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<ListingDetail> {
    let Path(id) = path?;
    listing_detail(&state, ListingId::new(id)).await
}

async fn listing_detail(state: &AppState, id: ListingId) -> HandlerResult<ListingDetail> {
    let entry = db_services::get_listing_with_photos(state.repository.as_ref(), id).await?;
    Ok(Json(ListingDetail::new(entry, &state.config.media_url)))
}

/// PUT /v1/listings/{id}
pub async fn replace_listing(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ListingInput>, JsonRejection>,
) -> HandlerResult<ListingDetail> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let id = ListingId::new(id);
    db_services::update_listing(state.repository.as_ref(), id, input).await?;
    listing_detail(&state, id).await
}

/// PATCH /v1/listings/{id}
pub async fn patch_listing(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ListingPatch>, JsonRejection>,
) -> HandlerResult<ListingDetail> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let id = ListingId::new(id);
    db_services::patch_listing(state.repository.as_ref(), id, patch).await?;
    listing_detail(&state, id).await
}

/// DELETE /v1/listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    db_services::delete_listing(state.repository.as_ref(), ListingId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Availability
// =============================================================================

/// GET /v1/listings/{id}/availability?check_in&check_out
pub async fn listing_availability(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> HandlerResult<AvailabilityResponse> {
    let Path(id) = path?;
    let Query(query) = query?;
    availability(&state, ListingId::new(id), query).await
}

/// GET /v1/availability?listing_id&check_in&check_out
pub async fn check_availability(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> HandlerResult<AvailabilityResponse> {
    let Query(query) = query?;
    let listing_id = query.listing_id.ok_or_else(|| {
        AppError::Validation(FieldErrors::single("listing_id", "This field is required."))
    })?;
    availability(&state, listing_id, query).await
}

async fn availability(
    state: &AppState,
    listing_id: ListingId,
    query: AvailabilityQuery,
) -> HandlerResult<AvailabilityResponse> {
    let stay = DateRange::new(query.check_in, query.check_out);
    let result =
        db_services::check_availability(state.repository.as_ref(), listing_id, stay, state.today())
            .await?;
    Ok(Json(result.into()))
}

// =============================================================================
// Photos
// =============================================================================

/// GET /v1/photos
pub async fn list_photos(
    State(state): State<AppState>,
    query: Result<Query<PhotoQuery>, QueryRejection>,
) -> HandlerResult<Vec<PhotoDto>> {
    let Query(query) = query?;
    let photos = db_services::list_photos(state.repository.as_ref(), query.listing_id).await?;
    let media_url = &state.config.media_url;
    Ok(Json(
        photos.iter().map(|p| PhotoDto::new(p, media_url)).collect(),
    ))
}

/// POST /v1/photos
pub async fn create_photo(
    State(state): State<AppState>,
    payload: Result<Json<PhotoInput>, JsonRejection>,
) -> Created<PhotoDto> {
    let Json(input) = payload?;
    let photo = db_services::create_photo(state.repository.as_ref(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(PhotoDto::new(&photo, &state.config.media_url)),
    ))
}

/// GET /v1/photos/{id}
pub async fn get_photo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<PhotoDto> {
    let Path(id) = path?;
    let photo = db_services::get_photo(state.repository.as_ref(), PhotoId::new(id)).await?;
    Ok(Json(PhotoDto::new(&photo, &state.config.media_url)))
}

/// PATCH /v1/photos/{id}
pub async fn update_photo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PhotoPatch>, JsonRejection>,
) -> HandlerResult<PhotoDto> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let photo =
        db_services::update_photo(state.repository.as_ref(), PhotoId::new(id), patch).await?;
    Ok(Json(PhotoDto::new(&photo, &state.config.media_url)))
}

/// DELETE /v1/photos/{id}
pub async fn delete_photo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    db_services::delete_photo(state.repository.as_ref(), PhotoId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Reservations
// =============================================================================

/// GET /v1/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    query: Result<Query<ReservationQuery>, QueryRejection>,
) -> HandlerResult<ListResponse<ReservationDto>> {
    let Query(query) = query?;
    let page = db_services::list_reservations(state.repository.as_ref(), &query.into()).await?;
    let today = state.today();
    Ok(Json(ListResponse::from_page(page, |r| {
        ReservationDto::new(r, today)
    })))
}

/// POST /v1/reservations
///
/// Creates the reservation in PENDING state; overlapping dates give 409.
pub async fn create_reservation(
    State(state): State<AppState>,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Created<ReservationDto> {
    let Json(request) = payload?;
    let today = state.today();
    let reservation =
        db_services::create_reservation(state.repository.as_ref(), request, today).await?;
    tracing::info!(
        reservation_id = %reservation.id,
        listing_id = %reservation.listing_id,
        "Reservation requested"
    );
    Ok((
        StatusCode::CREATED,
        Json(ReservationDto::new(reservation, today)),
    ))
}

/// GET /v1/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<ReservationDto> {
    let Path(id) = path?;
    let reservation =
        db_services::get_reservation(state.repository.as_ref(), ReservationId::new(id)).await?;
    Ok(Json(ReservationDto::new(reservation, state.today())))
}

/// PATCH /v1/reservations/{id}
pub async fn update_reservation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReservationPatch>, JsonRejection>,
) -> HandlerResult<ReservationDto> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let today = state.today();
    let reservation = db_services::update_reservation(
        state.repository.as_ref(),
        ReservationId::new(id),
        patch,
        today,
    )
    .await?;
    Ok(Json(ReservationDto::new(reservation, today)))
}

/// DELETE /v1/reservations/{id} and POST /v1/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<ReservationDto> {
    let Path(id) = path?;
    let today = state.today();
    let reservation = db_services::cancel_reservation(
        state.repository.as_ref(),
        &state.notifier,
        ReservationId::new(id),
        today,
    )
    .await?;
    Ok(Json(ReservationDto::new(reservation, today)))
}

/// POST /v1/reservations/{id}/confirm
pub async fn confirm_reservation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<ReservationDto> {
    let Path(id) = path?;
    let reservation = db_services::confirm_reservation(
        state.repository.as_ref(),
        &state.notifier,
        ReservationId::new(id),
    )
    .await?;
    Ok(Json(ReservationDto::new(reservation, state.today())))
}

/// POST /v1/reservations/{id}/refuse
pub async fn refuse_reservation(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<ReservationDto> {
    let Path(id) = path?;
    let reservation = db_services::refuse_reservation(
        state.repository.as_ref(),
        &state.notifier,
        ReservationId::new(id),
    )
    .await?;
    Ok(Json(ReservationDto::new(reservation, state.today())))
}

/// POST /v1/reservations/{id}/status
pub async fn change_reservation_status(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> HandlerResult<ReservationDto> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let reservation = db_services::transition_reservation(
        state.repository.as_ref(),
        &state.notifier,
        ReservationId::new(id),
        request.status,
        state.today(),
    )
    .await?;
    Ok(Json(ReservationDto::new(reservation, state.today())))
}
