//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies reuse the model input types (`ListingInput`, `PhotoInput`,
//! `ReservationRequest` and the patches). The types here add the query
//! strings and the response shapes with their derived fields.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::services::{Availability, ListingWithPhotos};
use crate::models::{
    Listing, ListingFilter, ListingId, PageRequest, Paged, Photo, PhotoId, PhotoKind,
    Reservation, ReservationFilter, ReservationId, ReservationStatus,
};

// =============================================================================
// Pagination
// =============================================================================

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Total matching items across all pages
    pub count: u64,
    pub num_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn from_page<U>(page: Paged<U>, f: impl FnMut(U) -> T) -> Self {
        let num_pages = page.num_pages();
        let Paged { items, total, page } = page;
        Self {
            count: total,
            num_pages,
            current_page: page.page,
            page_size: page.page_size,
            timestamp: Utc::now(),
            results: items.into_iter().map(f).collect(),
        }
    }
}

// =============================================================================
// Listings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl From<ListingQuery> for ListingFilter {
    fn from(query: ListingQuery) -> Self {
        Self {
            available: query.available,
            page: PageRequest::new(query.page, query.page_size),
        }
    }
}

/// Listing as shown in lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: ListingId,
    pub name: String,
    pub location: String,
    pub nightly_price: Decimal,
    pub max_guests: i32,
    pub available: bool,
    pub primary_image_url: Option<String>,
    pub photo_count: usize,
}

impl ListingSummary {
    pub fn new(entry: &ListingWithPhotos, media_url: &str) -> Self {
        let listing = &entry.listing;
        Self {
            id: listing.id,
            name: listing.name.clone(),
            location: listing.location.clone(),
            nightly_price: listing.nightly_price,
            max_guests: listing.max_guests,
            available: listing.available,
            primary_image_url: entry.primary_photo().map(|p| p.image_url(media_url)),
            photo_count: entry.photos.len(),
        }
    }
}

/// Full listing with its photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDetail {
    pub id: ListingId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub nightly_price: Decimal,
    pub max_guests: i32,
    pub rooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub available: bool,
    pub photos: Vec<PhotoDto>,
    pub primary_image_url: Option<String>,
    /// Every photo's public URL, in display order
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingDetail {
    pub fn new(entry: ListingWithPhotos, media_url: &str) -> Self {
        let primary_image_url = entry.primary_photo().map(|p| p.image_url(media_url));
        let photos: Vec<PhotoDto> = entry
            .photos
            .iter()
            .map(|p| PhotoDto::new(p, media_url))
            .collect();
        let image_urls = photos.iter().map(|p| p.image_url.clone()).collect();
        let Listing {
            id,
            name,
            description,
            location,
            nightly_price,
            max_guests,
            rooms,
            bathrooms,
            amenities,
            available,
            created_at,
            updated_at,
        } = entry.listing;

        Self {
            id,
            name,
            description,
            location,
            nightly_price,
            max_guests,
            rooms,
            bathrooms,
            amenities,
            available,
            photos,
            primary_image_url,
            image_urls,
            created_at,
            updated_at,
        }
    }
}

// =============================================================================
// Photos
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoQuery {
    #[serde(default)]
    pub listing_id: Option<ListingId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoDto {
    pub id: PhotoId,
    pub listing_id: ListingId,
    pub image: Option<String>,
    pub url: Option<String>,
    /// Public URL of the picture, whichever source it has
    pub image_url: String,
    pub description: String,
    pub kind: PhotoKind,
    pub order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhotoDto {
    pub fn new(photo: &Photo, media_url: &str) -> Self {
        Self {
            id: photo.id,
            listing_id: photo.listing_id,
            image: photo.source.image().map(str::to_string),
            url: photo.source.url().map(str::to_string),
            image_url: photo.image_url(media_url),
            description: photo.description.clone(),
            kind: photo.kind,
            order: photo.order,
            is_primary: photo.is_primary(),
            created_at: photo.created_at,
            updated_at: photo.updated_at,
        }
    }
}

// =============================================================================
// Reservations
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationQuery {
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl From<ReservationQuery> for ReservationFilter {
    fn from(query: ReservationQuery) -> Self {
        Self {
            listing_id: query.listing_id,
            status: query.status,
            page: PageRequest::new(query.page, query.page_size),
        }
    }
}

/// Body of `POST /v1/reservations/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDto {
    pub id: ReservationId,
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub status: ReservationStatus,
    pub status_display: String,
    pub nights: i32,
    pub total_price: Decimal,
    pub is_modifiable: bool,
    pub is_cancellable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationDto {
    /// `today` decides `is_cancellable`.
    pub fn new(reservation: Reservation, today: NaiveDate) -> Self {
        Self {
            is_modifiable: reservation.is_modifiable(),
            is_cancellable: reservation.is_cancellable(today),
            status_display: reservation.status.label().to_string(),
            id: reservation.id,
            listing_id: reservation.listing_id,
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            guests: reservation.guests,
            guest_name: reservation.guest_name,
            guest_email: reservation.guest_email,
            guest_phone: reservation.guest_phone,
            guest_notes: reservation.guest_notes,
            internal_notes: reservation.internal_notes,
            status: reservation.status,
            nights: reservation.nights,
            total_price: reservation.total_price,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

// =============================================================================
// Availability
// =============================================================================

/// Query for `GET /v1/availability`; the per-listing route takes the id from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub listing_id: ListingId,
    pub listing_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub available: bool,
    pub nights: i32,
    pub total_price: Decimal,
}

impl From<Availability> for AvailabilityResponse {
    fn from(a: Availability) -> Self {
        Self {
            listing_id: a.listing.id,
            listing_name: a.listing.name,
            check_in: a.stay.check_in,
            check_out: a.stay.check_out,
            available: a.available,
            nights: a.quote.nights,
            total_price: a.quote.total_price,
        }
    }
}

// =============================================================================
// Health & Status
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Database connection status
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseStatus,
}
