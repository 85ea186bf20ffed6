use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;

use super::schema::{listings, photos, reservations};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    Listing, ListingId, ListingInput, NewPhoto, NewReservation, Photo, PhotoId, PhotoKind,
    PhotoSource, Reservation, ReservationId, ReservationStatus,
};

// ==================== Listings ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ListingRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub nightly_price: Decimal,
    pub max_guests: i32,
    pub rooms: i32,
    pub bathrooms: i32,
    pub amenities: Value,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert and full-update changeset; `updated_at` is set by the caller.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = listings)]
pub struct ListingValues {
    pub name: String,
    pub description: String,
    pub location: String,
    pub nightly_price: Decimal,
    pub max_guests: i32,
    pub rooms: i32,
    pub bathrooms: i32,
    pub amenities: Value,
    pub available: bool,
}

impl From<&ListingInput> for ListingValues {
    fn from(input: &ListingInput) -> Self {
        Self {
            name: input.name.clone(),
            description: input.description.clone(),
            location: input.location.clone(),
            nightly_price: input.nightly_price,
            max_guests: input.max_guests,
            rooms: input.rooms,
            bathrooms: input.bathrooms,
            amenities: Value::from(input.amenities.clone()),
            available: input.available,
        }
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> RepositoryResult<Self> {
        let amenities: Vec<String> = serde_json::from_value(row.amenities).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Failed to parse amenities JSON: {}", e),
                ErrorContext::new("decode_listing")
                    .with_entity("listing")
                    .with_entity_id(row.id),
            )
        })?;

        Ok(Listing {
            id: ListingId::new(row.id),
            name: row.name,
            description: row.description,
            location: row.location,
            nightly_price: row.nightly_price,
            max_guests: row.max_guests,
            rooms: row.rooms,
            bathrooms: row.bathrooms,
            amenities,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ==================== Photos ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PhotoRow {
    pub id: i64,
    pub listing_id: i64,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: String,
    pub kind: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = photos)]
#[diesel(treat_none_as_null = true)]
pub struct PhotoValues {
    pub listing_id: i64,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: String,
    pub kind: String,
    pub sort_order: i32,
}

impl From<&NewPhoto> for PhotoValues {
    fn from(photo: &NewPhoto) -> Self {
        Self {
            listing_id: photo.listing_id.value(),
            image: photo.source.image().map(str::to_string),
            url: photo.source.url().map(str::to_string),
            description: photo.description.clone(),
            kind: photo.kind.as_str().to_string(),
            sort_order: photo.order,
        }
    }
}

impl TryFrom<PhotoRow> for Photo {
    type Error = RepositoryError;

    fn try_from(row: PhotoRow) -> RepositoryResult<Self> {
        let context = || {
            ErrorContext::new("decode_photo")
                .with_entity("photo")
                .with_entity_id(row.id)
        };

        let source = match (row.image.clone(), row.url.clone()) {
            (Some(image), None) => PhotoSource::Image(image),
            (None, Some(url)) => PhotoSource::Url(url),
            _ => {
                return Err(RepositoryError::internal_with_context(
                    "Photo must have exactly one of image or url",
                    context(),
                ))
            }
        };
        let kind: PhotoKind = row
            .kind
            .parse()
            .map_err(|e: String| RepositoryError::internal_with_context(e, context()))?;

        Ok(Photo {
            id: PhotoId::new(row.id),
            listing_id: ListingId::new(row.listing_id),
            source,
            description: row.description,
            kind,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ==================== Reservations ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationRow {
    pub id: i64,
    pub listing_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub status: String,
    pub nights: i32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    pub listing_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub status: String,
    pub nights: i32,
    pub total_price: Decimal,
}

impl From<&NewReservation> for NewReservationRow {
    fn from(r: &NewReservation) -> Self {
        Self {
            listing_id: r.listing_id.value(),
            check_in: r.check_in,
            check_out: r.check_out,
            guests: r.guests,
            guest_name: r.guest_name.clone(),
            guest_email: r.guest_email.clone(),
            guest_phone: r.guest_phone.clone(),
            guest_notes: r.guest_notes.clone(),
            status: ReservationStatus::Pending.as_str().to_string(),
            nights: r.nights,
            total_price: r.total_price,
        }
    }
}

/// Editable columns; status and timestamps are written separately.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reservations)]
#[diesel(treat_none_as_null = true)]
pub struct ReservationChanges {
    pub listing_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guest_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub nights: i32,
    pub total_price: Decimal,
}

impl From<&Reservation> for ReservationChanges {
    fn from(r: &Reservation) -> Self {
        Self {
            listing_id: r.listing_id.value(),
            check_in: r.check_in,
            check_out: r.check_out,
            guests: r.guests,
            guest_name: r.guest_name.clone(),
            guest_email: r.guest_email.clone(),
            guest_phone: r.guest_phone.clone(),
            guest_notes: r.guest_notes.clone(),
            internal_notes: r.internal_notes.clone(),
            nights: r.nights,
            total_price: r.total_price,
        }
    }
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = RepositoryError;

    fn try_from(row: ReservationRow) -> RepositoryResult<Self> {
        let status: ReservationStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::internal_with_context(
                e,
                ErrorContext::new("decode_reservation")
                    .with_entity("reservation")
                    .with_entity_id(row.id),
            )
        })?;

        Ok(Reservation {
            id: ReservationId::new(row.id),
            listing_id: ListingId::new(row.listing_id),
            check_in: row.check_in,
            check_out: row.check_out,
            guests: row.guests,
            guest_name: row.guest_name,
            guest_email: row.guest_email,
            guest_phone: row.guest_phone,
            guest_notes: row.guest_notes,
            internal_notes: row.internal_notes,
            status,
            nights: row.nights,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
