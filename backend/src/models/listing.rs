//! Listing entity: a rentable property unit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::PageRequest;
use crate::define_id_type;

define_id_type!(i64, ListingId);

/// A stored listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub description: String,
    pub location: String,
    /// Price per night, two decimal places
    pub nightly_price: Decimal,
    pub max_guests: i32,
    pub rooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    /// Whether the listing currently accepts new reservations
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Copy the writable fields into an input, e.g. as the base for a patch.
    pub fn to_input(&self) -> ListingInput {
        ListingInput {
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            nightly_price: self.nightly_price,
            max_guests: self.max_guests,
            rooms: self.rooms,
            bathrooms: self.bathrooms,
            amenities: self.amenities.clone(),
            available: self.available,
        }
    }
}

fn default_max_guests() -> i32 {
    2
}

fn default_one() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// Writable listing fields, used for create and full replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListingInput {
    #[validate(length(min = 3, max = 255, message = "Name must be between 3 and 255 characters."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 500, message = "Location must be between 1 and 500 characters."))]
    pub location: String,
    pub nightly_price: Decimal,
    #[serde(default = "default_max_guests")]
    #[validate(range(min = 1, max = 20, message = "Max guests must be between 1 and 20."))]
    pub max_guests: i32,
    #[serde(default = "default_one")]
    #[validate(range(min = 1, max = 10, message = "Rooms must be between 1 and 10."))]
    pub rooms: i32,
    #[serde(default = "default_one")]
    #[validate(range(min = 1, max = 10, message = "Bathrooms must be between 1 and 10."))]
    pub bathrooms: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default = "default_true")]
    pub available: bool,
}

/// Partial listing update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub nightly_price: Option<Decimal>,
    pub max_guests: Option<i32>,
    pub rooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub available: Option<bool>,
}

impl ListingPatch {
    /// Merge this patch over the stored listing.
    pub fn apply(self, listing: &Listing) -> ListingInput {
        let base = listing.to_input();
        ListingInput {
            name: self.name.unwrap_or(base.name),
            description: self.description.unwrap_or(base.description),
            location: self.location.unwrap_or(base.location),
            nightly_price: self.nightly_price.unwrap_or(base.nightly_price),
            max_guests: self.max_guests.unwrap_or(base.max_guests),
            rooms: self.rooms.unwrap_or(base.rooms),
            bathrooms: self.bathrooms.unwrap_or(base.bathrooms),
            amenities: self.amenities.unwrap_or(base.amenities),
            available: self.available.unwrap_or(base.available),
        }
    }
}

/// Filters for listing queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub available: Option<bool>,
    pub page: PageRequest,
}
