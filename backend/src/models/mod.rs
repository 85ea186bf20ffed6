//! Domain model for listings, photos and reservations.
//!
//! These types are shared by the repository layer, the service layer and the
//! HTTP DTOs. Input types (`*Input`, `*Patch`, `*Request`) derive
//! [`validator::Validate`] for the declarative field rules; the cross-field
//! rules live in [`crate::services::validation`].

pub mod dates;
pub mod listing;
pub mod macros;
pub mod photo;
pub mod reservation;

pub use dates::DateRange;
pub use listing::{Listing, ListingFilter, ListingId, ListingInput, ListingPatch};
pub use photo::{NewPhoto, Photo, PhotoId, PhotoInput, PhotoKind, PhotoPatch, PhotoSource};
pub use reservation::{
    NewReservation, Reservation, ReservationFilter, ReservationId, ReservationPatch,
    ReservationRequest, ReservationStatus,
};

use serde::{Deserialize, Serialize};

/// Default number of items per page for list queries.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound for a client-requested page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page-number pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request from optional query values, clamping out-of-range input.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: PageRequest,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        Self { items, total, page }
    }

    /// Number of pages needed to show `total` items (at least 1).
    pub fn num_pages(&self) -> u64 {
        let size = u64::from(self.page.page_size.max(1));
        self.total.div_ceil(size).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
        }
    }
}
