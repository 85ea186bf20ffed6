//! In-memory local repository implementation.
//!
//! All data lives in ordered maps behind a single `RwLock`, so every write
//! that checks the overlap invariant does so under the same lock it writes
//! with. Suitable for unit tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    DateRange, Listing, ListingFilter, ListingId, ListingInput, NewPhoto, NewReservation, Paged,
    Photo, PhotoId, Reservation, ReservationFilter, ReservationId, ReservationStatus,
};
use crate::services::availability::conflicts_with;

/// In-memory local repository.
///
/// # Example
/// ```
/// use alloggi_backend::db::repositories::LocalRepository;
/// use alloggi_backend::db::ListingRepository;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    listings: BTreeMap<ListingId, Listing>,
    photos: BTreeMap<PhotoId, Photo>,
    reservations: BTreeMap<ReservationId, Reservation>,

    // ID counters
    next_listing_id: i64,
    next_photo_id: i64,
    next_reservation_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            listings: BTreeMap::new(),
            photos: BTreeMap::new(),
            reservations: BTreeMap::new(),
            next_listing_id: 1,
            next_photo_id: 1,
            next_reservation_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    fn listing(&self, id: ListingId) -> RepositoryResult<&Listing> {
        self.listings.get(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Listing {} not found", id),
                ErrorContext::new("get_listing")
                    .with_entity("listing")
                    .with_entity_id(id),
            )
        })
    }

    fn name_taken(&self, name: &str, except: Option<ListingId>) -> bool {
        self.listings
            .values()
            .any(|l| l.name == name && Some(l.id) != except)
    }

    fn conflicts(
        &self,
        listing_id: ListingId,
        stay: &DateRange,
        exclude: Option<ReservationId>,
    ) -> Vec<Reservation> {
        self.reservations
            .values()
            .filter(|r| conflicts_with(r, listing_id, stay, exclude))
            .cloned()
            .collect()
    }

    fn sorted_photos(&self, filter: impl Fn(&Photo) -> bool) -> Vec<Photo> {
        let mut photos: Vec<Photo> = self.photos.values().filter(|p| filter(*p)).cloned().collect();
        photos.sort_by_key(|p| (p.order, p.id));
        photos
    }
}

fn name_conflict(operation: &str, name: &str) -> RepositoryError {
    RepositoryError::conflict_with_context(
        format!("A listing named '{}' already exists", name),
        ErrorContext::new(operation)
            .with_entity("listing")
            .with_details("unique name"),
    )
}

fn overlap_conflict(operation: &str, listing_id: ListingId, stay: &DateRange) -> RepositoryError {
    RepositoryError::conflict_with_context(
        format!("Listing {} is already booked for {}", listing_id, stay),
        ErrorContext::new(operation)
            .with_entity("reservation")
            .with_details(OVERLAP_CONSTRAINT),
    )
}

fn page_of<T>(items: Vec<T>, page: crate::models::PageRequest) -> Paged<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Paged::new(items, total, page)
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn listing_count(&self) -> usize {
        self.data.read().listings.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.data.read().reservations.len()
    }

    /// Overwrite the status of a stored reservation without transition checks.
    ///
    /// Test helper for seeding reservations in states that are only reachable
    /// through a sequence of transitions.
    pub fn force_status(&self, id: ReservationId, status: ReservationStatus) -> bool {
        match self.data.write().reservations.get_mut(&id) {
            Some(r) => {
                r.status = status;
                true
            }
            None => false,
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_listing(&self, input: &ListingInput) -> RepositoryResult<Listing> {
        let mut data = self.data.write();
        data.check_health()?;
        if data.name_taken(&input.name, None) {
            return Err(name_conflict("create_listing", &input.name));
        }

        let id = ListingId::new(data.next_listing_id);
        data.next_listing_id += 1;
        let now = Utc::now();
        let listing = Listing {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            location: input.location.clone(),
            nightly_price: input.nightly_price,
            max_guests: input.max_guests,
            rooms: input.rooms,
            bathrooms: input.bathrooms,
            amenities: input.amenities.clone(),
            available: input.available,
            created_at: now,
            updated_at: now,
        };
        data.listings.insert(id, listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> RepositoryResult<Listing> {
        let data = self.data.read();
        data.check_health()?;
        data.listing(id).cloned()
    }

    async fn find_listing_by_name(&self, name: &str) -> RepositoryResult<Option<Listing>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.listings.values().find(|l| l.name == name).cloned())
    }

    async fn list_listings(&self, filter: &ListingFilter) -> RepositoryResult<Paged<Listing>> {
        let data = self.data.read();
        data.check_health()?;

        let mut listings: Vec<Listing> = data
            .listings
            .values()
            .filter(|l| filter.available.is_none_or(|a| l.available == a))
            .cloned()
            .collect();
        listings.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page_of(listings, filter.page))
    }

    async fn update_listing(
        &self,
        id: ListingId,
        input: &ListingInput,
    ) -> RepositoryResult<Listing> {
        let mut data = self.data.write();
        data.check_health()?;
        data.listing(id)?;
        if data.name_taken(&input.name, Some(id)) {
            return Err(name_conflict("update_listing", &input.name));
        }

        let listing = data
            .listings
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Listing {} not found", id)))?;
        listing.name = input.name.clone();
        listing.description = input.description.clone();
        listing.location = input.location.clone();
        listing.nightly_price = input.nightly_price;
        listing.max_guests = input.max_guests;
        listing.rooms = input.rooms;
        listing.bathrooms = input.bathrooms;
        listing.amenities = input.amenities.clone();
        listing.available = input.available;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn delete_listing(&self, id: ListingId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.check_health()?;
        data.listing(id)?;

        data.listings.remove(&id);
        data.photos.retain(|_, p| p.listing_id != id);
        data.reservations.retain(|_, r| r.listing_id != id);
        Ok(())
    }
}

#[async_trait]
impl PhotoRepository for LocalRepository {
    async fn create_photo(&self, photo: &NewPhoto) -> RepositoryResult<Photo> {
        let mut data = self.data.write();
        data.check_health()?;
        data.listing(photo.listing_id)?;

        let id = PhotoId::new(data.next_photo_id);
        data.next_photo_id += 1;
        let now = Utc::now();
        let stored = Photo {
            id,
            listing_id: photo.listing_id,
            source: photo.source.clone(),
            description: photo.description.clone(),
            kind: photo.kind,
            order: photo.order,
            created_at: now,
            updated_at: now,
        };
        data.photos.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_photo(&self, id: PhotoId) -> RepositoryResult<Photo> {
        let data = self.data.read();
        data.check_health()?;
        data.photos
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Photo {} not found", id)))
    }

    async fn list_photos(&self, listing_id: Option<ListingId>) -> RepositoryResult<Vec<Photo>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.sorted_photos(|p| listing_id.is_none_or(|id| p.listing_id == id)))
    }

    async fn photos_for_listings(
        &self,
        listing_ids: &[ListingId],
    ) -> RepositoryResult<Vec<Photo>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.sorted_photos(|p| listing_ids.contains(&p.listing_id)))
    }

    async fn update_photo(&self, id: PhotoId, photo: &NewPhoto) -> RepositoryResult<Photo> {
        let mut data = self.data.write();
        data.check_health()?;
        data.listing(photo.listing_id)?;

        let stored = data
            .photos
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Photo {} not found", id)))?;
        stored.listing_id = photo.listing_id;
        stored.source = photo.source.clone();
        stored.description = photo.description.clone();
        stored.kind = photo.kind;
        stored.order = photo.order;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_photo(&self, id: PhotoId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.check_health()?;
        data.photos
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(format!("Photo {} not found", id)))
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> RepositoryResult<Reservation> {
        let mut data = self.data.write();
        data.check_health()?;
        data.listing(reservation.listing_id)?;

        let stay = reservation.stay();
        if !data.conflicts(reservation.listing_id, &stay, None).is_empty() {
            return Err(overlap_conflict(
                "create_reservation",
                reservation.listing_id,
                &stay,
            ));
        }

        let id = ReservationId::new(data.next_reservation_id);
        data.next_reservation_id += 1;
        let now = Utc::now();
        let stored = Reservation {
            id,
            listing_id: reservation.listing_id,
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            guests: reservation.guests,
            guest_name: reservation.guest_name.clone(),
            guest_email: reservation.guest_email.clone(),
            guest_phone: reservation.guest_phone.clone(),
            guest_notes: reservation.guest_notes.clone(),
            internal_notes: None,
            status: ReservationStatus::Pending,
            nights: reservation.nights,
            total_price: reservation.total_price,
            created_at: now,
            updated_at: now,
        };
        data.reservations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation> {
        let data = self.data.read();
        data.check_health()?;
        data.reservations
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Reservation {} not found", id)))
    }

    async fn list_reservations(
        &self,
        filter: &ReservationFilter,
    ) -> RepositoryResult<Paged<Reservation>> {
        let data = self.data.read();
        data.check_health()?;

        let mut reservations: Vec<Reservation> = data
            .reservations
            .values()
            .filter(|r| filter.listing_id.is_none_or(|id| r.listing_id == id))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(reservations, filter.page))
    }

    async fn find_overlapping_reservations(
        &self,
        listing_id: ListingId,
        stay: &DateRange,
        exclude: Option<ReservationId>,
    ) -> RepositoryResult<Vec<Reservation>> {
        let data = self.data.read();
        data.check_health()?;
        Ok(data.conflicts(listing_id, stay, exclude))
    }

    async fn update_reservation(
        &self,
        reservation: &Reservation,
    ) -> RepositoryResult<Reservation> {
        let mut data = self.data.write();
        data.check_health()?;
        data.listing(reservation.listing_id)?;

        let status = data
            .reservations
            .get(&reservation.id)
            .map(|r| r.status)
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Reservation {} not found", reservation.id))
            })?;

        let stay = reservation.stay();
        if status.is_active()
            && !data
                .conflicts(reservation.listing_id, &stay, Some(reservation.id))
                .is_empty()
        {
            return Err(overlap_conflict(
                "update_reservation",
                reservation.listing_id,
                &stay,
            ));
        }

        let stored = data
            .reservations
            .get_mut(&reservation.id)
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Reservation {} not found", reservation.id))
            })?;
        *stored = Reservation {
            status,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..reservation.clone()
        };
        Ok(stored.clone())
    }

    async fn set_reservation_status(
        &self,
        id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> RepositoryResult<Reservation> {
        let mut data = self.data.write();
        data.check_health()?;

        let stored = data
            .reservations
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Reservation {} not found", id)))?;
        if stored.status != from {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "Reservation {} is {}, expected {}",
                    id, stored.status, from
                ),
                ErrorContext::new("set_reservation_status")
                    .with_entity("reservation")
                    .with_entity_id(id),
            ));
        }
        stored.status = to;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}
