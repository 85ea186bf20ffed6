//! Reservation repository trait.
//!
//! Writes that place a stay on the calendar are checked against the overlap
//! invariant inside the backend, atomically with the write. Two concurrent
//! requests for the same dates cannot both succeed.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    DateRange, ListingId, NewReservation, Paged, Reservation, ReservationFilter, ReservationId,
    ReservationStatus,
};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Store a new reservation in PENDING state.
    ///
    /// # Returns
    /// * `Ok(Reservation)` - The stored reservation
    /// * `Err(RepositoryError::NotFound)` - If the listing doesn't exist
    /// * `Err(RepositoryError::ConflictError)` - If the stay overlaps an active reservation
    async fn create_reservation(&self, reservation: &NewReservation)
        -> RepositoryResult<Reservation>;

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation>;

    /// List reservations, newest first.
    async fn list_reservations(
        &self,
        filter: &ReservationFilter,
    ) -> RepositoryResult<Paged<Reservation>>;

    /// Active reservations on `listing_id` overlapping `stay`, minus `exclude`.
    async fn find_overlapping_reservations(
        &self,
        listing_id: ListingId,
        stay: &DateRange,
        exclude: Option<ReservationId>,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Persist the editable fields, dates and pricing of `reservation`.
    ///
    /// The status column is left untouched. Fails with `ConflictError` when
    /// the new stay overlaps another active reservation.
    async fn update_reservation(&self, reservation: &Reservation)
        -> RepositoryResult<Reservation>;

    /// Move a reservation from `from` to `to`.
    ///
    /// Fails with `ConflictError` if the stored status is no longer `from`,
    /// so two racing transitions cannot both apply.
    async fn set_reservation_status(
        &self,
        id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> RepositoryResult<Reservation>;
}
