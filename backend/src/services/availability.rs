//! Date-overlap availability check.
//!
//! A stay is available on a listing when no reservation in an active state
//! (PENDING, CONFIRMED, PAID) overlaps it under the half-open test. The
//! functions here are pure; storage backends apply the same predicate.

use chrono::NaiveDate;

use super::validation::FieldErrors;
use crate::models::{DateRange, ListingId, Reservation, ReservationId};

/// True when `reservation` blocks `stay` on `listing_id`.
pub fn conflicts_with(
    reservation: &Reservation,
    listing_id: ListingId,
    stay: &DateRange,
    exclude: Option<ReservationId>,
) -> bool {
    reservation.listing_id == listing_id
        && reservation.status.is_active()
        && exclude != Some(reservation.id)
        && reservation.stay().overlaps(stay)
}

/// All reservations that block `stay` on `listing_id`, in input order.
pub fn find_conflicts<'a>(
    existing: &'a [Reservation],
    listing_id: ListingId,
    stay: &DateRange,
    exclude: Option<ReservationId>,
) -> Vec<&'a Reservation> {
    existing
        .iter()
        .filter(|r| conflicts_with(r, listing_id, stay, exclude))
        .collect()
}

pub fn is_available(
    existing: &[Reservation],
    listing_id: ListingId,
    stay: &DateRange,
    exclude: Option<ReservationId>,
) -> bool {
    !existing
        .iter()
        .any(|r| conflicts_with(r, listing_id, stay, exclude))
}

/// Check-out must fall after check-in.
pub fn validate_stay_order(stay: &DateRange, errors: &mut FieldErrors) {
    if !stay.is_well_formed() {
        errors.add("check_out", "Check-out must be after check-in.");
    }
}

/// Date rules shared by availability checks and new reservations:
/// check-out after check-in, check-in not before `today`.
pub fn validate_stay_dates(stay: &DateRange, today: NaiveDate, errors: &mut FieldErrors) {
    validate_stay_order(stay, errors);
    if stay.check_in < today {
        errors.add("check_in", "Check-in cannot be in the past.");
    }
}
