//! High-level booking service layer.
//!
//! Repository-agnostic operations that combine validation, pricing and the
//! availability rules with persistence. Every function works with any
//! [`FullRepository`], including `dyn FullRepository` behind an `Arc`.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers                               │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │  Service layer (this module)                 │
//! │  normalize → validate → price → persist      │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │  Repository traits (repository/)             │
//! └──────────────────┬───────────────────────────┘
//!          ┌─────────┴──────────┐
//!   ┌──────▼──────┐      ┌──────▼──────┐
//!   │  Postgres   │      │   Local     │
//!   └─────────────┘      └─────────────┘
//! ```
//!
//! Functions that depend on the current date take `today` explicitly.

use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    DateRange, Listing, ListingFilter, ListingId, ListingInput, ListingPatch, NewPhoto,
    NewReservation, Paged, Photo, PhotoId, PhotoInput, PhotoPatch, Reservation,
    ReservationFilter, ReservationId, ReservationPatch, ReservationRequest, ReservationStatus,
};
use crate::services::availability::{validate_stay_dates, validate_stay_order};
use crate::services::notifications::{dispatch, Notifier, StatusNotification};
use crate::services::pricing::{quote, validate_guest_count, validate_stay_length, Quote};
use crate::services::validation::{
    normalize_email, normalize_guest_name, normalize_listing, normalize_phone,
    normalize_reservation, validate_listing, validate_photo, validate_reservation_fields,
    FieldErrors,
};
use crate::services::{ServiceError, ServiceResult};

const DUPLICATE_NAME: &str = "A listing with this name already exists.";
const UNKNOWN_LISTING: &str = "The selected listing does not exist.";

// ==================== Health & Connection ====================

pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Listings ====================

/// A listing with its photos in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingWithPhotos {
    pub listing: Listing,
    pub photos: Vec<Photo>,
}

impl ListingWithPhotos {
    /// The photo flagged primary (order 0), else the first one.
    pub fn primary_photo(&self) -> Option<&Photo> {
        self.photos
            .iter()
            .find(|p| p.is_primary())
            .or_else(|| self.photos.first())
    }
}

fn listing_lookup(id: ListingId) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| ServiceError::from_lookup("Listing", id, e)
}

/// Fetch a listing that another record refers to; a missing listing is a
/// validation error on `listing_id` rather than a 404.
async fn referenced_listing<R: FullRepository + ?Sized>(
    repo: &R,
    id: ListingId,
) -> ServiceResult<Listing> {
    match repo.get_listing(id).await {
        Ok(listing) => Ok(listing),
        Err(e) if e.is_not_found() => Err(ServiceError::field("listing_id", UNKNOWN_LISTING)),
        Err(e) => Err(e.into()),
    }
}

async fn validated_listing<R: FullRepository + ?Sized>(
    repo: &R,
    input: ListingInput,
    current: Option<ListingId>,
) -> ServiceResult<ListingInput> {
    let input = normalize_listing(input);
    let mut errors = validate_listing(&input);

    if !errors.contains("name") {
        if let Some(existing) = repo.find_listing_by_name(&input.name).await? {
            if Some(existing.id) != current {
                errors.add("name", DUPLICATE_NAME);
            }
        }
    }

    errors.into_result()?;
    Ok(input)
}

/// Storage-level uniqueness failures surface as the same field error as the pre-check.
fn duplicate_name(e: RepositoryError) -> ServiceError {
    if e.is_conflict() {
        ServiceError::field("name", DUPLICATE_NAME)
    } else {
        e.into()
    }
}

pub async fn create_listing<R: FullRepository + ?Sized>(
    repo: &R,
    input: ListingInput,
) -> ServiceResult<Listing> {
    let input = validated_listing(repo, input, None).await?;
    let listing = repo.create_listing(&input).await.map_err(duplicate_name)?;
    info!("Created listing {} '{}'", listing.id, listing.name);
    Ok(listing)
}

pub async fn get_listing<R: FullRepository + ?Sized>(
    repo: &R,
    id: ListingId,
) -> ServiceResult<Listing> {
    repo.get_listing(id).await.map_err(listing_lookup(id))
}

pub async fn get_listing_with_photos<R: FullRepository + ?Sized>(
    repo: &R,
    id: ListingId,
) -> ServiceResult<ListingWithPhotos> {
    let listing = get_listing(repo, id).await?;
    let photos = repo.list_photos(Some(id)).await?;
    Ok(ListingWithPhotos { listing, photos })
}

pub async fn list_listings<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &ListingFilter,
) -> ServiceResult<Paged<Listing>> {
    Ok(repo.list_listings(filter).await?)
}

/// One page of listings, each with its photos, using a single photo query.
pub async fn list_listings_with_photos<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &ListingFilter,
) -> ServiceResult<Paged<ListingWithPhotos>> {
    let page = repo.list_listings(filter).await?;
    let ids: Vec<ListingId> = page.items.iter().map(|l| l.id).collect();

    let mut by_listing: HashMap<ListingId, Vec<Photo>> = HashMap::new();
    for photo in repo.photos_for_listings(&ids).await? {
        by_listing.entry(photo.listing_id).or_default().push(photo);
    }

    Ok(page.map(|listing| {
        let photos = by_listing.remove(&listing.id).unwrap_or_default();
        ListingWithPhotos { listing, photos }
    }))
}

/// Replace every writable field of a listing.
pub async fn update_listing<R: FullRepository + ?Sized>(
    repo: &R,
    id: ListingId,
    input: ListingInput,
) -> ServiceResult<Listing> {
    get_listing(repo, id).await?;
    let input = validated_listing(repo, input, Some(id)).await?;
    let listing = repo
        .update_listing(id, &input)
        .await
        .map_err(|e| if e.is_not_found() { listing_lookup(id)(e) } else { duplicate_name(e) })?;
    info!("Updated listing {}", listing.id);
    Ok(listing)
}

pub async fn patch_listing<R: FullRepository + ?Sized>(
    repo: &R,
    id: ListingId,
    patch: ListingPatch,
) -> ServiceResult<Listing> {
    let current = get_listing(repo, id).await?;
    update_listing(repo, id, patch.apply(&current)).await
}

/// Delete a listing; its photos and reservations go with it.
pub async fn delete_listing<R: FullRepository + ?Sized>(
    repo: &R,
    id: ListingId,
) -> ServiceResult<()> {
    repo.delete_listing(id).await.map_err(listing_lookup(id))?;
    info!("Deleted listing {}", id);
    Ok(())
}

// ==================== Photos ====================

fn photo_lookup(id: PhotoId) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| ServiceError::from_lookup("Photo", id, e)
}

async fn validated_photo<R: FullRepository + ?Sized>(
    repo: &R,
    input: PhotoInput,
) -> ServiceResult<NewPhoto> {
    let mut errors = FieldErrors::new();
    let source = match validate_photo(&input) {
        Ok(source) => Some(source),
        Err(e) => {
            errors.merge(e);
            None
        }
    };

    if let Err(e) = referenced_listing(repo, input.listing_id).await {
        match e {
            ServiceError::Validation(e) => errors.merge(e),
            other => return Err(other),
        }
    }

    errors.into_result()?;
    let source = source
        .ok_or_else(|| ServiceError::field("non_field_errors", "An image or a URL is required."))?;
    Ok(NewPhoto {
        listing_id: input.listing_id,
        source,
        description: input.description.trim().to_string(),
        kind: input.kind,
        order: input.order,
    })
}

pub async fn create_photo<R: FullRepository + ?Sized>(
    repo: &R,
    input: PhotoInput,
) -> ServiceResult<Photo> {
    let photo = validated_photo(repo, input).await?;
    let stored = repo.create_photo(&photo).await?;
    info!(
        "Added {} photo {} to listing {}",
        stored.kind, stored.id, stored.listing_id
    );
    Ok(stored)
}

pub async fn get_photo<R: FullRepository + ?Sized>(repo: &R, id: PhotoId) -> ServiceResult<Photo> {
    repo.get_photo(id).await.map_err(photo_lookup(id))
}

pub async fn list_photos<R: FullRepository + ?Sized>(
    repo: &R,
    listing_id: Option<ListingId>,
) -> ServiceResult<Vec<Photo>> {
    Ok(repo.list_photos(listing_id).await?)
}

pub async fn update_photo<R: FullRepository + ?Sized>(
    repo: &R,
    id: PhotoId,
    patch: PhotoPatch,
) -> ServiceResult<Photo> {
    let current = get_photo(repo, id).await?;
    let photo = validated_photo(repo, patch.apply(&current)).await?;
    Ok(repo.update_photo(id, &photo).await.map_err(photo_lookup(id))?)
}

pub async fn delete_photo<R: FullRepository + ?Sized>(repo: &R, id: PhotoId) -> ServiceResult<()> {
    repo.delete_photo(id).await.map_err(photo_lookup(id))
}

// ==================== Availability ====================

/// Result of an availability query.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub listing: Listing,
    pub stay: DateRange,
    /// True when no active reservation overlaps the stay
    pub available: bool,
    pub conflicts: usize,
    pub quote: Quote,
}

/// Check whether `stay` is free on `listing_id`.
///
/// Fails with a validation error when the dates are reversed or in the past,
/// or when the listing does not exist.
pub async fn check_availability<R: FullRepository + ?Sized>(
    repo: &R,
    listing_id: ListingId,
    stay: DateRange,
    today: NaiveDate,
) -> ServiceResult<Availability> {
    let mut errors = FieldErrors::new();
    validate_stay_dates(&stay, today, &mut errors);
    let listing = match referenced_listing(repo, listing_id).await {
        Ok(listing) => Some(listing),
        Err(ServiceError::Validation(e)) => {
            errors.merge(e);
            None
        }
        Err(e) => return Err(e),
    };
    errors.into_result()?;
    let listing = listing.ok_or_else(|| ServiceError::field("listing_id", UNKNOWN_LISTING))?;

    let conflicts = repo
        .find_overlapping_reservations(listing_id, &stay, None)
        .await?
        .len();
    debug!(
        "Availability for listing {} over {}: {} conflict(s)",
        listing_id, stay, conflicts
    );

    Ok(Availability {
        quote: quote(&stay, listing.nightly_price),
        listing,
        stay,
        available: conflicts == 0,
        conflicts,
    })
}

// ==================== Reservations ====================

fn reservation_lookup(id: ReservationId) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| ServiceError::from_lookup("Reservation", id, e)
}

/// Overlap failures from storage become the same error as the pre-check.
fn overlap_or(listing_id: ListingId, stay: DateRange) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| {
        if e.is_conflict() {
            ServiceError::Unavailable { listing_id, stay }
        } else {
            e.into()
        }
    }
}

/// Validate, price and store a new reservation in PENDING state.
pub async fn create_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    request: ReservationRequest,
    today: NaiveDate,
) -> ServiceResult<Reservation> {
    let request = normalize_reservation(request);
    let stay = request.stay();

    let mut errors = validate_reservation_fields(&request);
    validate_stay_dates(&stay, today, &mut errors);
    validate_stay_length(&stay, &mut errors);

    let listing = match referenced_listing(repo, request.listing_id).await {
        Ok(listing) => Some(listing),
        Err(ServiceError::Validation(e)) => {
            errors.merge(e);
            None
        }
        Err(e) => return Err(e),
    };
    if let Some(listing) = &listing {
        if !listing.available {
            errors.add(
                "listing_id",
                "This listing is not currently available for booking.",
            );
        }
        if !errors.contains("guests") {
            validate_guest_count(request.guests, listing.max_guests, &mut errors);
        }
    }
    errors.into_result()?;
    let listing = listing.ok_or_else(|| ServiceError::field("listing_id", UNKNOWN_LISTING))?;

    let clashes = repo
        .find_overlapping_reservations(listing.id, &stay, None)
        .await?;
    if !clashes.is_empty() {
        return Err(ServiceError::Unavailable {
            listing_id: listing.id,
            stay,
        });
    }

    let Quote {
        nights,
        total_price,
    } = quote(&stay, listing.nightly_price);
    let new = NewReservation {
        listing_id: listing.id,
        check_in: stay.check_in,
        check_out: stay.check_out,
        guests: request.guests,
        guest_name: request.guest_name,
        guest_email: request.guest_email,
        guest_phone: request.guest_phone,
        guest_notes: request.guest_notes,
        nights,
        total_price,
    };

    let reservation = repo
        .create_reservation(&new)
        .await
        .map_err(overlap_or(listing.id, stay))?;
    info!(
        "Created reservation {} on listing {} for {} ({} nights, total {})",
        reservation.id, listing.id, stay, nights, total_price
    );
    Ok(reservation)
}

pub async fn get_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReservationId,
) -> ServiceResult<Reservation> {
    repo.get_reservation(id).await.map_err(reservation_lookup(id))
}

pub async fn list_reservations<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &ReservationFilter,
) -> ServiceResult<Paged<Reservation>> {
    Ok(repo.list_reservations(filter).await?)
}

fn normalize_patch(patch: ReservationPatch) -> ReservationPatch {
    ReservationPatch {
        guest_name: patch.guest_name.as_deref().map(normalize_guest_name),
        guest_email: patch.guest_email.as_deref().map(normalize_email),
        guest_phone: patch
            .guest_phone
            .as_deref()
            .map(|p| normalize_phone(Some(p)).unwrap_or_default()),
        ..patch
    }
}

/// Apply a guest/staff edit to a reservation that is still modifiable.
///
/// Moving the dates re-runs the date rules and the availability check
/// (ignoring this reservation) and reprices the stay. The past check-in
/// rule applies only when the check-in itself moves.
pub async fn update_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    id: ReservationId,
    patch: ReservationPatch,
    today: NaiveDate,
) -> ServiceResult<Reservation> {
    let current = get_reservation(repo, id).await?;
    if !current.is_modifiable() {
        return Err(ServiceError::NotModifiable(current.status));
    }

    let patch = normalize_patch(patch);
    let dates_changed = patch.changes_dates(&current);
    let mut updated = patch.apply(&current);
    if updated.guest_phone.as_deref() == Some("") {
        updated.guest_phone = None;
    }
    let stay = updated.stay();

    let as_request = ReservationRequest {
        listing_id: updated.listing_id,
        check_in: updated.check_in,
        check_out: updated.check_out,
        guests: updated.guests,
        guest_name: updated.guest_name.clone(),
        guest_email: updated.guest_email.clone(),
        guest_phone: updated.guest_phone.clone(),
        guest_notes: updated.guest_notes.clone(),
    };
    let mut errors = validate_reservation_fields(&as_request);
    if dates_changed {
        // A stay already under way keeps its past check-in.
        if updated.check_in != current.check_in {
            validate_stay_dates(&stay, today, &mut errors);
        } else {
            validate_stay_order(&stay, &mut errors);
        }
        validate_stay_length(&stay, &mut errors);
    }

    let listing = get_listing(repo, updated.listing_id).await?;
    if !errors.contains("guests") {
        validate_guest_count(updated.guests, listing.max_guests, &mut errors);
    }
    errors.into_result()?;

    if dates_changed {
        let clashes = repo
            .find_overlapping_reservations(listing.id, &stay, Some(id))
            .await?;
        if !clashes.is_empty() {
            return Err(ServiceError::Unavailable {
                listing_id: listing.id,
                stay,
            });
        }
        let priced = quote(&stay, listing.nightly_price);
        updated.nights = priced.nights;
        updated.total_price = priced.total_price;
    }

    let saved = repo
        .update_reservation(&updated)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                reservation_lookup(id)(e)
            } else {
                overlap_or(listing.id, stay)(e)
            }
        })?;
    info!("Updated reservation {}", saved.id);
    Ok(saved)
}

/// Move a reservation to `to` if the state machine allows it.
///
/// Entering CONFIRMED or REFUSED notifies the guest through `notifier`;
/// delivery happens in the background and never fails the transition.
/// CANCELLED goes through the same cut-off as [`cancel_reservation`].
pub async fn transition_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &Arc<dyn Notifier>,
    id: ReservationId,
    to: ReservationStatus,
    today: NaiveDate,
) -> ServiceResult<Reservation> {
    if to == ReservationStatus::Cancelled {
        return cancel_reservation(repo, notifier, id, today).await;
    }
    move_reservation(repo, notifier, id, to).await
}

async fn move_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &Arc<dyn Notifier>,
    id: ReservationId,
    to: ReservationStatus,
) -> ServiceResult<Reservation> {
    let current = get_reservation(repo, id).await?;
    apply_transition(repo, notifier, current, to).await
}

async fn apply_transition<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &Arc<dyn Notifier>,
    current: Reservation,
    to: ReservationStatus,
) -> ServiceResult<Reservation> {
    let from = current.status;
    if !from.can_transition_to(to) {
        return Err(ServiceError::InvalidTransition { from, to });
    }

    let updated = repo
        .set_reservation_status(current.id, from, to)
        .await
        .map_err(|e| {
            if e.is_conflict() {
                // Another request changed the status first.
                ServiceError::InvalidTransition { from, to }
            } else {
                reservation_lookup(current.id)(e)
            }
        })?;
    info!("Reservation {} moved {} -> {}", updated.id, from, to);

    if to.notifies_guest() {
        let listing_name = match repo.get_listing(updated.listing_id).await {
            Ok(listing) => listing.name,
            Err(e) => {
                warn!(
                    "Could not load listing {} for notification: {}",
                    updated.listing_id, e
                );
                format!("listing {}", updated.listing_id)
            }
        };
        dispatch(
            Arc::clone(notifier),
            StatusNotification::new(&updated, &listing_name, from),
        );
    }

    Ok(updated)
}

pub async fn confirm_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &Arc<dyn Notifier>,
    id: ReservationId,
) -> ServiceResult<Reservation> {
    move_reservation(repo, notifier, id, ReservationStatus::Confirmed).await
}

pub async fn refuse_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &Arc<dyn Notifier>,
    id: ReservationId,
) -> ServiceResult<Reservation> {
    move_reservation(repo, notifier, id, ReservationStatus::Refused).await
}

/// Guest cancellation: only while modifiable and before the check-in day.
pub async fn cancel_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &Arc<dyn Notifier>,
    id: ReservationId,
    today: NaiveDate,
) -> ServiceResult<Reservation> {
    let current = get_reservation(repo, id).await?;
    if !current.status.can_transition_to(ReservationStatus::Cancelled) {
        return Err(ServiceError::InvalidTransition {
            from: current.status,
            to: ReservationStatus::Cancelled,
        });
    }
    if !current.is_cancellable(today) {
        return Err(ServiceError::NotCancellable(current.status));
    }
    apply_transition(repo, notifier, current, ReservationStatus::Cancelled).await
}
