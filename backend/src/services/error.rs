//! Errors raised by the booking services.

use crate::db::RepositoryError;
use crate::models::{DateRange, ListingId, ReservationStatus};

use super::validation::FieldErrors;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// One or more input fields were rejected.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The requested stay overlaps an active reservation.
    #[error("Listing {listing_id} is not available for {stay}")]
    Unavailable { listing_id: ListingId, stay: DateRange },

    #[error("Cannot change reservation status from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Reservation in state {0} can no longer be modified")]
    NotModifiable(ReservationStatus),

    #[error("Reservation in state {0} cannot be cancelled")]
    NotCancellable(ReservationStatus),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    /// Map a repository NotFound onto the named entity; pass other errors through.
    pub fn from_lookup(entity: &'static str, id: impl ToString, err: RepositoryError) -> Self {
        if err.is_not_found() {
            Self::not_found(entity, id)
        } else {
            Self::Repository(err)
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
