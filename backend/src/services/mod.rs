//! Booking rules independent of storage.
//!
//! These modules hold the pure pieces (overlap checks, pricing, validation)
//! and the error type the orchestration in [`crate::db::services`] returns.

pub mod availability;
pub mod error;
pub mod notifications;
pub mod pricing;
pub mod validation;

pub use availability::{find_conflicts, is_available, validate_stay_dates};
pub use error::{ServiceError, ServiceResult};
pub use notifications::{dispatch, LogNotifier, Notifier, StatusNotification};
pub use pricing::{quote, Quote};
pub use validation::FieldErrors;
