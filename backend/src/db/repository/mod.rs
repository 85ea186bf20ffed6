//! Repository trait definitions for database operations.
//!
//! Responsibilities are split across focused traits so each backend can be
//! implemented and tested one concern at a time.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`listing`]: Health check and listing CRUD
//! - [`photo`]: Listing photos
//! - [`reservation`]: Reservations and the overlap-checked writes
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use [`FullRepository`]:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let listing = repo.get_listing(ListingId::new(1)).await?;
//!     let photos = repo.list_photos(Some(listing.id)).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod listing;
pub mod photo;
pub mod reservation;

pub use error::{ErrorContext, RepositoryError, RepositoryResult, OVERLAP_CONSTRAINT};

pub use listing::ListingRepository;
pub use photo::PhotoRepository;
pub use reservation::ReservationRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: ListingRepository + PhotoRepository + ReservationRepository {}

// Blanket implementation: any type implementing all three traits is a FullRepository
impl<T> FullRepository for T where T: ListingRepository + PhotoRepository + ReservationRepository {}
