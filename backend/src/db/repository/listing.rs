//! Listing repository trait: health and listing CRUD.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Listing, ListingFilter, ListingId, ListingInput, Paged};

/// Storage operations for listings.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Listing Operations ====================

    /// Store a new listing.
    ///
    /// # Returns
    /// * `Ok(Listing)` - The stored listing with its assigned id and timestamps
    /// * `Err(RepositoryError::ConflictError)` - If the name is already taken
    async fn create_listing(&self, input: &ListingInput) -> RepositoryResult<Listing>;

    /// Retrieve a listing by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the listing doesn't exist
    async fn get_listing(&self, id: ListingId) -> RepositoryResult<Listing>;

    /// Find a listing by its exact name.
    async fn find_listing_by_name(&self, name: &str) -> RepositoryResult<Option<Listing>>;

    /// List listings ordered by name.
    async fn list_listings(&self, filter: &ListingFilter) -> RepositoryResult<Paged<Listing>>;

    /// Replace every writable field of a listing.
    async fn update_listing(&self, id: ListingId, input: &ListingInput)
        -> RepositoryResult<Listing>;

    /// Delete a listing together with its photos and reservations.
    async fn delete_listing(&self, id: ListingId) -> RepositoryResult<()>;
}
