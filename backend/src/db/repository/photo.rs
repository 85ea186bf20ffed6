//! Photo repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ListingId, NewPhoto, Photo, PhotoId};

/// Storage operations for listing photos.
///
/// Every query returns photos ordered by `order`, then by id.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Store a photo. Fails with `NotFound` when the listing does not exist.
    async fn create_photo(&self, photo: &NewPhoto) -> RepositoryResult<Photo>;

    async fn get_photo(&self, id: PhotoId) -> RepositoryResult<Photo>;

    /// All photos, or only those of `listing_id` when given.
    async fn list_photos(&self, listing_id: Option<ListingId>) -> RepositoryResult<Vec<Photo>>;

    /// Photos belonging to any of `listing_ids`, for building list summaries in one query.
    async fn photos_for_listings(&self, listing_ids: &[ListingId])
        -> RepositoryResult<Vec<Photo>>;

    async fn update_photo(&self, id: PhotoId, photo: &NewPhoto) -> RepositoryResult<Photo>;

    async fn delete_photo(&self, id: PhotoId) -> RepositoryResult<()>;
}
