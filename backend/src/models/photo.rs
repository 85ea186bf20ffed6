//! Photo entity: media attached to a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::listing::ListingId;
use crate::define_id_type;

define_id_type!(i64, PhotoId);

/// Where the picture comes from. A photo has exactly one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSource {
    /// Path of an uploaded file, relative to the media root
    Image(String),
    /// External absolute URL
    Url(String),
}

impl PhotoSource {
    pub fn image(&self) -> Option<&str> {
        match self {
            PhotoSource::Image(path) => Some(path),
            PhotoSource::Url(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            PhotoSource::Url(url) => Some(url),
            PhotoSource::Image(_) => None,
        }
    }

    /// Public URL for this source; uploaded images are served under `media_url`.
    pub fn public_url(&self, media_url: &str) -> String {
        match self {
            PhotoSource::Image(path) => format!(
                "{}/{}",
                media_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            PhotoSource::Url(url) => url.clone(),
        }
    }
}

/// Category of a photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoKind {
    Principale,
    Camera,
    Bagno,
    Cucina,
    Esterno,
    #[default]
    Altro,
}

impl PhotoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Principale => "principale",
            PhotoKind::Camera => "camera",
            PhotoKind::Bagno => "bagno",
            PhotoKind::Cucina => "cucina",
            PhotoKind::Esterno => "esterno",
            PhotoKind::Altro => "altro",
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "principale" => Ok(Self::Principale),
            "camera" => Ok(Self::Camera),
            "bagno" => Ok(Self::Bagno),
            "cucina" => Ok(Self::Cucina),
            "esterno" => Ok(Self::Esterno),
            "altro" => Ok(Self::Altro),
            _ => Err(format!("Unknown photo kind: {}", s)),
        }
    }
}

/// A stored photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub listing_id: ListingId,
    pub source: PhotoSource,
    pub description: String,
    pub kind: PhotoKind,
    /// Display order; 0 marks the primary photo
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Photo {
    pub fn image_url(&self, media_url: &str) -> String {
        self.source.public_url(media_url)
    }

    pub fn is_primary(&self) -> bool {
        self.order == 0
    }
}

/// Validated photo ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub listing_id: ListingId,
    pub source: PhotoSource,
    pub description: String,
    pub kind: PhotoKind,
    pub order: i32,
}

/// Photo creation request. Exactly one of `image` and `url` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PhotoInput {
    pub listing_id: ListingId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "Description cannot exceed 255 characters."))]
    pub description: String,
    #[serde(default)]
    pub kind: PhotoKind,
    #[serde(default)]
    #[validate(range(min = 0, message = "Order must be zero or positive."))]
    pub order: i32,
}

/// Partial photo update. Supplying `image` or `url` replaces the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPatch {
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub kind: Option<PhotoKind>,
    pub order: Option<i32>,
}

impl PhotoPatch {
    /// Merge this patch over the stored photo, producing a full input to re-validate.
    pub fn apply(self, photo: &Photo) -> PhotoInput {
        let (image, url) = if self.image.is_some() || self.url.is_some() {
            (self.image, self.url)
        } else {
            (
                photo.source.image().map(str::to_string),
                photo.source.url().map(str::to_string),
            )
        };

        PhotoInput {
            listing_id: photo.listing_id,
            image,
            url,
            description: self.description.unwrap_or_else(|| photo.description.clone()),
            kind: self.kind.unwrap_or(photo.kind),
            order: self.order.unwrap_or(photo.order),
        }
    }
}
