//! Photo records and the feed's domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// Pixel dimensions of the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A single entry of the feed.
///
/// Everything except `is_liked` is fixed when the photo is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Stable, unique identifier.
    pub id: String,
    /// Dimensions of the full-size image.
    pub size: PixelSize,
    /// Upload time, if the API supplied a parseable one.
    pub created_at: Option<DateTime<Utc>>,
    /// Free-form caption.
    pub description: Option<String>,
    /// URL of the small rendition.
    pub thumb_url: String,
    /// URL of the full-size rendition.
    pub full_url: String,
    /// Whether the current user has liked this photo.
    pub is_liked: bool,
}

/// Image URLs attached to a [`PhotoRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUrls {
    /// Thumbnail rendition.
    pub thumb: String,
    /// Full-size rendition.
    pub full: String,
}

/// One element of the JSON array returned by `GET /photos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Photo identifier.
    pub id: String,
    /// ISO 8601 upload timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether the authenticated user liked the photo.
    pub liked_by_user: bool,
    /// Caption.
    #[serde(default)]
    pub description: Option<String>,
    /// Rendition URLs.
    pub urls: PhotoUrls,
}

impl TryFrom<PhotoRecord> for Photo {
    type Error = WireError;

    /// Fails on a zero width or height; every real photo has both.
    fn try_from(record: PhotoRecord) -> Result<Self, Self::Error> {
        for (field, value) in [("width", record.width), ("height", record.height)] {
            if value == 0 {
                return Err(WireError::InvalidField {
                    field,
                    value: u64::from(value),
                });
            }
        }
        Ok(Self {
            created_at: record.created_at.as_deref().and_then(parse_timestamp),
            id: record.id,
            size: PixelSize {
                width: record.width,
                height: record.height,
            },
            description: record.description,
            thumb_url: record.urls.thumb,
            full_url: record.urls.full,
            is_liked: record.liked_by_user,
        })
    }
}

/// Parse an internet date-time (RFC 3339) into UTC.
///
/// Returns `None` for anything unparseable; a bad timestamp never fails a page.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decode a page body (a JSON array of photo records) into photos, keeping API order.
///
/// One invalid record fails the whole page.
pub fn decode_page(bytes: &[u8]) -> Result<Vec<Photo>, WireError> {
    let records: Vec<PhotoRecord> = serde_json::from_slice(bytes)?;
    records.into_iter().map(Photo::try_from).collect()
}
