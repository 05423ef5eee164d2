//! Error types for ImageFeed wire decoding.

use thiserror::Error;

/// Errors that can occur while decoding API payloads.
#[derive(Debug, Error)]
pub enum WireError {
    /// Body was not valid JSON, or did not match the expected shape.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was present but empty.
    #[error("empty field: {0}")]
    EmptyField(&'static str),

    /// A numeric field held a value the API never produces.
    #[error("invalid {field}: {value}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: u64,
    },
}
