//! # feed-types
//!
//! Wire format types for the ImageFeed photo API.
//!
//! This crate provides the foundational types used across all ImageFeed crates:
//! - [`Photo`], [`PixelSize`] - Domain model for a feed entry
//! - [`PhotoRecord`], [`PhotoUrls`] - JSON records returned by `GET /photos`
//! - [`TokenResponse`] - JSON body returned by the OAuth token endpoint
//! - [`WireError`] - Decoding errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod photo;
mod token;

pub use error::WireError;
pub use photo::{decode_page, parse_timestamp, Photo, PhotoRecord, PhotoUrls, PixelSize};
pub use token::TokenResponse;
