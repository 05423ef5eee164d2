//! Client errors.

use imagefeed_core::ExchangeRejected;
use imagefeed_types::WireError;
use thiserror::Error;

use crate::token_store::TokenStoreError;
use crate::transport::HttpError;

/// Errors returned by like toggles and token exchanges.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// Server answered with a non-2xx status.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// Server answered 401 to an authenticated request.
    #[error("unauthorized")]
    Unauthorized,

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] WireError),

    /// The operation needs a stored token and there is none.
    #[error("not authenticated")]
    Unauthenticated,

    /// The same authorization code is already being exchanged.
    #[error("duplicate request: code is already being exchanged")]
    DuplicateRequest,

    /// The exchange was superseded by one for a different code.
    #[error("cancelled: superseded by a newer exchange")]
    Cancelled,

    /// The authorization code was empty.
    #[error("invalid authorization code")]
    InvalidCode,

    /// A request URL could not be built from configuration.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Persisting the token failed.
    #[error("token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
}

impl From<ExchangeRejected> for ClientError {
    fn from(rejected: ExchangeRejected) -> Self {
        match rejected {
            ExchangeRejected::DuplicateRequest => ClientError::DuplicateRequest,
            ExchangeRejected::EmptyCode => ClientError::InvalidCode,
        }
    }
}

impl ClientError {
    /// Map a non-2xx status to an error.
    pub(crate) fn from_status(status: u16) -> Self {
        if status == 401 {
            ClientError::Unauthorized
        } else {
            ClientError::HttpStatus(status)
        }
    }
}
