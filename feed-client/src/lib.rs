//! # feed-client
//!
//! Client library for ImageFeed: a paginated photo feed with likes, backed
//! by an OAuth authorization-code login.
//!
//! ## Features
//!
//! - **Pure State Machines**: feed and exchange rules live in feed-core
//! - **HTTP Abstraction**: pluggable client (reqwest, mock)
//! - **Single-Flight Login**: duplicate codes rejected, stale exchanges cancelled
//! - **Observers**: drop-to-unsubscribe change notifications
//!
//! ## Example
//!
//! ```ignore
//! use imagefeed_client::{FeedConfig, Session};
//!
//! let config = FeedConfig::from_file(&data_dir.join("imagefeed.toml"))?;
//! let session = Session::open(config, &data_dir)?;
//!
//! session.login("code-from-redirect").await?;
//! let _sub = session.feed().subscribe(|n| println!("{:?}", n.event));
//! session.feed().fetch_next_page().await;
//! session.feed().toggle_like("abc123", true).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod feed;
pub mod notify;
pub mod oauth;
pub mod session;
pub mod token_store;
pub mod transport;

pub use config::{ConfigError, FeedConfig};
pub use error::ClientError;
pub use feed::{FeedSynchronizer, FetchOutcome};
pub use notify::{FeedNotification, Notifier, Subscription};
pub use oauth::OAuthExchanger;
pub use session::Session;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use transport::{
    HttpClient, HttpError, HttpRequest, HttpResponse, Method, MockHttpClient, ReqwestClient,
};

// Re-exported so callers need only this crate.
pub use imagefeed_core::{FeedEvent, FeedSnapshot};
pub use imagefeed_types::Photo;
