//! # feed-core
//!
//! Pure logic for ImageFeed (no I/O, instant tests).
//!
//! This crate implements the state machines behind the photo feed and the
//! OAuth code exchange without any network or disk I/O.
//!
//! The actual I/O (HTTP, token storage, observer delivery) is performed by
//! `feed-client`, which interprets the actions produced by these state
//! machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod exchange;
pub mod state;

pub use exchange::{Begin, ExchangeRejected, ExchangeState, Ticket};
pub use state::{
    Action, Event, FeedEvent, FeedSnapshot, FeedState, FetchTicket, DEFAULT_PER_PAGE,
};
