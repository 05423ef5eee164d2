//! Feed state machine for ImageFeed.
//!
//! This module provides a side-effect-free state machine for the photo feed.
//! The state machine takes events as input, mutates the feed, and produces a
//! list of actions to execute.
//!
//! The actual I/O (HTTP requests, observer delivery) is performed by
//! feed-client, not by this module.

use std::collections::HashMap;

use imagefeed_types::Photo;

/// Default page size requested from the API.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Identifies one page request.
///
/// Completions carry the ticket of the request they answer; only the
/// current ticket is accepted, so a request issued before a reset can never
/// commit into, or clear the loading flag of, a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy)]
struct InFlight {
    page: u32,
    ticket: FetchTicket,
}

/// Feed state - NO I/O, just state transitions.
///
/// Photos are kept in page-arrival order and never re-sorted. At most one
/// page request is in flight at a time.
#[derive(Debug, Clone)]
pub struct FeedState {
    photos: Vec<Photo>,
    /// Photo id -> position in `photos`.
    index: HashMap<String, usize>,
    last_loaded_page: Option<u32>,
    /// The page request currently in flight.
    in_flight: Option<InFlight>,
    next_ticket: u64,
    per_page: u32,
}

impl FeedState {
    /// Create an empty feed that requests `per_page` photos at a time.
    pub fn new(per_page: u32) -> Self {
        Self {
            photos: Vec::new(),
            index: HashMap::new(),
            last_loaded_page: None,
            in_flight: None,
            next_ticket: 0,
            per_page: per_page.max(1),
        }
    }

    /// Process an event and return the actions to execute.
    ///
    /// The caller (feed-client) is responsible for executing the returned
    /// actions.
    pub fn on_event(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::FetchRequested => {
                if self.in_flight.is_some() {
                    return vec![];
                }
                let page = self.next_page();
                self.next_ticket = self.next_ticket.wrapping_add(1);
                let ticket = FetchTicket(self.next_ticket);
                self.in_flight = Some(InFlight { page, ticket });
                vec![Action::RequestPage {
                    page,
                    per_page: self.per_page,
                    ticket,
                }]
            }

            Event::PageLoaded { ticket, photos } => {
                let Some(page) = self.take_in_flight(ticket) else {
                    // Stale completion (e.g. the feed was reset meanwhile).
                    return vec![];
                };
                self.last_loaded_page = Some(page);

                let mut appended = Vec::with_capacity(photos.len());
                for photo in photos {
                    if self.index.contains_key(&photo.id) {
                        continue;
                    }
                    self.index.insert(photo.id.clone(), self.photos.len());
                    self.photos.push(photo.clone());
                    appended.push(photo);
                }

                vec![Action::EmitEvent(FeedEvent::PagesAppended { photos: appended })]
            }

            Event::PageFailed { ticket } => {
                self.take_in_flight(ticket);
                vec![]
            }

            Event::LikeConfirmed { photo_id, liked } => {
                if let Some(&position) = self.index.get(&photo_id) {
                    self.photos[position].is_liked = liked;
                }
                vec![Action::EmitEvent(FeedEvent::StateChanged)]
            }

            Event::Reset => {
                self.photos.clear();
                self.index.clear();
                self.last_loaded_page = None;
                self.in_flight = None;
                vec![Action::EmitEvent(FeedEvent::StateChanged)]
            }
        }
    }

    /// Clear the in-flight request if `ticket` is current; returns its page.
    fn take_in_flight(&mut self, ticket: FetchTicket) -> Option<u32> {
        match self.in_flight {
            Some(current) if current.ticket == ticket => {
                self.in_flight = None;
                Some(current.page)
            }
            _ => None,
        }
    }

    /// Page number the next fetch will request.
    pub fn next_page(&self) -> u32 {
        self.last_loaded_page.unwrap_or(0).saturating_add(1)
    }

    /// Check if a page request is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last page that was appended, if any.
    pub fn last_loaded_page(&self) -> Option<u32> {
        self.last_loaded_page
    }

    /// Configured page size.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// All photos in arrival order.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Look up a photo by id.
    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.index.get(id).map(|&position| &self.photos[position])
    }

    /// Copy the observable state.
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            photos: self.photos.clone(),
            last_loaded_page: self.last_loaded_page,
            is_loading: self.is_loading(),
        }
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// Events that drive the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Caller asked for the next page.
    FetchRequested,
    /// A page request succeeded and decoded.
    PageLoaded {
        /// Ticket from the matching [`Action::RequestPage`].
        ticket: FetchTicket,
        /// Decoded photos in API order.
        photos: Vec<Photo>,
    },
    /// A page request failed (transport, status, or decode).
    PageFailed {
        /// Ticket from the matching [`Action::RequestPage`].
        ticket: FetchTicket,
    },
    /// The server confirmed a like or unlike.
    LikeConfirmed {
        /// Photo the mutation applied to.
        photo_id: String,
        /// New liked state.
        liked: bool,
    },
    /// Discard everything (logout).
    Reset,
}

/// Actions to be executed by feed-client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Issue `GET /photos` for the given page.
    RequestPage {
        /// Page number (1-based).
        page: u32,
        /// Page size.
        per_page: u32,
        /// Echoed back in `PageLoaded` / `PageFailed`.
        ticket: FetchTicket,
    },
    /// Publish an event to observers.
    EmitEvent(FeedEvent),
}

/// Events published to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A page was appended; carries only the new photos.
    PagesAppended {
        /// Photos appended by this page, in order.
        photos: Vec<Photo>,
    },
    /// Something changed in place; re-read the full state.
    StateChanged,
}

/// Point-in-time copy of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// All photos in arrival order.
    pub photos: Vec<Photo>,
    /// Last page appended.
    pub last_loaded_page: Option<u32>,
    /// Whether a page request was in flight.
    pub is_loading: bool,
}

impl FeedSnapshot {
    /// Look up a photo by id.
    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id == id)
    }

    /// Number of photos.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}
