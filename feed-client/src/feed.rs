//! FeedSynchronizer - paginated photo feed with like toggling.
//!
//! Protocol logic lives in [`FeedState`] (imagefeed-core); this module
//! executes the actions it produces:
//!
//! ```text
//! caller → FeedSynchronizer → HttpClient → API
//!               ↓        ↘
//!           FeedState     Notifier → observers
//! ```
//!
//! The state lock is never held across a request. Results are committed on
//! the task that awaited the request, and observers are notified on that
//! same task after the commit, before the operation returns.

use std::sync::Arc;

use imagefeed_core::{Action, Event, FeedEvent, FeedSnapshot, FeedState, FetchTicket};
use imagefeed_types::{decode_page, Photo};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::ClientError;
use crate::notify::{FeedNotification, Notifier, Subscription};
use crate::token_store::TokenStore;
use crate::transport::{HttpClient, HttpRequest, Method};

/// Result of [`FeedSynchronizer::fetch_next_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was loaded.
    Appended {
        /// Page number that was loaded.
        page: u32,
        /// Number of photos appended.
        count: usize,
        /// Number of records the API returned; larger than `count` when
        /// some were already in the feed.
        received: usize,
    },
    /// A page request was already in flight, or the feed was reset while
    /// this one was pending.
    Skipped,
    /// The request failed; the feed is unchanged.
    Failed,
}

/// Loads the feed page by page and applies confirmed like changes.
pub struct FeedSynchronizer<H, S> {
    http: Arc<H>,
    tokens: Arc<S>,
    config: Arc<FeedConfig>,
    state: Arc<Mutex<FeedState>>,
    notifier: Notifier,
}

impl<H, S> FeedSynchronizer<H, S>
where
    H: HttpClient,
    S: TokenStore,
{
    /// Create an empty feed.
    pub fn new(config: Arc<FeedConfig>, http: Arc<H>, tokens: Arc<S>) -> Self {
        let state = FeedState::new(config.per_page);
        Self {
            http,
            tokens,
            config,
            state: Arc::new(Mutex::new(state)),
            notifier: Notifier::new(),
        }
    }

    /// Fetch the page after the last loaded one.
    ///
    /// Returns [`FetchOutcome::Skipped`] without sending anything if a page
    /// request is already in flight. Failures are logged and leave the feed
    /// untouched; a 401 does not clear the stored token.
    pub async fn fetch_next_page(&self) -> FetchOutcome {
        let (page, per_page, ticket) = {
            let mut state = self.state.lock().await;
            let request = state
                .on_event(Event::FetchRequested)
                .into_iter()
                .find_map(|action| match action {
                    Action::RequestPage {
                        page,
                        per_page,
                        ticket,
                    } => Some((page, per_page, ticket)),
                    Action::EmitEvent(_) => None,
                });
            match request {
                Some(request) => request,
                None => {
                    debug!("Fetch skipped: a page request is already in flight");
                    return FetchOutcome::Skipped;
                }
            }
        };

        let mut guard = LoadingGuard::new(Arc::clone(&self.state), page, ticket);
        debug!("Requesting page {} ({} per page)", page, per_page);
        let result = self.request_page(page, per_page).await;

        let mut state = self.state.lock().await;
        guard.disarm();

        match result {
            Ok(photos) => {
                let received = photos.len();
                let actions = state.on_event(Event::PageLoaded { ticket, photos });
                let snapshot = state.snapshot();
                drop(state);

                let count: usize = actions
                    .iter()
                    .map(|action| match action {
                        Action::EmitEvent(FeedEvent::PagesAppended { photos }) => photos.len(),
                        _ => 0,
                    })
                    .sum();
                if actions.is_empty() {
                    debug!("Discarding page {}: feed was reset", page);
                    return FetchOutcome::Skipped;
                }

                info!(
                    "Loaded page {}: {} new photos ({} total)",
                    page,
                    count,
                    snapshot.len()
                );
                self.dispatch(actions, snapshot);
                FetchOutcome::Appended {
                    page,
                    count,
                    received,
                }
            }
            Err(e) => {
                state.on_event(Event::PageFailed { ticket });
                drop(state);
                warn!("Failed to load page {}: {}", page, e);
                FetchOutcome::Failed
            }
        }
    }

    /// Like (`like = true`) or unlike a photo.
    ///
    /// Local state changes only after the server confirms. Toggling a photo
    /// that is not in the feed succeeds without changing anything.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unauthenticated`] if no token is stored (no request)
    /// - [`ClientError::Unauthorized`] on 401
    /// - [`ClientError::HttpStatus`] on any other non-2xx status
    /// - [`ClientError::Transport`] if the request could not be completed
    pub async fn toggle_like(&self, photo_id: &str, like: bool) -> Result<(), ClientError> {
        let result = self.send_like(photo_id, like).await;
        if let Err(e) = &result {
            warn!("Like toggle for {} failed: {}", photo_id, e);
            return result;
        }

        let (actions, snapshot) = {
            let mut state = self.state.lock().await;
            let actions = state.on_event(Event::LikeConfirmed {
                photo_id: photo_id.to_string(),
                liked: like,
            });
            (actions, state.snapshot())
        };
        info!("Photo {} {}", photo_id, if like { "liked" } else { "unliked" });
        self.dispatch(actions, snapshot);
        Ok(())
    }

    /// Discard every loaded photo and the page counter.
    ///
    /// A page request still in flight is ignored when it completes.
    pub async fn reset(&self) {
        let (actions, snapshot) = {
            let mut state = self.state.lock().await;
            let actions = state.on_event(Event::Reset);
            (actions, state.snapshot())
        };
        debug!("Feed reset");
        self.dispatch(actions, snapshot);
    }

    /// Copy of the current feed.
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Look up a loaded photo.
    pub async fn photo(&self, id: &str) -> Option<Photo> {
        self.state.lock().await.photo(id).cloned()
    }

    /// Whether a page request is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading()
    }

    /// Last page appended, `None` before the first.
    pub async fn last_loaded_page(&self) -> Option<u32> {
        self.state.lock().await.last_loaded_page()
    }

    /// Register an observer for feed changes.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&FeedNotification) + Send + Sync + 'static,
    {
        self.notifier.subscribe(observer)
    }

    /// The notifier observers are registered on.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    async fn request_page(&self, page: u32, per_page: u32) -> Result<Vec<Photo>, ClientError> {
        let url = self.config.photos_url(page, per_page)?;
        let request =
            HttpRequest::new(Method::Get, url).with_header("Authorization", self.authorization());

        let response = self.http.send(request).await?;
        if !response.is_success() {
            return Err(ClientError::from_status(response.status));
        }
        Ok(decode_page(&response.body)?)
    }

    async fn send_like(&self, photo_id: &str, like: bool) -> Result<(), ClientError> {
        let token = self.tokens.get().ok_or(ClientError::Unauthenticated)?;
        let url = self.config.like_url(photo_id)?;
        let method = if like { Method::Post } else { Method::Delete };

        debug!("{} like for {}", method, photo_id);
        let request =
            HttpRequest::new(method, url).with_header("Authorization", format!("Bearer {token}"));
        let response = self.http.send(request).await?;
        if !response.is_success() {
            return Err(ClientError::from_status(response.status));
        }
        Ok(())
    }

    /// Bearer token when signed in, otherwise the public access key.
    fn authorization(&self) -> String {
        match self.tokens.get() {
            Some(token) => format!("Bearer {token}"),
            None => format!("Client-ID {}", self.config.access_key),
        }
    }

    fn dispatch(&self, actions: Vec<Action>, snapshot: FeedSnapshot) {
        for action in actions {
            if let Action::EmitEvent(event) = action {
                self.notifier.publish(&FeedNotification {
                    event,
                    snapshot: snapshot.clone(),
                });
            }
        }
    }
}

/// Clears the loading flag if a fetch future is dropped mid-request.
///
/// Only the request identified by `ticket` is released; a newer fetch
/// started after a reset is left alone.
struct LoadingGuard {
    state: Arc<Mutex<FeedState>>,
    page: u32,
    ticket: FetchTicket,
    armed: bool,
}

impl LoadingGuard {
    fn new(state: Arc<Mutex<FeedState>>, page: u32, ticket: FetchTicket) -> Self {
        Self {
            state,
            page,
            ticket,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        debug!("Fetch of page {} abandoned", self.page);
        match self.state.try_lock() {
            Ok(mut state) => {
                state.on_event(Event::PageFailed { ticket });
            }
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    let state = Arc::clone(&self.state);
                    runtime.spawn(async move {
                        state.lock().await.on_event(Event::PageFailed { ticket });
                    });
                }
                Err(_) => warn!(
                    "Abandoned fetch of page {} could not release the loading flag: \
                     feed state is locked and no runtime is available",
                    self.page
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;
    use crate::transport::{HttpError, MockHttpClient};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    type Feed = FeedSynchronizer<MockHttpClient, MemoryTokenStore>;

    fn setup_with(tokens: MemoryTokenStore) -> (Arc<Feed>, MockHttpClient, MemoryTokenStore) {
        let http = MockHttpClient::new();
        let config = Arc::new(FeedConfig::new("app-key", "app-secret", "imagefeed://auth"));
        let feed = FeedSynchronizer::new(config, Arc::new(http.clone()), Arc::new(tokens.clone()));
        (Arc::new(feed), http, tokens)
    }

    fn setup() -> (Arc<Feed>, MockHttpClient, MemoryTokenStore) {
        setup_with(MemoryTokenStore::with_token("tok1"))
    }

    fn page_body(ids: &[&str]) -> Vec<u8> {
        let records: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "created_at": "2016-05-03T11:00:28-04:00",
                    "width": 4000,
                    "height": 3000,
                    "liked_by_user": false,
                    "description": null,
                    "urls": {
                        "thumb": format!("https://images.example/{id}?w=200"),
                        "full": format!("https://images.example/{id}")
                    }
                })
            })
            .collect();
        serde_json::to_vec(&records).unwrap()
    }

    fn ids(count: usize, prefix: &str) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}{i}")).collect()
    }

    fn as_refs(ids: &[String]) -> Vec<&str> {
        ids.iter().map(String::as_str).collect()
    }

    fn record(feed: &Feed) -> (Subscription, Arc<StdMutex<Vec<FeedNotification>>>) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sub = {
            let seen = Arc::clone(&seen);
            feed.subscribe(move |n| seen.lock().unwrap().push(n.clone()))
        };
        (sub, seen)
    }

    async fn wait_for_requests(http: &MockHttpClient, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while http.request_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("requests were not sent in time");
    }

    // ===========================================
    // Page fetching
    // ===========================================

    #[tokio::test]
    async fn first_page_loads_ten_photos() {
        let (feed, http, _tokens) = setup();
        let page = ids(10, "p");
        http.queue_response(200, page_body(&as_refs(&page)));

        let outcome = feed.fetch_next_page().await;

        assert_eq!(outcome, FetchOutcome::Appended { page: 1, count: 10, received: 10 });
        assert_eq!(feed.last_loaded_page().await, Some(1));
        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot.photos[0].id, "p0");
        assert!(snapshot.photos[0].created_at.is_some());
        assert!(!feed.is_loading().await);
    }

    #[tokio::test]
    async fn successive_pages_append_in_order() {
        let (feed, http, _tokens) = setup();
        let first = ids(10, "a");
        let second = ids(7, "b");
        http.queue_response(200, page_body(&as_refs(&first)));
        http.queue_response(200, page_body(&as_refs(&second)));

        feed.fetch_next_page().await;
        let outcome = feed.fetch_next_page().await;

        assert_eq!(outcome, FetchOutcome::Appended { page: 2, count: 7, received: 7 });
        assert_eq!(feed.last_loaded_page().await, Some(2));
        let got: Vec<String> = feed
            .snapshot()
            .await
            .photos
            .into_iter()
            .map(|p| p.id)
            .collect();
        let expected: Vec<String> = first.into_iter().chain(second).collect();
        assert_eq!(got, expected);

        let requests = http.requests();
        assert_eq!(requests[0].query_param("page").as_deref(), Some("1"));
        assert_eq!(requests[1].query_param("page").as_deref(), Some("2"));
        assert_eq!(requests[1].query_param("per_page").as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn fetch_while_loading_is_skipped() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["a", "b"]));
        http.hold();

        let first = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 1).await;
        assert!(feed.is_loading().await);

        assert_eq!(feed.fetch_next_page().await, FetchOutcome::Skipped);
        assert_eq!(http.request_count(), 1);

        http.release(1);
        assert_eq!(
            first.await.unwrap(),
            FetchOutcome::Appended { page: 1, count: 2, received: 2 }
        );
        assert!(!feed.is_loading().await);
    }

    #[tokio::test]
    async fn empty_page_still_advances() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, b"[]".to_vec());

        assert_eq!(
            feed.fetch_next_page().await,
            FetchOutcome::Appended { page: 1, count: 0, received: 0 }
        );
        assert_eq!(feed.last_loaded_page().await, Some(1));
    }

    #[tokio::test]
    async fn page_of_known_photos_reports_received_records() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["a", "b"]));
        http.queue_response(200, page_body(&["b", "a"]));

        feed.fetch_next_page().await;
        let outcome = feed.fetch_next_page().await;

        assert_eq!(
            outcome,
            FetchOutcome::Appended {
                page: 2,
                count: 0,
                received: 2
            }
        );
        assert_eq!(feed.last_loaded_page().await, Some(2));
        assert_eq!(feed.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn uses_bearer_token_when_signed_in() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, b"[]".to_vec());

        feed.fetch_next_page().await;

        let request = http.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.path(), "/photos");
        assert_eq!(request.header("authorization"), Some("Bearer tok1"));
    }

    #[tokio::test]
    async fn uses_client_id_when_anonymous() {
        let (feed, http, _tokens) = setup_with(MemoryTokenStore::new());
        http.queue_response(200, b"[]".to_vec());

        feed.fetch_next_page().await;

        assert_eq!(
            http.last_request().unwrap().header("Authorization"),
            Some("Client-ID app-key")
        );
    }

    #[tokio::test]
    async fn unauthorized_fetch_keeps_token_and_state() {
        let (feed, http, tokens) = setup();
        http.queue_response(401, br#"{"errors":["OAuth error"]}"#.to_vec());
        let (_sub, seen) = record(&feed);

        assert_eq!(feed.fetch_next_page().await, FetchOutcome::Failed);

        assert_eq!(tokens.get().as_deref(), Some("tok1"));
        assert_eq!(feed.last_loaded_page().await, None);
        assert!(!feed.is_loading().await);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_leave_feed_unchanged() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["a"]));
        http.queue_error(HttpError::Timeout);
        http.queue_response(503, b"".to_vec());
        http.queue_response(200, b"{\"not\":\"an array\"}".to_vec());

        feed.fetch_next_page().await;
        for _ in 0..3 {
            assert_eq!(feed.fetch_next_page().await, FetchOutcome::Failed);
        }

        assert_eq!(feed.last_loaded_page().await, Some(1));
        assert_eq!(feed.snapshot().await.len(), 1);
        assert!(!feed.is_loading().await);
        // Every retry asks for the same page.
        let pages: Vec<Option<String>> = http
            .requests()
            .iter()
            .map(|r| r.query_param("page"))
            .collect();
        assert_eq!(
            pages[1..],
            [Some("2".to_string()), Some("2".to_string()), Some("2".to_string())]
        );
    }

    #[tokio::test]
    async fn dropped_fetch_releases_loading_flag() {
        let (feed, http, _tokens) = setup();
        http.hold();

        let pending = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 1).await;
        pending.abort();
        let _ = pending.await;

        assert!(!feed.is_loading().await);

        http.reset();
        http.queue_response(200, page_body(&["a"]));
        assert_eq!(
            feed.fetch_next_page().await,
            FetchOutcome::Appended { page: 1, count: 1, received: 1 }
        );
    }

    #[tokio::test]
    async fn page_completing_after_reset_is_discarded() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["a"]));
        http.hold();

        let pending = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 1).await;
        feed.reset().await;
        http.release(1);

        assert_eq!(pending.await.unwrap(), FetchOutcome::Skipped);
        assert!(feed.snapshot().await.is_empty());
        assert_eq!(feed.last_loaded_page().await, None);
    }

    #[tokio::test]
    async fn pre_reset_page_cannot_leak_into_refetch() {
        let (feed, http, tokens) = setup();
        http.queue_response(200, page_body(&["old-session"]));
        http.queue_response(200, page_body(&["new-session"]));
        http.hold();

        let stale = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 1).await;

        tokens.clear().unwrap();
        feed.reset().await;
        let fresh = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 2).await;
        assert_eq!(http.requests()[1].query_param("page").as_deref(), Some("1"));

        // The gate is fair: the pre-reset request completes first.
        http.release(1);
        assert_eq!(stale.await.unwrap(), FetchOutcome::Skipped);
        assert!(feed.snapshot().await.is_empty());
        assert!(feed.is_loading().await);
        assert_eq!(feed.fetch_next_page().await, FetchOutcome::Skipped);
        assert_eq!(http.request_count(), 2);

        http.release(1);
        assert_eq!(
            fresh.await.unwrap(),
            FetchOutcome::Appended { page: 1, count: 1, received: 1 }
        );
        let ids: Vec<String> = feed
            .snapshot()
            .await
            .photos
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["new-session".to_string()]);
        assert!(!feed.is_loading().await);
        assert_eq!(
            http.requests()[1].header("Authorization"),
            Some("Client-ID app-key")
        );
    }

    #[tokio::test]
    async fn dropping_pre_reset_fetch_keeps_refetch_loading() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["new-session"]));
        http.hold();

        let stale = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 1).await;
        feed.reset().await;
        let fresh = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 2).await;

        stale.abort();
        let _ = stale.await;
        assert!(feed.is_loading().await);
        assert_eq!(feed.fetch_next_page().await, FetchOutcome::Skipped);

        http.release(1);
        assert_eq!(
            fresh.await.unwrap(),
            FetchOutcome::Appended { page: 1, count: 1, received: 1 }
        );
    }

    fn loading_state() -> (Arc<Mutex<FeedState>>, FetchTicket) {
        let mut state = FeedState::new(10);
        let ticket = match state.on_event(Event::FetchRequested).as_slice() {
            [Action::RequestPage { ticket, .. }] => *ticket,
            other => panic!("unexpected actions {:?}", other),
        };
        (Arc::new(Mutex::new(state)), ticket)
    }

    #[test]
    fn abandoned_guard_releases_unlocked_state() {
        let (state, ticket) = loading_state();
        drop(LoadingGuard::new(Arc::clone(&state), 1, ticket));
        assert!(!state.try_lock().unwrap().is_loading());
    }

    #[test]
    fn abandoned_guard_without_runtime_leaves_locked_state_alone() {
        let (state, ticket) = loading_state();
        let held = state.try_lock().unwrap();

        // Locked and no runtime to defer to: the drop only logs.
        drop(LoadingGuard::new(Arc::clone(&state), 1, ticket));

        assert!(held.is_loading());
        drop(held);
        assert!(state.try_lock().unwrap().is_loading());
    }

    #[tokio::test]
    async fn zero_sized_photo_fails_page() {
        let (feed, http, _tokens) = setup();
        http.queue_response(
            200,
            br#"[{"id":"a","width":0,"height":300,"liked_by_user":false,
                 "urls":{"thumb":"t","full":"f"}}]"#
                .to_vec(),
        );

        assert_eq!(feed.fetch_next_page().await, FetchOutcome::Failed);
        assert!(feed.snapshot().await.is_empty());
        assert!(!feed.is_loading().await);
        assert_eq!(feed.last_loaded_page().await, None);
    }

    // ===========================================
    // Notifications
    // ===========================================

    #[tokio::test]
    async fn page_load_notifies_once_with_new_photos() {
        let (feed, http, _tokens) = setup();
        let (_sub, seen) = record(&feed);
        http.queue_response(200, page_body(&["a", "b"]));
        http.queue_response(200, page_body(&["c"]));

        feed.fetch_next_page().await;
        feed.fetch_next_page().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        match &seen[1].event {
            FeedEvent::PagesAppended { photos } => {
                assert_eq!(photos.len(), 1);
                assert_eq!(photos[0].id, "c");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(seen[1].snapshot.len(), 3);
        assert_eq!(seen[1].snapshot.last_loaded_page, Some(2));
        assert!(!seen[1].snapshot.is_loading);
    }

    #[tokio::test]
    async fn dropped_subscription_stops_delivery() {
        let (feed, http, _tokens) = setup();
        let (sub, seen) = record(&feed);
        http.queue_response(200, page_body(&["a"]));

        drop(sub);
        feed.fetch_next_page().await;

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(feed.notifier().observer_count(), 0);
    }

    // ===========================================
    // Likes
    // ===========================================

    #[tokio::test]
    async fn like_marks_photo_and_notifies_once() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["abc123"]));
        feed.fetch_next_page().await;
        let (_sub, seen) = record(&feed);
        http.queue_response(201, br#"{"photo":{"id":"abc123"}}"#.to_vec());

        feed.toggle_like("abc123", true).await.unwrap();

        assert!(feed.photo("abc123").await.unwrap().is_liked);
        let request = http.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.path(), "/photos/abc123/like");
        assert_eq!(request.header("Authorization"), Some("Bearer tok1"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event, FeedEvent::StateChanged);
        assert!(seen[0].snapshot.photo("abc123").unwrap().is_liked);
    }

    #[tokio::test]
    async fn like_then_unlike_ends_unliked() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["abc123"]));
        feed.fetch_next_page().await;
        http.queue_response(201, b"{}".to_vec());
        http.queue_response(200, b"{}".to_vec());

        feed.toggle_like("abc123", true).await.unwrap();
        feed.toggle_like("abc123", false).await.unwrap();

        assert!(!feed.photo("abc123").await.unwrap().is_liked);
        assert_eq!(http.last_request().unwrap().method, Method::Delete);
    }

    #[tokio::test]
    async fn like_unknown_photo_is_noop() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["a"]));
        feed.fetch_next_page().await;
        http.queue_response(201, b"{}".to_vec());
        let before = feed.snapshot().await;

        feed.toggle_like("missing", true).await.unwrap();

        assert_eq!(feed.snapshot().await, before);
        assert_eq!(feed.photo("missing").await, None);
    }

    #[tokio::test]
    async fn unauthorized_like_leaves_photo_unchanged() {
        let (feed, http, tokens) = setup();
        http.queue_response(200, page_body(&["abc123"]));
        feed.fetch_next_page().await;
        let (_sub, seen) = record(&feed);
        http.queue_response(401, b"".to_vec());

        let err = feed.toggle_like("abc123", true).await.unwrap_err();

        assert!(matches!(err, ClientError::Unauthorized));
        assert!(!feed.photo("abc123").await.unwrap().is_liked);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(tokens.get().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn like_other_failures_map_to_errors() {
        let (feed, http, _tokens) = setup();
        http.queue_response(404, b"".to_vec());
        http.queue_error(HttpError::ConnectionFailed("offline".into()));

        assert!(matches!(
            feed.toggle_like("a", true).await,
            Err(ClientError::HttpStatus(404))
        ));
        assert!(matches!(
            feed.toggle_like("a", true).await,
            Err(ClientError::Transport(HttpError::ConnectionFailed(_)))
        ));
    }

    #[tokio::test]
    async fn like_without_token_sends_nothing() {
        let (feed, http, _tokens) = setup_with(MemoryTokenStore::new());

        let err = feed.toggle_like("abc123", true).await.unwrap_err();

        assert!(matches!(err, ClientError::Unauthenticated));
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn like_runs_while_page_is_loading() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["abc123"]));
        feed.fetch_next_page().await;

        // The held page request takes the first queued response.
        http.queue_response(200, page_body(&["b"]));
        http.queue_response(201, b"{}".to_vec());
        http.hold();
        let pending = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.fetch_next_page().await })
        };
        wait_for_requests(&http, 2).await;

        let like = {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move { feed.toggle_like("abc123", true).await })
        };
        wait_for_requests(&http, 3).await;

        // The gate is fair: the page request was waiting first.
        http.release(1);
        assert_eq!(
            pending.await.unwrap(),
            FetchOutcome::Appended { page: 2, count: 1, received: 1 }
        );
        http.release(1);
        like.await.unwrap().unwrap();
        assert!(feed.photo("abc123").await.unwrap().is_liked);
    }

    // ===========================================
    // Reset
    // ===========================================

    #[tokio::test]
    async fn reset_clears_feed_and_notifies() {
        let (feed, http, _tokens) = setup();
        http.queue_response(200, page_body(&["a", "b"]));
        feed.fetch_next_page().await;
        let (_sub, seen) = record(&feed);

        feed.reset().await;

        assert!(feed.snapshot().await.is_empty());
        assert_eq!(feed.last_loaded_page().await, None);
        assert_eq!(seen.lock().unwrap()[0].event, FeedEvent::StateChanged);

        http.queue_response(200, page_body(&["c"]));
        feed.fetch_next_page().await;
        assert_eq!(http.last_request().unwrap().query_param("page").as_deref(), Some("1"));
    }
}
