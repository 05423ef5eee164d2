//! OAuth authorization-code exchange.
//!
//! [`OAuthExchanger`] trades an authorization code for an access token and
//! writes the token to a [`TokenStore`].
//!
//! # Concurrency
//!
//! Single-flight rules come from [`ExchangeState`]:
//!
//! - the same code while it is in flight is rejected with
//!   [`ClientError::DuplicateRequest`] before any request is sent
//! - a different code aborts the pending exchange, which then resolves to
//!   [`ClientError::Cancelled`]
//!
//! Each exchange runs on its own tokio task. The task commits its own result
//! (state cleanup and token write), so dropping the future returned by
//! [`OAuthExchanger::exchange`] does not leave a code stuck in flight.

use std::sync::Arc;

use imagefeed_core::{ExchangeState, Ticket};
use imagefeed_types::TokenResponse;
use reqwest::Url;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::ClientError;
use crate::token_store::TokenStore;
use crate::transport::{HttpClient, HttpRequest, Method};

#[derive(Default)]
struct Pending {
    state: ExchangeState,
    task: Option<(Ticket, AbortHandle)>,
}

/// Exchanges authorization codes for access tokens.
pub struct OAuthExchanger<H, S> {
    http: Arc<H>,
    tokens: Arc<S>,
    config: Arc<FeedConfig>,
    pending: Arc<Mutex<Pending>>,
}

impl<H, S> OAuthExchanger<H, S>
where
    H: HttpClient + 'static,
    S: TokenStore + 'static,
{
    /// Create an exchanger over a shared HTTP client and token store.
    pub fn new(config: Arc<FeedConfig>, http: Arc<H>, tokens: Arc<S>) -> Self {
        Self {
            http,
            tokens,
            config,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Exchange `code` for an access token.
    ///
    /// On success the token has already been written to the token store.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidCode`] if `code` is blank
    /// - [`ClientError::DuplicateRequest`] if `code` is already in flight
    /// - [`ClientError::Cancelled`] if a different code superseded this one
    /// - transport, status, decode or token-store errors otherwise
    pub async fn exchange(&self, code: &str) -> Result<String, ClientError> {
        let handle = {
            let mut pending = self.pending.lock().await;
            let begin = pending.state.begin(code)?;

            if let Some(superseded) = begin.superseded {
                if let Some((ticket, abort)) = pending.task.take() {
                    if ticket == superseded {
                        debug!("Cancelling superseded token exchange");
                        abort.abort();
                    }
                }
            }

            let url = match self.config.token_request_url(code) {
                Ok(url) => url,
                Err(e) => {
                    pending.state.finish(begin.ticket);
                    return Err(e);
                }
            };

            let handle = tokio::spawn(run_exchange(
                Arc::clone(&self.http),
                Arc::clone(&self.tokens),
                Arc::clone(&self.pending),
                begin.ticket,
                url,
            ));
            pending.task = Some((begin.ticket, handle.abort_handle()));
            handle
        };

        let result = match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ClientError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        };

        match &result {
            Ok(_) => {}
            Err(ClientError::Cancelled) => debug!("Token exchange cancelled"),
            Err(e) => warn!("Token exchange failed: {}", e),
        }
        result
    }

    /// Whether an exchange is currently in flight.
    pub async fn is_in_flight(&self) -> bool {
        self.pending.lock().await.state.is_in_flight()
    }
}

async fn run_exchange<H, S>(
    http: Arc<H>,
    tokens: Arc<S>,
    pending: Arc<Mutex<Pending>>,
    ticket: Ticket,
    url: Url,
) -> Result<String, ClientError>
where
    H: HttpClient,
    S: TokenStore,
{
    debug!("POST {}", url.path());
    let sent = http.send(HttpRequest::new(Method::Post, url)).await;

    // Held through the token write so a newer exchange cannot interleave.
    let mut pending = pending.lock().await;
    if !pending.state.finish(ticket) {
        return Err(ClientError::Cancelled);
    }
    if matches!(&pending.task, Some((current, _)) if *current == ticket) {
        pending.task = None;
    }

    let response = sent?;
    if !response.is_success() {
        return Err(ClientError::from_status(response.status));
    }
    let token = TokenResponse::from_bytes(&response.body)?;
    tokens.set(&token.access_token)?;

    info!(
        "Token exchange completed (user: {})",
        token.username.as_deref().unwrap_or("unknown")
    );
    Ok(token.access_token)
}
