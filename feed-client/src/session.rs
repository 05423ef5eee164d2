//! Session - owns the exchanger and feed for one signed-in user.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::FeedConfig;
use crate::error::ClientError;
use crate::feed::FeedSynchronizer;
use crate::oauth::OAuthExchanger;
use crate::token_store::{FileTokenStore, TokenStore};
use crate::transport::{HttpClient, ReqwestClient};

/// The exchanger and feed wired to one HTTP client and token store.
pub struct Session<H, S> {
    config: Arc<FeedConfig>,
    tokens: Arc<S>,
    exchanger: OAuthExchanger<H, S>,
    feed: FeedSynchronizer<H, S>,
}

impl<H, S> Session<H, S>
where
    H: HttpClient + 'static,
    S: TokenStore + 'static,
{
    /// Build a session from its parts.
    pub fn new(config: FeedConfig, http: H, tokens: S) -> Self {
        let config = Arc::new(config);
        let http = Arc::new(http);
        let tokens = Arc::new(tokens);
        Self {
            exchanger: OAuthExchanger::new(
                Arc::clone(&config),
                Arc::clone(&http),
                Arc::clone(&tokens),
            ),
            feed: FeedSynchronizer::new(Arc::clone(&config), http, Arc::clone(&tokens)),
            config,
            tokens,
        }
    }

    /// Token exchanger.
    pub fn exchanger(&self) -> &OAuthExchanger<H, S> {
        &self.exchanger
    }

    /// Photo feed.
    pub fn feed(&self) -> &FeedSynchronizer<H, S> {
        &self.feed
    }

    /// Active configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Whether a token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }

    /// Exchange an authorization code and store the resulting token.
    pub async fn login(&self, code: &str) -> Result<(), ClientError> {
        self.exchanger.exchange(code).await.map(|_| ())
    }

    /// Forget the stored token and everything loaded with it.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear()?;
        self.feed.reset().await;
        info!("Logged out");
        Ok(())
    }
}

impl Session<ReqwestClient, FileTokenStore> {
    /// Session over reqwest with the token kept in `data_dir`.
    pub fn open(config: FeedConfig, data_dir: &Path) -> Result<Self, ClientError> {
        let http = ReqwestClient::new(config.request_timeout())?;
        Ok(Self::new(config, http, FileTokenStore::in_dir(data_dir)))
    }
}
