//! Mock HTTP client for testing.
//!
//! Allows queueing responses and capturing sent requests for verification.

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Mock HTTP client for testing.
///
/// Responses are returned in the order they were queued. Clones share state,
/// so a test can keep one handle while the code under test owns another.
///
/// [`hold`](Self::hold) keeps every subsequent request in flight until
/// [`release`](Self::release) lets it through, which is how tests observe
/// behaviour while a request is pending.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    inner: Arc<Mutex<MockHttpInner>>,
}

#[derive(Debug, Default)]
struct MockHttpInner {
    requests: Vec<HttpRequest>,
    responses: VecDeque<Result<HttpResponse, HttpError>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockHttpClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn queue_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure for the next request.
    pub fn queue_error(&self, error: HttpError) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(Err(error));
    }

    /// Get all requests that were sent.
    pub fn requests(&self) -> Vec<HttpRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Get the last request that was sent.
    pub fn last_request(&self) -> Option<HttpRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.last().cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.requests.len()
    }

    /// Keep subsequent requests in flight until released.
    pub fn hold(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held requests complete.
    pub fn release(&self, count: usize) {
        let inner = self.inner.lock().unwrap();
        if let Some(gate) = &inner.gate {
            gate.add_permits(count);
        }
    }

    /// Clear all state (requests, queue, gate).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockHttpInner::default();
    }
}

impl Clone for MockHttpClient {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let gate = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(request);
            inner.gate.clone()
        };

        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::ConnectionFailed("no response queued".into())))
    }
}
