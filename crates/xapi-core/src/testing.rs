//! In-memory transport for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::transport::{LrsRequest, LrsResponse, Method, Transport};

type Responder = Box<dyn Fn(&LrsRequest) -> Result<LrsResponse, TransportError> + Send + Sync>;

/// Records every request and answers from a closure.
///
/// Yields to the scheduler once per request so concurrent callers interleave
/// the way they would against a real network.
pub struct MockTransport {
    responder: Responder,
    requests: Mutex<Vec<LrsRequest>>,
}

impl MockTransport {
    pub fn responding<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&LrsRequest) -> Result<LrsResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LrsRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The single recorded request; panics if there were more or fewer.
    pub fn only_request(&self) -> LrsRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {:?}", requests);
        requests.into_iter().next().unwrap()
    }

    /// Number of requests with this method whose URL ends with `suffix`.
    pub fn count(&self, method: Method, suffix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: LrsRequest) -> Result<LrsResponse, TransportError> {
        tokio::task::yield_now().await;
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}
