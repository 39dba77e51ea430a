//! Scripted transport for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{ApiRequest, RequestError, Response, Transport};

type Handler = Box<dyn Fn(&ApiRequest) -> Result<Response, RequestError> + Send + Sync>;

/// Transport that answers from a closure and records every request.
pub struct MockTransport {
    handler: Handler,
    delays: Vec<(String, Duration)>,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create a transport answering with `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Response, RequestError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            delays: Vec::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Delay responses for URLs ending in `suffix`.
    pub fn with_delay(mut self, suffix: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((suffix.into(), delay));
        self
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of requests sent to URLs ending in `suffix`.
    pub fn calls(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Response, RequestError> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let delay = self
            .delays
            .iter()
            .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        (self.handler)(request)
    }
}
