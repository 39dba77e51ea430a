//! Wire transport.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::{ApiRequest, RequestError, Response};

/// Sends a fully resolved request and returns the raw response.
///
/// Non-2xx statuses are not errors at this level; the client inspects them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<Response, RequestError>;
}

/// Transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport. No timeout is applied unless one is given.
    pub fn new(timeout: Option<Duration>) -> Result<Self, RequestError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RequestError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_error(e: reqwest::Error) -> RequestError {
    if e.is_timeout() {
        RequestError::Timeout
    } else if e.is_builder() {
        RequestError::InvalidUrl(e.to_string())
    } else {
        RequestError::Network(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Response, RequestError> {
        trace!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(request.method.to_http(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder.send().await.map_err(map_error)?;
        let status = resp.status().as_u16();
        let headers: HashMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = resp.bytes().await.map_err(map_error)?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}
