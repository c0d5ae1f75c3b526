//! Network access for the cache manager.
//!
//! Strategies only see the `Fetch` trait, so tests can script the network
//! and the application can plug in `HttpFetcher`.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client};
use thiserror::Error;
use tracing::debug;

use super::request::{Request, RequestMode};
use super::response::CachedResponse;

/// HTTP request timeout in seconds.
/// 15s keeps a stalled network from holding a view's loading indicator forever.
const REQUEST_TIMEOUT_SECS: u64 = 15;

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// A request that produced no response at all. HTTP error statuses are
/// responses, not fetch errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network unavailable")]
    Offline,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Something that can turn a request into a response snapshot.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<CachedResponse, FetchError>> + Send;
}

/// `Fetch` over HTTP.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Share an existing client's connection pool.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, FetchError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        if request.mode == RequestMode::Navigate {
            builder = builder
                .header(header::ACCEPT, "text/html")
                .header("sec-fetch-mode", "navigate");
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "Fetched");
        Ok(CachedResponse {
            status,
            headers,
            body,
        })
    }
}
