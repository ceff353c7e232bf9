// src/fetch/http.rs
// =============================================================================
// This module performs the one HTTP GET each crawl cycle needs.
//
// Key functionality:
// - One request per call, no retries
// - Returns status, headers and body for ANY status code; the scheduler
//   decides what a 404 or a 500 means
// - Only network-level failures (DNS, refused connection, timeout) are errors
// - Redirects are followed only while they stay on the seed's origin and
//   out of the blacklist
//
// The `Fetch` trait is the seam between the scheduler and the network, so
// the crawl can be driven by something other than reqwest (tests use an
// in-memory site).
//
// Rust concepts:
// - Traits with `impl Future` returns: async methods the scheduler can call
//   from spawned tasks (hence the `Send` bound)
// - thiserror: Derives Display/Error for our error enum
// =============================================================================

use reqwest::redirect::{Attempt, Policy};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::MirrorConfig;
use crate::crawl::is_blacklisted;

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built (bad TLS setup, bad header value...)
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request did not finish within the configured timeout
    #[error("timed out fetching {0}")]
    Timeout(String),
    /// DNS, connection or protocol failure
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// A fetched page, whatever its status code
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Page {
    // Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    // True when the content-type says text/html (or XHTML)
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|value| {
                let value = value.to_ascii_lowercase();
                value.contains("text/html") || value.contains("application/xhtml+xml")
            })
            .unwrap_or(false)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

// The transport seam: one GET, one answer
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

// reqwest-backed fetcher used by the real crawl
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the client once; it's reused by every worker (connection pooling)
    pub fn new(config: &MirrorConfig, seed: &Url) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(contained_redirects(seed, config.blacklist.clone(), config.max_redirects));

        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?
            .to_vec();

        Ok(Page {
            status,
            headers,
            body,
        })
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

// Follow redirects transparently, but only where the crawl itself may go:
// never off the seed's origin and never into a blacklisted URL.
//
// When a redirect would break either rule, we stop and hand the 3xx response
// itself back to the caller instead of fetching the target.
fn contained_redirects(seed: &Url, blacklist: Vec<String>, max_redirects: usize) -> Policy {
    let origin = seed.origin();
    Policy::custom(move |attempt: Attempt| {
        if attempt.url().origin() != origin || is_blacklisted(attempt.url().as_str(), &blacklist) {
            attempt.stop()
        } else if attempt.previous().len() > max_redirects {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not treat 404 as an error here?
//    - A 404 is a perfectly good HTTP answer; the scheduler records it in the
//      skipped set so the URL is never requested again this run
//    - Only failures to get ANY answer become FetchError
//
// 2. Why `async fn` in the impl when the trait says `impl Future + Send`?
//    - The trait promises callers a Send future so it can run inside
//      tokio::spawn; the compiler checks our async fn keeps that promise
//
// 3. Why Vec<u8> for the body?
//    - Pages are written to disk byte-for-byte; only HTML is decoded to text
// -----------------------------------------------------------------------------
