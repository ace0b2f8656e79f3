//! Blocking HTTP fetcher
//!
//! The `Fetch` trait is the seam between the clients and the network; tests
//! substitute in-memory fakes for it. The real implementation wraps a
//! blocking reqwest client and treats any non-success status as an error.

use thiserror::Error;

/// Errors that can occur while fetching a remote resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// A blocking GET against a remote endpoint, returning the response body.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Real fetcher backed by `reqwest::blocking::Client`.
///
/// No request timeout is configured; the client's defaults apply and a hang
/// blocks the sole thread of control.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| FetchError::Request(e.to_string()))
    }
}
