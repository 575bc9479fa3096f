//! Facilities for querying JSON metadata services.
//!
//! Source adapters talk to their backend through the [`JsonFetcher`] trait so that the
//! network layer can be replaced with canned responses in tests. [`HttpFetcher`] is the
//! production implementation, a thin wrapper over a blocking `reqwest` client with a
//! bounded per-request timeout.

use crate::errors::ResolveError;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;

/// Options that control how backend requests are issued.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Network timeout applied to each individual HTTP request.
    pub timeout: Duration,
    /// `Accept` header sent with every request.
    pub accept: &'static str,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept: "application/json",
        }
    }
}

/// Retrieves a JSON document from a URL.
pub trait JsonFetcher: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value, ResolveError>;
}

/// [`JsonFetcher`] backed by a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    accept: &'static str,
}

impl HttpFetcher {
    pub fn new(opts: &FetchOptions) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(opts.timeout).build()?;
        Ok(Self {
            client,
            accept: opts.accept,
        })
    }
}

fn request_error(url: &str, err: reqwest::Error) -> ResolveError {
    ResolveError::BackendUnavailable {
        url: url.to_string(),
        reason: err.to_string(),
        timed_out: err.is_timeout(),
    }
}

impl JsonFetcher for HttpFetcher {
    fn get_json(&self, url: &str) -> Result<Value, ResolveError> {
        debug!("Querying backend: {}", url);
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, self.accept)
            .send()
            .map_err(|e| request_error(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Backend answered {} for {}", status, url);
            return Err(ResolveError::backend(url, format!("HTTP {}", status)));
        }
        let bytes = resp.bytes().map_err(|e| request_error(url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Backend returned malformed JSON for {}: {}", url, e);
            ResolveError::backend(url, format!("malformed JSON: {}", e))
        })
    }
}
