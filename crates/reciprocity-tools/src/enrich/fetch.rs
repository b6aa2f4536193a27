// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Page fetching behind a trait, so the crawl can run against fixtures.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// A page could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{0} is not available")]
    NotFound(String),
    #[error("HTTP client could not be built: {0}")]
    Client(#[source] reqwest::Error),
}

/// Fetches a page body as text.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// [`Fetcher`] over HTTP(S) with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Client with `timeout` applied to connect and read.
    ///
    /// # Errors
    ///
    /// [`FetchError::Client`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("reciprocity-enrich/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        tracing::info!(%url, "fetching");
        let http_error = |source| FetchError::Http { url: url.to_string(), source };

        let response = self.client.get(url.clone()).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        // Decodes with the charset the server declares, replacing invalid
        // sequences.
        response.text().await.map_err(http_error)
    }
}

/// [`Fetcher`] serving fixed bodies keyed by absolute URL.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_owned(), body.to_owned());
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
