//! Scraping-proxy fetcher
//!
//! This module handles every HTTP request the harvester makes:
//! - Building the HTTP client
//! - Submitting Indeed search URLs to the rendering proxy
//! - Classifying failures into timeouts, upstream statuses and network errors
//!
//! There is no retry loop; the only resilience lever is the timeout.

use crate::config::{ProxyConfig, ProxyCredentials};
use crate::url::{build_search_url, search_base};
use crate::{FetchError, HarvestError};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Connect timeout ceiling; the total request timeout still applies
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a realtime proxy query
#[derive(Debug, Serialize)]
struct ProxyQuery<'a> {
    source: &'static str,
    url: &'a str,
    geo_location: &'a str,
    render: &'static str,
}

/// Authenticated handle on the scraping proxy
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    endpoint: Url,
    credentials: ProxyCredentials,
}

impl ProxyClient {
    /// Creates a proxy client for the configured endpoint
    ///
    /// # Arguments
    ///
    /// * `config` - Proxy endpoint settings
    /// * `credentials` - Basic-auth credentials from the environment
    pub fn new(config: &ProxyConfig, credentials: ProxyCredentials) -> Result<Self, HarvestError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = build_http_client()?;
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the proxy to render `target` and returns the page HTML
    ///
    /// # Arguments
    ///
    /// * `target` - The Indeed URL to render
    /// * `country` - Geo location the proxy should browse from
    /// * `timeout` - Total time allowed for the request and the body
    pub async fn render(
        &self,
        target: &Url,
        country: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let query = ProxyQuery {
            source: "universal",
            url: target.as_str(),
            geo_location: country,
            render: "html",
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .timeout(timeout)
            .json(&query)
            .send()
            .await
            .map_err(|e| classify_error(e, target))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(e, target))
    }
}

/// Builds the HTTP client used to talk to the proxy
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page of Indeed search results through the proxy
///
/// # Arguments
///
/// * `proxy` - The authenticated proxy client
/// * `query` - Free-text search phrase
/// * `country` - Two-letter country code
/// * `page_index` - Zero-based result page
/// * `timeout` - Total time allowed for the proxy to answer
///
/// # Returns
///
/// * `Ok(String)` - Raw HTML of the rendered results page
/// * `Err(FetchError)` - Timeout, non-success proxy status or network failure
pub async fn fetch_page(
    proxy: &ProxyClient,
    query: &str,
    country: &str,
    page_index: u32,
    timeout: Duration,
) -> Result<String, FetchError> {
    let target = build_search_url(query, country, page_index).map_err(|e| FetchError::Network {
        url: search_base(country),
        message: e.to_string(),
    })?;

    tracing::debug!(
        "Requesting {} via {} (timeout {:?})",
        target,
        proxy.endpoint(),
        timeout
    );

    proxy.render(&target, country, timeout).await
}

fn classify_error(error: reqwest::Error, target: &Url) -> FetchError {
    let url = target.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if let Some(status) = error.status() {
        FetchError::Upstream {
            url,
            status: status.as_u16(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url,
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url,
            message: error.to_string(),
        }
    }
}
