//! HTTP client for the ISC AMP portal.

use std::time::Duration;

use url::Url;

use crate::{query::AdvancedSearchQuery, user_agent::get_user_agent, Error};

const DEFAULT_BASE_URL: &str = "https://isc.onlinemga.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the ISC AMP portal.
///
/// Owns the cookie session established by [`Client::authenticate`]: the
/// portal keeps login state in cookies, so one client instance is one portal
/// session. Sends browser-like headers and a randomized user agent. The
/// underlying connection pool and cookie store are released on drop.
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production portal.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Logs in to the portal.
    ///
    /// The portal redirects away from the login page on success and
    /// re-renders the form on bad credentials, so the landing URL is the
    /// success signal.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), Error> {
        let url = format!("{}/amp/login", self.base_url);
        let resp = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Login request failed: {}", e);
                Error::RequestFailed
            })?;

        if !resp.status().is_success() {
            tracing::error!("Login returned status {}", resp.status());
            return Err(Error::AuthFailed);
        }
        if resp.url().path().contains("login") {
            tracing::error!("Portal bounced back to the login page; credentials rejected");
            return Err(Error::AuthFailed);
        }
        Ok(())
    }

    /// Fetches the advanced-search results page for the given query.
    pub async fn search_results(&self, query: &AdvancedSearchQuery) -> Result<String, Error> {
        let url = self.parse_url(&format!("{}/amp/search/advancedsearch", self.base_url))?;
        self.fetch_html(query.add_to_url(&url)).await
    }

    /// Fetches the detail page for an application id.
    pub async fn detail_page(&self, app_id: &str) -> Result<String, Error> {
        let url = self.parse_url(&format!("{}/amp/detail/view/{}", self.base_url, app_id))?;
        self.fetch_html(url).await
    }

    fn parse_url(&self, raw: &str) -> Result<Url, Error> {
        Url::parse(raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })
    }

    async fn fetch_html(&self, url: Url) -> Result<String, Error> {
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .header("upgrade-insecure-requests", "1")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}
