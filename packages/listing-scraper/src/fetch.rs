//! The HTTP seam: browser-disguised page fetches and JSON API calls.
//!
//! Listing sites block or degrade naive requests, so page fetches carry
//! a full browser-mimicking header set. Two disguises are available: the
//! desktop one for primary fetches and a mobile one for the retry pass
//! (mobile clients frequently get simpler, less bot-gated markup).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) \
AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which browser a page fetch pretends to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disguise {
    Desktop,
    Mobile,
}

impl Disguise {
    pub fn user_agent(&self) -> &'static str {
        match self {
            Disguise::Desktop => DESKTOP_USER_AGENT,
            Disguise::Mobile => MOBILE_USER_AGENT,
        }
    }
}

impl std::fmt::Display for Disguise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Disguise::Desktop => "desktop",
            Disguise::Mobile => "mobile",
        })
    }
}

/// Outbound HTTP, mockable for tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page body under a browser disguise.
    async fn fetch(&self, url: &str, disguise: Disguise) -> FetchResult<String>;

    /// Fetch a JSON endpoint with extra request headers.
    async fn fetch_json(&self, url: &str, headers: &[(&str, &str)]) -> FetchResult<Value>;
}

/// Production fetcher backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    fn page_headers(url: &str, disguise: Disguise) -> FetchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        // Same-origin referer; VRBO serves degraded pages without one,
        // other sites ignore it.
        if disguise == Disguise::Desktop {
            if let Some(origin) = origin_of(url) {
                if let Ok(value) = HeaderValue::from_str(&origin) {
                    headers.insert(REFERER, value);
                }
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, disguise: Disguise) -> FetchResult<String> {
        if Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }
        debug!(url = %url, disguise = %disguise, "fetching page");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, disguise.user_agent())
            .headers(Self::page_headers(url, disguise)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_json(&self, url: &str, headers: &[(&str, &str)]) -> FetchResult<Value> {
        debug!(url = %url, "fetching JSON endpoint");

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Scheme + host origin of a URL, when it has one.
fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{}", parsed.scheme(), host))
}
