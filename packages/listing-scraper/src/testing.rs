//! Testing utilities: a mock fetcher with canned bodies and failure
//! injection, plus small HTML fixture builders.
//!
//! Usable by applications testing against the scraper without real
//! network calls; the integration tests in this repository run entirely
//! on these.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FetchError, FetchResult};
use crate::fetch::{Disguise, Fetcher};

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    Page { url: String, disguise: Disguise },
    Json { url: String },
}

/// A fetcher serving canned responses.
///
/// Unknown URLs answer with HTTP 404; injected failures answer with 403,
/// which is what the real sites do when a disguise stops working.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<(String, Disguise), String>>>,
    json: Arc<RwLock<HashMap<String, Value>>>,
    page_failures: Arc<RwLock<HashSet<(String, Option<Disguise>)>>>,
    json_failures: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<FetchCall>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a page body under both disguises.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let html = html.into();
        {
            let mut pages = self.pages.write().unwrap();
            pages.insert((url.clone(), Disguise::Desktop), html.clone());
            pages.insert((url, Disguise::Mobile), html);
        }
        self
    }

    /// Serve a page body under the desktop disguise only.
    pub fn with_desktop_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert((url.into(), Disguise::Desktop), html.into());
        self
    }

    /// Serve a page body under the mobile disguise only.
    pub fn with_mobile_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert((url.into(), Disguise::Mobile), html.into());
        self
    }

    /// Serve a JSON body for an API endpoint.
    pub fn with_json(self, url: impl Into<String>, value: Value) -> Self {
        self.json.write().unwrap().insert(url.into(), value);
        self
    }

    /// Fail page fetches for a URL under every disguise.
    pub fn with_page_failure(self, url: impl Into<String>) -> Self {
        self.page_failures
            .write()
            .unwrap()
            .insert((url.into(), None));
        self
    }

    /// Fail page fetches for a URL under one disguise only.
    pub fn with_disguise_failure(self, url: impl Into<String>, disguise: Disguise) -> Self {
        self.page_failures
            .write()
            .unwrap()
            .insert((url.into(), Some(disguise)));
        self
    }

    /// Fail JSON fetches for an endpoint.
    pub fn with_json_failure(self, url: impl Into<String>) -> Self {
        self.json_failures.write().unwrap().insert(url.into());
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn fetched_page(&self, url: &str) -> bool {
        self.calls
            .read()
            .unwrap()
            .iter()
            .any(|call| matches!(call, FetchCall::Page { url: u, .. } if u == url))
    }

    pub fn fetched_json(&self, url: &str) -> bool {
        self.calls
            .read()
            .unwrap()
            .iter()
            .any(|call| matches!(call, FetchCall::Json { url: u } if u == url))
    }

    /// Disguises used against a URL, in call order.
    pub fn disguises_for(&self, url: &str) -> Vec<Disguise> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                FetchCall::Page { url: u, disguise } if u == url => Some(*disguise),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, disguise: Disguise) -> FetchResult<String> {
        self.calls.write().unwrap().push(FetchCall::Page {
            url: url.to_string(),
            disguise,
        });

        let failures = self.page_failures.read().unwrap();
        if failures.contains(&(url.to_string(), None))
            || failures.contains(&(url.to_string(), Some(disguise)))
        {
            return Err(FetchError::Status {
                status: 403,
                url: url.to_string(),
            });
        }
        drop(failures);

        self.pages
            .read()
            .unwrap()
            .get(&(url.to_string(), disguise))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }

    async fn fetch_json(&self, url: &str, _headers: &[(&str, &str)]) -> FetchResult<Value> {
        self.calls.write().unwrap().push(FetchCall::Json {
            url: url.to_string(),
        });

        if self.json_failures.read().unwrap().contains(url) {
            return Err(FetchError::Status {
                status: 403,
                url: url.to_string(),
            });
        }

        self.json
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// A minimal listing page with OpenGraph tags.
pub fn page_with_og(title: &str, image: Option<&str>, description: Option<&str>) -> String {
    let mut head = format!(r#"<meta property="og:title" content="{}">"#, title);
    if let Some(image) = image {
        head.push_str(&format!(r#"<meta property="og:image" content="{}">"#, image));
    }
    if let Some(description) = description {
        head.push_str(&format!(
            r#"<meta property="og:description" content="{}">"#,
            description
        ));
    }
    format!("<html><head>{}</head><body></body></html>", head)
}

/// A page whose only signal is free text in the body.
pub fn page_with_text(body: &str) -> String {
    format!("<html><head></head><body><p>{}</p></body></html>", body)
}

/// A page carrying one JSON-LD block.
pub fn page_with_jsonld(block: &str) -> String {
    format!(
        r#"<html><head><script type="application/ld+json">{}</script></head><body></body></html>"#,
        block
    )
}
