//! Scrape tunables, including the Airbnb API capability flag.

use std::time::Duration;

// Web client key Airbnb ships in its own public pages. Rotates rarely;
// override with AIRBNB_API_KEY when it does.
const AIRBNB_PUBLIC_API_KEY: &str = "d306zoyjsyarp7ifhu67rjxn52tv0t20";

const DEFAULT_RETRY_DELAY_MS: u64 = 1500;

/// Tunables for scrape invocations.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Client key for the Airbnb mobile API. `None` disables that
    /// strategy entirely; the extractor then starts from HTML parsing.
    pub airbnb_api_key: Option<String>,

    /// Courtesy delay before the mobile-disguise retry fetch.
    pub retry_delay: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            airbnb_api_key: Some(AIRBNB_PUBLIC_API_KEY.to_string()),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl ScrapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_airbnb_api_key(mut self, key: impl Into<String>) -> Self {
        self.airbnb_api_key = Some(key.into());
        self
    }

    /// Turn off the reverse-engineered API strategy.
    pub fn without_airbnb_api(mut self) -> Self {
        self.airbnb_api_key = None;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Defaults with environment overrides applied.
    ///
    /// `AIRBNB_API_KEY` replaces the embedded public key,
    /// `SCRAPE_DISABLE_AIRBNB_API` (1/true/yes) disables the API strategy,
    /// `SCRAPE_RETRY_DELAY_MS` adjusts the courtesy delay.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("AIRBNB_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                config.airbnb_api_key = Some(key);
            }
        }

        if let Ok(flag) = std::env::var("SCRAPE_DISABLE_AIRBNB_API") {
            let flag = flag.trim().to_ascii_lowercase();
            if flag == "1" || flag == "true" || flag == "yes" {
                config.airbnb_api_key = None;
            }
        }

        if let Ok(raw) = std::env::var("SCRAPE_RETRY_DELAY_MS") {
            if let Ok(ms) = raw.trim().parse::<u64>() {
                config.retry_delay = Duration::from_millis(ms);
            }
        }

        config
    }
}
