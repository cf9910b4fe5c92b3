//! Scrape job inputs, the status lifecycle, and the outbound shapes
//! handed to the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{detect_platform, Platform};
use crate::types::listing::{Photo, PhotoCategory, ScrapedListing};

/// Lifecycle of one scrape attempt.
///
/// `pending -> scraping -> {done | partial | failed}`. The orchestrator is
/// the sole mutator between `scraping` and a terminal state; `pending` is
/// written upstream when the listing record is created or a re-scrape is
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    #[default]
    Pending,
    Scraping,
    Done,
    Partial,
    Failed,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::Pending => "pending",
            ScrapeStatus::Scraping => "scraping",
            ScrapeStatus::Done => "done",
            ScrapeStatus::Partial => "partial",
            ScrapeStatus::Failed => "failed",
        }
    }

    /// Terminal for this attempt; a re-scrape resets to `Pending`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScrapeStatus::Done | ScrapeStatus::Partial | ScrapeStatus::Failed
        )
    }
}

impl std::fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The job input triple fired per listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub listing_id: String,
    pub url: String,
    pub platform: Platform,
}

impl ScrapeJob {
    pub fn new(
        listing_id: impl Into<String>,
        url: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            url: url.into(),
            platform,
        }
    }

    /// Build a job detecting the platform from the URL.
    pub fn from_url(listing_id: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let platform = detect_platform(&url);
        Self {
            listing_id: listing_id.into(),
            url,
            platform,
        }
    }
}

/// A stored photo row, in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub listing_id: String,
    pub url: String,
    pub caption: Option<String>,
    pub category: Option<PhotoCategory>,
    pub sort_order: u32,
}

impl PhotoRecord {
    /// Map extracted photos onto rows, `sort_order` from position.
    pub fn from_photos(listing_id: &str, photos: &[Photo]) -> Vec<PhotoRecord> {
        photos
            .iter()
            .enumerate()
            .map(|(index, photo)| PhotoRecord {
                listing_id: listing_id.to_string(),
                url: photo.url.clone(),
                caption: photo.caption.clone(),
                category: photo.category,
                sort_order: index as u32,
            })
            .collect()
    }
}

/// The final field update for a listing record.
///
/// `scrape_error` carries the advisory note for `partial` outcomes and
/// the failure message for `failed` ones; `None` on `done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingUpdate {
    pub listing: ScrapedListing,
    pub status: ScrapeStatus,
    pub scrape_error: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl ListingUpdate {
    pub fn new(listing: ScrapedListing, status: ScrapeStatus) -> Self {
        Self {
            listing,
            status,
            scrape_error: None,
            scraped_at: Utc::now(),
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.scrape_error = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_lowercase() {
        assert_eq!(ScrapeStatus::Partial.as_str(), "partial");
        let json = serde_json::to_string(&ScrapeStatus::Scraping).unwrap();
        assert_eq!(json, "\"scraping\"");
        assert!(!ScrapeStatus::Scraping.is_terminal());
        assert!(ScrapeStatus::Failed.is_terminal());
    }

    #[test]
    fn job_from_url_detects_platform() {
        let job = ScrapeJob::from_url("listing-1", "https://www.vrbo.com/1234567");
        assert_eq!(job.platform, Platform::Vrbo);
        assert_eq!(job.listing_id, "listing-1");
    }

    #[test]
    fn photo_records_preserve_order() {
        let photos = vec![
            Photo::new("https://cdn.example.com/a.jpg").with_caption("Kitchen island"),
            Photo::new("https://cdn.example.com/b.jpg"),
        ];
        let records = PhotoRecord::from_photos("listing-9", &photos);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sort_order, 0);
        assert_eq!(records[0].category, Some(PhotoCategory::Kitchen));
        assert_eq!(records[1].sort_order, 1);
        assert_eq!(records[1].listing_id, "listing-9");
    }
}
