//! The persistence seam: the orchestrator's only way to hand results
//! back, plus an in-memory implementation for tests and the dev CLI.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, ScrapeError};
use crate::types::{ListingUpdate, PhotoRecord, ScrapeStatus};

/// Writes the scraper performs against the listing records it does not
/// otherwise own. Real implementations live with the application's
/// database layer.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Record that a scrape attempt has started.
    async fn mark_scraping(&self, listing_id: &str) -> Result<()>;

    /// Append photo records in extraction order. The caller clears old
    /// photos before a re-scrape; the scraper only appends.
    async fn add_photos(&self, photos: &[PhotoRecord]) -> Result<()>;

    /// Persist the extracted fields and the final status.
    async fn save_listing(&self, listing_id: &str, update: &ListingUpdate) -> Result<()>;

    /// Record a terminal failure with the error message verbatim.
    async fn record_failure(&self, listing_id: &str, error: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct StoredListing {
    status: ScrapeStatus,
    update: Option<ListingUpdate>,
    error: Option<String>,
}

/// In-memory listing store. Last write wins, like the real database
/// under concurrent re-scrapes. Data is lost on drop; tests and the dev
/// CLI only.
#[derive(Default)]
pub struct MemoryStore {
    listings: RwLock<HashMap<String, StoredListing>>,
    photos: RwLock<Vec<PhotoRecord>>,
    fail_saves: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `save_listing` call fail, to exercise the
    /// orchestrator's terminal-failure path.
    pub fn with_failing_saves(self) -> Self {
        *self.fail_saves.write().unwrap() = true;
        self
    }

    pub fn status_of(&self, listing_id: &str) -> Option<ScrapeStatus> {
        self.listings
            .read()
            .unwrap()
            .get(listing_id)
            .map(|stored| stored.status)
    }

    pub fn update_of(&self, listing_id: &str) -> Option<ListingUpdate> {
        self.listings
            .read()
            .unwrap()
            .get(listing_id)
            .and_then(|stored| stored.update.clone())
    }

    pub fn error_of(&self, listing_id: &str) -> Option<String> {
        self.listings
            .read()
            .unwrap()
            .get(listing_id)
            .and_then(|stored| stored.error.clone())
    }

    pub fn photos_for(&self, listing_id: &str) -> Vec<PhotoRecord> {
        self.photos
            .read()
            .unwrap()
            .iter()
            .filter(|photo| photo.listing_id == listing_id)
            .cloned()
            .collect()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.read().unwrap().len()
    }

    /// Drop photo records for a listing, as the upstream caller does
    /// before requesting a re-scrape.
    pub fn clear_photos(&self, listing_id: &str) {
        self.photos
            .write()
            .unwrap()
            .retain(|photo| photo.listing_id != listing_id);
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn mark_scraping(&self, listing_id: &str) -> Result<()> {
        self.listings.write().unwrap().insert(
            listing_id.to_string(),
            StoredListing {
                status: ScrapeStatus::Scraping,
                update: None,
                error: None,
            },
        );
        Ok(())
    }

    async fn add_photos(&self, photos: &[PhotoRecord]) -> Result<()> {
        self.photos.write().unwrap().extend_from_slice(photos);
        Ok(())
    }

    async fn save_listing(&self, listing_id: &str, update: &ListingUpdate) -> Result<()> {
        if *self.fail_saves.read().unwrap() {
            return Err(ScrapeError::store(std::io::Error::other(
                "simulated save failure",
            )));
        }
        self.listings.write().unwrap().insert(
            listing_id.to_string(),
            StoredListing {
                status: update.status,
                update: Some(update.clone()),
                error: update.scrape_error.clone(),
            },
        );
        Ok(())
    }

    async fn record_failure(&self, listing_id: &str, error: &str) -> Result<()> {
        self.listings.write().unwrap().insert(
            listing_id.to_string(),
            StoredListing {
                status: ScrapeStatus::Failed,
                update: None,
                error: Some(error.to_string()),
            },
        );
        Ok(())
    }
}
