//! The scrape orchestrator: status sequencing, extractor dispatch, the
//! mobile-disguise retry, and the final persistence hand-off.

use tracing::{debug, info, warn};

use crate::classify::is_partial;
use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::extract::{self, parse_retry_page};
use crate::fetch::{Disguise, Fetcher};
use crate::merge::merge;
use crate::store::ListingStore;
use crate::types::{ListingUpdate, PhotoRecord, ScrapeJob, ScrapeStatus, ScrapedListing};

/// Advisory note persisted alongside a `partial` outcome.
pub const PARTIAL_ADVISORY: &str = "Limited data extracted — try editing manually";

/// Run one scrape attempt end to end.
///
/// Never returns an error: anything escaping the extraction steps
/// (realistically only a persistence failure) is converted into a
/// `failed` status write carrying the error message. The returned status
/// mirrors what was persisted.
pub async fn scrape_listing<S, F>(
    store: &S,
    fetcher: &F,
    job: &ScrapeJob,
    config: &ScrapeConfig,
) -> ScrapeStatus
where
    S: ListingStore + ?Sized,
    F: Fetcher,
{
    info!(
        listing_id = %job.listing_id,
        url = %job.url,
        platform = %job.platform,
        "scrape started"
    );

    match run(store, fetcher, job, config).await {
        Ok(status) => {
            info!(listing_id = %job.listing_id, status = %status, "scrape finished");
            status
        }
        Err(error) => {
            warn!(listing_id = %job.listing_id, error = %error, "scrape failed");
            if let Err(write_error) = store.record_failure(&job.listing_id, &error.to_string()).await
            {
                warn!(
                    listing_id = %job.listing_id,
                    error = %write_error,
                    "failure write itself failed"
                );
            }
            ScrapeStatus::Failed
        }
    }
}

async fn run<S, F>(
    store: &S,
    fetcher: &F,
    job: &ScrapeJob,
    config: &ScrapeConfig,
) -> Result<ScrapeStatus>
where
    S: ListingStore + ?Sized,
    F: Fetcher,
{
    store.mark_scraping(&job.listing_id).await?;

    let mut listing = extract::extract(fetcher, &job.url, job.platform, config).await;

    if is_partial(&listing) {
        debug!(listing_id = %job.listing_id, "primary result partial, retrying under mobile disguise");
        listing = retry_with_mobile(fetcher, &job.url, listing, config).await;
    }

    let status = if is_partial(&listing) {
        ScrapeStatus::Partial
    } else {
        ScrapeStatus::Done
    };

    if !listing.photos.is_empty() {
        let records = PhotoRecord::from_photos(&job.listing_id, &listing.photos);
        store.add_photos(&records).await?;
    }

    let mut update = ListingUpdate::new(listing, status);
    if status == ScrapeStatus::Partial {
        update = update.with_error(PARTIAL_ADVISORY);
    }
    store.save_listing(&job.listing_id, &update).await?;

    Ok(status)
}

/// One mobile-disguise retry: courtesy delay, re-fetch, minimal parse,
/// field-priority merge with the primary. A retry fetch error is
/// swallowed; the primary result stands.
async fn retry_with_mobile<F>(
    fetcher: &F,
    url: &str,
    primary: ScrapedListing,
    config: &ScrapeConfig,
) -> ScrapedListing
where
    F: Fetcher + ?Sized,
{
    tokio::time::sleep(config.retry_delay).await;

    match fetcher.fetch(url, Disguise::Mobile).await {
        Ok(html) => {
            let mut retry = parse_retry_page(&html, primary.source);
            retry.infer_amenity_details();
            merge(primary, retry)
        }
        Err(error) => {
            warn!(url = %url, error = %error, "mobile retry fetch failed, keeping primary result");
            primary
        }
    }
}
