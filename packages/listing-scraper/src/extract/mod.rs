//! Per-platform extractors and the dispatch entry point.
//!
//! Every extractor shares one contract: `extract` is async, never fails,
//! and on total fetch failure returns a minimal placeholder result. The
//! strategies inside an extractor each produce an independent partial
//! listing; the field-priority merge folds them, highest priority first.

pub mod airbnb;
pub mod generic;
pub mod vrbo;

use crate::config::ScrapeConfig;
use crate::fetch::Fetcher;
use crate::parse::meta::{clean_listing_title, parse_meta};
use crate::parse::text;
use crate::platform::Platform;
use crate::types::{Photo, ScrapedListing};

/// Dispatch to the platform extractor and apply shared enrichment.
pub async fn extract(
    fetcher: &dyn Fetcher,
    url: &str,
    platform: Platform,
    config: &ScrapeConfig,
) -> ScrapedListing {
    let mut listing = match platform {
        Platform::Airbnb => airbnb::extract(fetcher, url, config).await,
        Platform::Vrbo => vrbo::extract(fetcher, url).await,
        Platform::Booking | Platform::Other => generic::extract(fetcher, url, platform).await,
    };
    listing.infer_amenity_details();
    listing
}

/// Minimal parser for the mobile-retry body: OpenGraph tags plus the
/// last-resort regexes. Deliberately smaller than any full extractor;
/// mobile markup rarely carries embedded state worth walking.
pub fn parse_retry_page(html: &str, platform: Platform) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(platform);

    let meta = parse_meta(html);
    if let Some(title) = meta.best_title() {
        listing.name = clean_listing_title(title);
    }
    listing.description = meta.og_description;
    if let Some(image) = meta.og_image {
        if image.starts_with("http") && !text::is_tracking_image(&image) {
            listing.photos.push(Photo::new(image));
        }
    }

    listing.per_night = text::find_nightly_price(html);
    listing.bedrooms = text::find_bedrooms(html);
    listing.bathrooms = text::find_bathrooms(html);
    if let Some((lat, lng)) = text::find_coordinates(html) {
        listing.lat = lat;
        listing.lng = lng;
    }

    listing
}
