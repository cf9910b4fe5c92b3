//! Generic extractor for Booking.com and unrecognized platforms:
//! OpenGraph, JSON-LD lodging blocks, then a bare `<img>` scan.

use tracing::warn;

use crate::fetch::{Disguise, Fetcher};
use crate::merge::merge;
use crate::parse::jsonld::parse_jsonld;
use crate::parse::meta::{clean_listing_title, parse_meta};
use crate::parse::text::{self, collect_image_urls};
use crate::parse::MAX_PHOTOS;
use crate::platform::Platform;
use crate::types::{Photo, ScrapedListing};

pub async fn extract(fetcher: &dyn Fetcher, url: &str, platform: Platform) -> ScrapedListing {
    let html = match fetcher.fetch(url, Disguise::Desktop).await {
        Ok(html) => html,
        Err(error) => {
            warn!(url = %url, platform = %platform, error = %error, "page fetch failed");
            return fallback_listing(platform);
        }
    };

    let mut listing = meta_listing(&html, platform);
    if let Some(jsonld) = parse_jsonld(&html, platform) {
        listing = merge(listing, jsonld);
    }

    // Image scan only when nothing better surfaced a photo.
    if listing.photos.is_empty() {
        listing.photos = collect_image_urls(&html, MAX_PHOTOS)
            .into_iter()
            .map(Photo::new)
            .collect();
    }

    if listing.name.trim().is_empty() {
        listing.name = fallback_listing(platform).name;
    }
    listing
}

fn fallback_listing(platform: Platform) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(platform);
    listing.name = format!("Listing from {}", platform);
    listing
}

fn meta_listing(html: &str, platform: Platform) -> ScrapedListing {
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
    listing
}
