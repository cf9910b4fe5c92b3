//! VRBO extractor.
//!
//! VRBO/Expedia pages have no usable public API, so this is the deepest
//! fallback chain: OpenGraph, document title, JSON-LD lodging blocks,
//! inline framework state, then raw regexes over the HTML; a name can be
//! synthesized from the URL path as a last resort.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::{Disguise, Fetcher};
use crate::merge::merge;
use crate::parse::flatten::listing_from_value;
use crate::parse::meta::{clean_listing_title, parse_meta};
use crate::parse::text::{self, title_case_slug};
use crate::parse::MAX_PHOTOS;
use crate::platform::{extract_vrbo_id, Platform};
use crate::types::{Photo, ScrapedListing};

lazy_static! {
    // Listing photos live on known Expedia-group CDNs; anything else in
    // an <img> tag on a VRBO page is chrome or ads.
    static ref CDN_IMAGE_RE: Regex = Regex::new(
        r#"(?i)https://(?:media\.vrbo\.com|images\.trvl-media\.com|imagedelivery\.vrbo\.com)/[^\s"'<>\\]+\.(?:jpe?g|png|webp)"#
    )
    .unwrap();
}

/// Inline scripts carrying one of these markers get parsed as embedded
/// framework state.
const STATE_MARKERS: [&str; 3] = ["window.__INITIAL_STATE__", "__PLUGIN_STATE__", "window.__DATA__"];

/// URL path segments that never name the property.
const BOILERPLATE_SEGMENTS: [&str; 4] = ["vacation-rentals", "en-us", "p", "search"];

pub async fn extract(fetcher: &dyn Fetcher, url: &str) -> ScrapedListing {
    let id = extract_vrbo_id(url);

    let html = match fetcher.fetch(url, Disguise::Desktop).await {
        Ok(html) => html,
        Err(error) => {
            warn!(url = %url, error = %error, "vrbo page fetch failed");
            return ScrapedListing::placeholder(Platform::Vrbo, id.as_deref());
        }
    };

    let mut listing = meta_listing(&html);
    if let Some(jsonld) = crate::parse::jsonld::parse_jsonld(&html, Platform::Vrbo) {
        listing = merge(listing, jsonld);
    }
    if let Some(state) = state_listing(&html) {
        listing = merge(listing, state);
    }
    listing = merge(listing, regex_listing(&html));

    if listing.name.trim().is_empty() {
        listing.name = name_from_path(url)
            .unwrap_or_else(|| ScrapedListing::placeholder(Platform::Vrbo, id.as_deref()).name);
    }
    if listing.external_id.is_none() {
        listing.external_id = id;
    }
    listing
}

fn meta_listing(html: &str) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(Platform::Vrbo);
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

/// Parse inline scripts that carry a framework state marker and walk
/// their JSON with the flattening finders.
fn state_listing(html: &str) -> Option<ScrapedListing> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    let mut folded: Option<ScrapedListing> = None;
    for script in document.select(&selector) {
        let body = script.text().collect::<String>();
        if !STATE_MARKERS.iter().any(|marker| body.contains(marker)) {
            continue;
        }
        let Some(value) = assigned_json(&body) else {
            debug!("vrbo state script present but not parseable, skipping");
            continue;
        };
        let partial = listing_from_value(&value, Platform::Vrbo);
        folded = Some(match folded {
            Some(primary) => merge(primary, partial),
            None => partial,
        });
    }
    folded
}

/// The JSON object on the right-hand side of a `window.X = {...};`
/// assignment, or the whole body when it is bare JSON.
fn assigned_json(script: &str) -> Option<Value> {
    let trimmed = script.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn regex_listing(html: &str) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(Platform::Vrbo);
    if let Some((lat, lng)) = text::find_coordinates(html) {
        listing.lat = lat;
        listing.lng = lng;
    }
    listing.per_night = text::find_nightly_price(html);
    listing.bedrooms = text::find_bedrooms(html);
    listing.bathrooms = text::find_bathrooms(html);
    listing.rating = text::find_rating(html);
    listing.review_count = text::find_review_count(html);
    listing.beach_distance = text::find_beach_distance(&text::strip_tags(html));

    for m in CDN_IMAGE_RE.find_iter(html) {
        if listing.photos.len() >= MAX_PHOTOS {
            break;
        }
        let url = text::decode_entities(m.as_str());
        if text::is_tracking_image(&url) {
            continue;
        }
        if listing.photos.iter().any(|p| p.url == url) {
            continue;
        }
        listing.photos.push(Photo::new(url));
    }

    listing
}

/// Synthesize a name from the last informative URL path segment:
/// `/vacation-rentals/ocean-view_condo/1234567` -> "Ocean View Condo".
fn name_from_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    segments
        .iter()
        .rev()
        .find(|segment| {
            let lower = segment.to_lowercase();
            !segment.is_empty()
                && !segment.starts_with(|c: char| c.is_ascii_digit())
                && !BOILERPLATE_SEGMENTS.contains(&lower.as_str())
        })
        .map(|segment| title_case_slug(segment))
        .filter(|name| !name.is_empty())
}
