//! Airbnb extractor.
//!
//! Strategy order: the reverse-engineered mobile API when an id and the
//! capability key are available (richest path, including per-bed data),
//! then embedded page state (`data-deferred-state`, then `__NEXT_DATA__`)
//! walked by the flattening finders, with meta-tag and raw-regex partials
//! backfilling whatever is still missing.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ScrapeConfig;
use crate::fetch::{Disguise, Fetcher};
use crate::merge::merge;
use crate::parse::flatten::listing_from_value;
use crate::parse::json_number;
use crate::parse::meta::{clean_listing_title, parse_meta};
use crate::parse::text::{self, price_in_bounds};
use crate::parse::MAX_PHOTOS;
use crate::platform::{extract_airbnb_id, Platform};
use crate::types::{BedEntry, Photo, ScrapedListing};

const API_ENDPOINT: &str = "https://api.airbnb.com/v2/pdp_listing_details";
const API_KEY_HEADER: &str = "X-Airbnb-API-Key";

/// A trivial API name ("...", "N/A") means the endpoint answered without
/// real data; anything longer is accepted as-is.
const MIN_API_NAME_LEN: usize = 3;

pub async fn extract(fetcher: &dyn Fetcher, url: &str, config: &ScrapeConfig) -> ScrapedListing {
    let id = extract_airbnb_id(url);

    if let (Some(id), Some(key)) = (id.as_deref(), config.airbnb_api_key.as_deref()) {
        if let Some(listing) = api_listing(fetcher, id, key).await {
            if listing.name.trim().chars().count() > MIN_API_NAME_LEN {
                debug!(id = %id, "airbnb API strategy accepted");
                return listing;
            }
            debug!(id = %id, "airbnb API answered with a trivial name, falling back to HTML");
        }
    }

    let html = match fetcher.fetch(url, Disguise::Desktop).await {
        Ok(html) => html,
        Err(error) => {
            warn!(url = %url, error = %error, "airbnb page fetch failed");
            return ScrapedListing::placeholder(Platform::Airbnb, id.as_deref());
        }
    };

    let structured = deferred_state_listing(&html).or_else(|| next_data_listing(&html));
    let folded = match structured {
        Some(state) => merge(merge(state, meta_listing(&html)), regex_listing(&html)),
        None => merge(meta_listing(&html), regex_listing(&html)),
    };

    let mut listing = folded;
    if listing.name.trim().is_empty() {
        listing.name = ScrapedListing::placeholder(Platform::Airbnb, id.as_deref()).name;
    }
    if listing.external_id.is_none() {
        listing.external_id = id;
    }
    listing
}

/// Call the mobile API for a known listing id. `None` on any failure or
/// envelope mismatch; schema drift degrades instead of erroring.
async fn api_listing(fetcher: &dyn Fetcher, id: &str, key: &str) -> Option<ScrapedListing> {
    let endpoint = format!("{}/{}?_format=for_rooms", API_ENDPOINT, id);
    let value = match fetcher.fetch_json(&endpoint, &[(API_KEY_HEADER, key)]).await {
        Ok(value) => value,
        Err(error) => {
            debug!(id = %id, error = %error, "airbnb API strategy unavailable");
            return None;
        }
    };

    let detail = value.get("pdp_listing_detail")?;
    let mut listing = listing_from_api_detail(detail);
    listing.external_id = Some(id.to_string());
    Some(listing)
}

/// Map the `pdp_listing_detail` envelope onto a listing, tolerantly:
/// every field is optional, unknown keys are ignored.
fn listing_from_api_detail(detail: &Value) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(Platform::Airbnb);

    if let Some(name) = detail
        .get("name")
        .or_else(|| detail.get("p3_summary_title"))
        .and_then(Value::as_str)
    {
        listing.name = name.trim().to_string();
    }

    if let (Some(lat), Some(lng)) = (
        detail.get("lat").and_then(json_number),
        detail.get("lng").and_then(json_number),
    ) {
        if !(lat == 0.0 && lng == 0.0) {
            listing.lat = lat;
            listing.lng = lng;
        }
    }

    listing.bedrooms = detail
        .get("bedrooms")
        .and_then(json_number)
        .map(|n| n as u32);
    listing.bathrooms = detail.get("bathrooms").and_then(json_number);
    listing.rating = detail
        .get("star_rating")
        .and_then(json_number)
        .filter(|r| *r > 0.0 && *r <= 5.0);
    listing.review_count = detail
        .get("review_details_interface")
        .and_then(|r| r.get("review_count"))
        .or_else(|| detail.get("reviews_count"))
        .and_then(json_number)
        .map(|n| n as u32);

    if let Some(description) = detail
        .get("sectioned_description")
        .and_then(|d| d.get("description"))
        .or_else(|| detail.get("description"))
        .and_then(Value::as_str)
    {
        let description = description.trim();
        if !description.is_empty() {
            listing.description = Some(description.to_string());
        }
    }

    if let Some(city) = detail
        .get("localized_city")
        .or_else(|| detail.get("city"))
        .and_then(Value::as_str)
    {
        listing.neighborhood = Some(city.trim().to_string());
    }

    if let Some(photos) = detail.get("photos").and_then(Value::as_array) {
        for photo in photos.iter() {
            if listing.photos.len() >= MAX_PHOTOS {
                break;
            }
            let url = photo
                .get("xl_picture_url")
                .or_else(|| photo.get("large"))
                .or_else(|| photo.get("picture_url"))
                .and_then(Value::as_str);
            let Some(url) = url else { continue };
            let mut entry = Photo::new(url);
            if let Some(caption) = photo.get("caption").and_then(Value::as_str) {
                if !caption.trim().is_empty() {
                    entry = entry.with_caption(caption.trim());
                }
            }
            listing.photos.push(entry);
        }
    }

    if let Some(amenities) = detail.get("listing_amenities").and_then(Value::as_array) {
        for amenity in amenities {
            let present = amenity
                .get("is_present")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            if !present {
                continue;
            }
            if let Some(name) = amenity.get("name").and_then(Value::as_str) {
                listing.push_amenity(name);
            }
        }
    }

    // The API is the only source rich enough to carry per-bed data.
    if let Some(rooms) = detail.get("listing_rooms").and_then(Value::as_array) {
        for room in rooms {
            let Some(beds) = room.get("beds").and_then(Value::as_array) else {
                continue;
            };
            for bed in beds {
                let bed_type = bed
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("bed")
                    .to_string();
                let count = bed
                    .get("quantity")
                    .and_then(json_number)
                    .unwrap_or(1.0)
                    .max(1.0) as u32;
                listing.beds.push(BedEntry { bed_type, count });
            }
        }
    }

    listing.per_night = detail
        .get("price_interface")
        .and_then(|p| p.get("price"))
        .and_then(|p| p.get("amount"))
        .or_else(|| detail.get("price"))
        .and_then(json_number)
        .filter(|p| price_in_bounds(*p));

    listing
}

/// The deferred-state script blob (`niobeClientData` wrapper included),
/// walked by the flattening finders.
fn deferred_state_listing(html: &str) -> Option<ScrapedListing> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script[data-deferred-state], script[id^='data-deferred-state']").ok()?;

    let mut folded: Option<ScrapedListing> = None;
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        let partial = listing_from_value(&value, Platform::Airbnb);
        folded = Some(match folded {
            Some(primary) => merge(primary, partial),
            None => partial,
        });
    }
    folded
}

/// The framework embedded-data script, same treatment.
fn next_data_listing(html: &str) -> Option<ScrapedListing> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();
    let value = serde_json::from_str::<Value>(&raw).ok()?;
    Some(listing_from_value(&value, Platform::Airbnb))
}

/// Meta-tag partial: name, lead photo, description.
fn meta_listing(html: &str) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(Platform::Airbnb);
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

/// Raw-regex partial over the whole page body.
fn regex_listing(html: &str) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(Platform::Airbnb);
    listing.per_night = text::find_nightly_price(html);
    listing.bedrooms = text::find_bedrooms(html);
    listing.bathrooms = text::find_bathrooms(html);
    listing.rating = text::find_rating(html);
    listing.review_count = text::find_review_count(html);
    if let Some((lat, lng)) = text::find_coordinates(html) {
        listing.lat = lat;
        listing.lng = lng;
    }
    listing
}
