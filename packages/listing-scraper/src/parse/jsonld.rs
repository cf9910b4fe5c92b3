//! JSON-LD structured data: find lodging-typed blocks and map them onto
//! a partial listing.

use scraper::{Html, Selector};
use serde_json::Value;

use crate::merge::merge;
use crate::parse::text::price_in_bounds;
use crate::parse::MAX_PHOTOS;
use crate::platform::Platform;
use crate::types::{Photo, ScrapedListing};

/// Schema.org types that describe a place you can stay.
pub const LODGING_TYPES: [&str; 6] = [
    "LodgingBusiness",
    "Hotel",
    "VacationRental",
    "House",
    "Apartment",
    "Accommodation",
];

/// All lodging-typed JSON-LD blocks in a page, `@graph` wrappers
/// unwrapped recursively.
pub fn lodging_blocks(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut blocks = Vec::new();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => collect_blocks(&value, &mut blocks),
            // Malformed blocks are someone else's bug; skip them.
            Err(_) => continue,
        }
    }
    blocks.retain(is_lodging);
    blocks
}

/// Fold every lodging block of a page into one partial listing.
pub fn parse_jsonld(html: &str, platform: Platform) -> Option<ScrapedListing> {
    let mut folded: Option<ScrapedListing> = None;
    for block in lodging_blocks(html) {
        let partial = listing_from_lodging(&block, platform);
        folded = Some(match folded {
            Some(primary) => merge(primary, partial),
            None => partial,
        });
    }
    folded
}

fn collect_blocks(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_blocks(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect_blocks(graph, out);
            } else {
                out.push(value.clone());
            }
        }
        _ => {}
    }
}

fn is_lodging(block: &Value) -> bool {
    let matches_type = |name: &str| {
        LODGING_TYPES
            .iter()
            .any(|lodging| lodging.eq_ignore_ascii_case(name))
    };
    match block.get("@type") {
        Some(Value::String(name)) => matches_type(name),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .any(matches_type),
        _ => false,
    }
}

/// Map one lodging block onto a partial listing.
pub fn listing_from_lodging(block: &Value, platform: Platform) -> ScrapedListing {
    let mut listing = ScrapedListing::empty(platform);

    if let Some(name) = block.get("name").and_then(Value::as_str) {
        listing.name = name.trim().to_string();
    }
    if let Some(description) = block.get("description").and_then(Value::as_str) {
        let description = description.trim();
        if !description.is_empty() {
            listing.description = Some(description.to_string());
        }
    }

    if let Some(geo) = block.get("geo") {
        if let (Some(lat), Some(lng)) = (
            numeric(geo.get("latitude")),
            numeric(geo.get("longitude")),
        ) {
            if !(lat == 0.0 && lng == 0.0) {
                listing.lat = lat;
                listing.lng = lng;
            }
        }
    }

    if let Some(rating) = block.get("aggregateRating") {
        listing.rating = numeric(rating.get("ratingValue")).filter(|r| *r > 0.0 && *r <= 5.0);
        listing.review_count = numeric(rating.get("reviewCount")).map(|c| c as u32);
    }

    if let Some(address) = block.get("address") {
        listing.address = formatted_address(address);
    }

    for url in image_urls(block.get("image")) {
        if listing.photos.len() >= MAX_PHOTOS {
            break;
        }
        listing.photos.push(Photo::new(url));
    }

    if let Some(offers) = block.get("offers") {
        let offer = match offers {
            Value::Array(items) => items.first(),
            other => Some(other),
        };
        if let Some(offer) = offer {
            let price = numeric(offer.get("price")).or_else(|| numeric(offer.get("lowPrice")));
            listing.per_night = price.filter(|p| price_in_bounds(*p));
            if let Some(currency) = offer.get("priceCurrency").and_then(Value::as_str) {
                listing.currency = Some(currency.to_string());
            }
        }
    }

    listing
}

/// Number or numeric string.
fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn formatted_address(address: &Value) -> Option<String> {
    match address {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Object(_) => {
            let parts: Vec<String> = [
                "streetAddress",
                "addressLocality",
                "addressRegion",
                "postalCode",
            ]
            .iter()
            .filter_map(|key| address.get(key).and_then(Value::as_str))
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn image_urls(image: Option<&Value>) -> Vec<String> {
    let mut urls = Vec::new();
    match image {
        Some(Value::String(url)) => urls.push(url.clone()),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(url) => urls.push(url.clone()),
                    Value::Object(_) => {
                        if let Some(url) = item.get("url").and_then(Value::as_str) {
                            urls.push(url.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        Some(obj @ Value::Object(_)) => {
            if let Some(url) = obj.get("url").and_then(Value::as_str) {
                urls.push(url.to_string());
            }
        }
        _ => {}
    }
    urls.retain(|url| url.starts_with("http"));
    urls
}
