//! Embedded-state JSON flattening and the ranked field finders that
//! locate listing data in it by key-name pattern.
//!
//! Airbnb's embedded page state is an undocumented, versioned shape; the
//! only stable thing about it is vocabulary. Flattening the whole value
//! into `path -> leaf` pairs lets each finder scan for key fragments
//! without knowing the schema. Finders are independent pure functions
//! over the flat map, so individual heuristics can be added, disabled,
//! or reordered without touching shared control flow.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use serde_json::Value;

use crate::parse::text::{is_tracking_image, parse_price_str, price_in_bounds};
use crate::parse::{json_number, MAX_PHOTOS};
use crate::platform::Platform;
use crate::types::{Photo, ScrapedListing};

/// Recursion bound for pathological or cyclic-looking structures.
pub const MAX_FLATTEN_DEPTH: usize = 12;

/// Flattened JSON: dotted/bracketed leaf paths to leaf values.
pub type Flat = BTreeMap<String, Value>;

/// Flatten a JSON value into `a.b[2].c -> leaf` pairs.
///
/// Containers nested deeper than [`MAX_FLATTEN_DEPTH`] are dropped.
pub fn flatten_json(value: &Value) -> Flat {
    let mut flat = BTreeMap::new();
    flatten_into(value, String::new(), 0, &mut flat);
    flat
}

fn flatten_into(value: &Value, path: String, depth: usize, out: &mut Flat) {
    if depth > MAX_FLATTEN_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_into(child, child_path, depth + 1, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{}[{}]", path, index), depth + 1, out);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

/// Run every finder over a freshly flattened value.
pub fn listing_from_value(value: &Value, platform: Platform) -> ScrapedListing {
    let flat = flatten_json(value);
    let mut listing = ScrapedListing::empty(platform);

    if let Some(name) = find_name(&flat) {
        listing.name = name;
    }
    listing.photos = find_photos(&flat);
    listing.rating = find_rating(&flat);
    listing.review_count = find_review_count(&flat);
    listing.bedrooms = find_bedrooms(&flat);
    listing.bathrooms = find_bathrooms(&flat);
    if let Some((lat, lng)) = find_coordinates(&flat) {
        listing.lat = lat;
        listing.lng = lng;
    }
    listing.per_night = find_price(&flat);

    listing
}

/// Any key ending `.title` or `.name` whose string value is 5-200 chars.
/// Keys mentioning "listing" outrank the rest.
pub fn find_name(flat: &Flat) -> Option<String> {
    let candidate = |(key, value): (&String, &Value)| -> Option<String> {
        let lower = key.to_lowercase();
        let named = lower.ends_with(".title")
            || lower.ends_with(".name")
            || lower == "title"
            || lower == "name";
        if !named {
            return None;
        }
        let text = value.as_str()?.trim();
        let len = text.chars().count();
        (5..=200).contains(&len).then(|| text.to_string())
    };

    flat.iter()
        .filter(|(key, _)| key.to_lowercase().contains("listing"))
        .find_map(candidate)
        .or_else(|| flat.iter().find_map(candidate))
}

/// Image URLs under photo/picture/image keys, in array order, capped.
pub fn find_photos(flat: &Flat) -> Vec<Photo> {
    let mut matches: Vec<(&String, &str)> = flat
        .iter()
        .filter_map(|(key, value)| {
            let lower = key.to_lowercase();
            let photo_key = lower.contains("photo")
                || lower.contains("picture")
                || lower.contains("image");
            if !photo_key {
                return None;
            }
            let url = value.as_str()?;
            (url.starts_with("http") && !is_tracking_image(url)).then_some((key, url))
        })
        .collect();
    // BTreeMap order puts [10] before [2]; restore numeric array order.
    matches.sort_by(|(a, _), (b, _)| natural_cmp(a, b));

    let mut photos: Vec<Photo> = Vec::new();
    for (_, url) in matches {
        if photos.iter().any(|p| p.url == url) {
            continue;
        }
        photos.push(Photo::new(url));
        if photos.len() >= MAX_PHOTOS {
            break;
        }
    }
    photos
}

/// Star rating in `(0, 5]`, preferring explicit star-rating keys.
pub fn find_rating(flat: &Flat) -> Option<f64> {
    let ranked = ["star_rating", "starrating", "guestsatisfaction", "ratingvalue", ".rating"];
    for fragment in ranked {
        let hit = flat.iter().find_map(|(key, value)| {
            key.to_lowercase()
                .contains(fragment)
                .then(|| json_number(value))
                .flatten()
        });
        if let Some(rating) = hit {
            return (rating > 0.0 && rating <= 5.0).then_some(rating);
        }
    }
    None
}

/// Any key containing both "review" and "count" with a numeric value.
pub fn find_review_count(flat: &Flat) -> Option<u32> {
    flat.iter().find_map(|(key, value)| {
        let lower = key.to_lowercase();
        if !(lower.contains("review") && lower.contains("count")) {
            return None;
        }
        let count = json_number(value)?;
        (count >= 0.0 && count < 1_000_000.0).then_some(count as u32)
    })
}

/// Any key containing both "bedroom" and "count", else any "bedroom" key.
pub fn find_bedrooms(flat: &Flat) -> Option<u32> {
    let numeric_under = |fragment: &str, also: Option<&str>| -> Option<f64> {
        flat.iter().find_map(|(key, value)| {
            let lower = key.to_lowercase();
            if !lower.contains(fragment) {
                return None;
            }
            if let Some(also) = also {
                if !lower.contains(also) {
                    return None;
                }
            }
            json_number(value)
        })
    };
    let count = numeric_under("bedroom", Some("count")).or_else(|| numeric_under("bedroom", None))?;
    (count >= 0.0 && count <= 50.0).then_some(count as u32)
}

pub fn find_bathrooms(flat: &Flat) -> Option<f64> {
    flat.iter()
        .find_map(|(key, value)| {
            let lower = key.to_lowercase();
            lower
                .contains("bathroom")
                .then(|| json_number(value))
                .flatten()
        })
        .filter(|count| *count > 0.0 && *count <= 50.0)
}

/// Latitude plus its sibling longitude from the same object.
pub fn find_coordinates(flat: &Flat) -> Option<(f64, f64)> {
    for (key, value) in flat {
        let lower = key.to_lowercase();
        let sibling = if lower.ends_with("latitude") {
            replace_suffix(key, "latitude".len(), "longitude")
        } else if lower.ends_with("lat") {
            replace_suffix(key, "lat".len(), "lng")
        } else {
            continue;
        };
        let lat = match json_number(value) {
            Some(lat) => lat,
            None => continue,
        };
        let lng = match flat.get(&sibling).and_then(json_number) {
            Some(lng) => lng,
            None => continue,
        };
        if lat.abs() <= 90.0 && lng.abs() <= 180.0 && !(lat == 0.0 && lng == 0.0) {
            return Some((lat, lng));
        }
    }
    None
}

fn replace_suffix(key: &str, suffix_len: usize, replacement: &str) -> String {
    let mut sibling = key[..key.len() - suffix_len].to_string();
    sibling.push_str(replacement);
    sibling
}

/// Nightly price: explicit nightly keys first, then price amounts, then
/// displayable `$`-strings. Sanity bounds apply throughout.
pub fn find_price(flat: &Flat) -> Option<f64> {
    let passes: [&dyn Fn(&str, &Value) -> Option<f64>; 3] = [
        &|key, value| {
            (key.contains("nightly") || key.contains("pernight"))
                .then(|| price_value(value))
                .flatten()
        },
        &|key, value| {
            (key.contains("price") && (key.ends_with("amount") || key.ends_with("price")))
                .then(|| price_value(value))
                .flatten()
        },
        &|key, value| {
            key.contains("price")
                .then(|| value.as_str().and_then(parse_price_str))
                .flatten()
        },
    ];

    for pass in passes {
        let hit = flat.iter().find_map(|(key, value)| {
            let lower = key.to_lowercase();
            pass(&lower, value).filter(|price| price_in_bounds(*price))
        });
        if hit.is_some() {
            return hit;
        }
    }
    None
}

fn price_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_price_str(s),
        other => json_number(other),
    }
}

/// Compare path strings with digit runs ordered numerically, so that
/// `photos[2]` sorts before `photos[10]`.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let nx = take_number(&mut left);
                let ny = take_number(&mut right);
                match nx.cmp(&ny) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => {
                    left.next();
                    right.next();
                }
                other => return other,
            },
        }
    }
}

fn take_number(chars: &mut Peekable<Chars>) -> u64 {
    let mut number = 0u64;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        number = number.saturating_mul(10).saturating_add(digit as u64);
        chars.next();
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_paths() {
        let value = json!({"a": {"b": [10, {"c": "deep"}]}, "top": true});
        let flat = flatten_json(&value);
        assert_eq!(flat.get("a.b[0]"), Some(&json!(10)));
        assert_eq!(flat.get("a.b[1].c"), Some(&json!("deep")));
        assert_eq!(flat.get("top"), Some(&json!(true)));
    }

    #[test]
    fn depth_bound_drops_pathological_nesting() {
        let mut value = json!("leaf");
        for _ in 0..20 {
            value = json!({ "level": value });
        }
        let flat = flatten_json(&value);
        assert!(flat.is_empty());

        let mut shallow = json!("leaf");
        for _ in 0..5 {
            shallow = json!({ "level": shallow });
        }
        assert_eq!(flatten_json(&shallow).len(), 1);
    }

    #[test]
    fn name_finder_applies_length_rule() {
        let value = json!({
            "page": {"title": "Hi"},
            "listing": {"name": "Sunset Bungalow with Pool"}
        });
        let flat = flatten_json(&value);
        assert_eq!(find_name(&flat).as_deref(), Some("Sunset Bungalow with Pool"));

        let noise = json!({"nav": {"title": "abc"}});
        assert_eq!(find_name(&flatten_json(&noise)), None);
    }

    #[test]
    fn name_finder_prefers_listing_keys() {
        let value = json!({
            "header": {"title": "Vacation Rentals and More"},
            "pdp": {"listingTitle": {"name": "Creekside A-Frame"}}
        });
        assert_eq!(
            find_name(&flatten_json(&value)).as_deref(),
            Some("Creekside A-Frame")
        );
    }

    #[test]
    fn photo_finder_keeps_array_order_past_ten() {
        let urls: Vec<String> = (0..12)
            .map(|i| format!("https://a0.muscache.com/im/pictures/{}.jpg", i))
            .collect();
        let value = json!({ "listing": { "photos": urls } });
        let photos = find_photos(&flatten_json(&value));
        assert_eq!(photos.len(), 12);
        assert!(photos[2].url.ends_with("/2.jpg"));
        assert!(photos[10].url.ends_with("/10.jpg"));
        assert!(photos[11].url.ends_with("/11.jpg"));
    }

    #[test]
    fn photo_finder_skips_tracking_and_caps() {
        let mut urls: Vec<String> = (0..30)
            .map(|i| format!("https://cdn.example.com/photo-{}.jpg", i))
            .collect();
        urls.insert(0, "https://metrics.example.com/pixel.gif".to_string());
        let value = json!({ "gallery": { "images": urls } });
        let photos = find_photos(&flatten_json(&value));
        assert_eq!(photos.len(), MAX_PHOTOS);
        assert!(photos.iter().all(|p| !p.url.contains("pixel")));
    }

    #[test]
    fn room_and_rating_finders() {
        let value = json!({
            "pdp": {
                "bedroomCount": 3,
                "bathrooms": "2.5",
                "starRating": 4.87,
                "reviewsCount": 112
            }
        });
        let flat = flatten_json(&value);
        assert_eq!(find_bedrooms(&flat), Some(3));
        assert_eq!(find_bathrooms(&flat), Some(2.5));
        assert_eq!(find_rating(&flat), Some(4.87));
        assert_eq!(find_review_count(&flat), Some(112));
    }

    #[test]
    fn coordinates_pair_from_the_same_object() {
        let value = json!({
            "map": {"lat": 0.0, "lng": 0.0},
            "listing": {"lat": 44.9778, "lng": -93.265}
        });
        assert_eq!(
            find_coordinates(&flatten_json(&value)),
            Some((44.9778, -93.265))
        );

        let lonely = json!({"listing": {"lat": 44.9}});
        assert_eq!(find_coordinates(&flatten_json(&lonely)), None);
    }

    #[test]
    fn price_finder_ranks_nightly_first() {
        let value = json!({
            "booking": {"price": {"total": {"amount": 1750.0}}},
            "rates": {"nightlyPrice": "$250"}
        });
        assert_eq!(find_price(&flatten_json(&value)), Some(250.0));

        let amount_only = json!({"booking": {"price": {"amount": 420}}});
        assert_eq!(find_price(&flatten_json(&amount_only)), Some(420.0));

        let junk = json!({"booking": {"price": {"amount": 2}}});
        assert_eq!(find_price(&flatten_json(&junk)), None);
    }

    #[test]
    fn listing_from_value_combines_finders() {
        let value = json!({
            "listing": {
                "name": "Sunset Bungalow with Pool",
                "lat": 26.1,
                "lng": -81.7,
                "bedroomCount": 2,
                "photos": ["https://a0.muscache.com/im/1.jpg"]
            },
            "reviews": {"starRating": 4.9, "reviewCount": 57}
        });
        let listing = listing_from_value(&value, Platform::Airbnb);
        assert_eq!(listing.name, "Sunset Bungalow with Pool");
        assert_eq!(listing.photos.len(), 1);
        assert_eq!(listing.bedrooms, Some(2));
        assert_eq!(listing.rating, Some(4.9));
        assert!(listing.has_coords());
    }

    proptest! {
        #[test]
        fn flatten_depth_never_exceeds_bound(depth in 0usize..40) {
            let mut value = json!(1);
            for _ in 0..depth {
                value = json!([value]);
            }
            let flat = flatten_json(&value);
            for key in flat.keys() {
                let segments = key.matches('[').count() + key.matches('.').count();
                prop_assert!(segments <= MAX_FLATTEN_DEPTH);
            }
        }
    }
}
