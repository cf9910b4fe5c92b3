//! Regex and plain-text helpers shared by every extractor: entity
//! decoding, tag stripping, and the last-resort field patterns that run
//! against raw HTML when no structured source produced a value.

use lazy_static::lazy_static;
use regex::Regex;

/// Exclusive price sanity bounds. Filters unit-price noise ("$5 service
/// fee") and corrupted matches.
pub const MIN_PRICE: f64 = 10.0;
pub const MAX_PRICE: f64 = 100_000.0;

/// A regex-extracted price is accepted only inside the open interval.
pub fn price_in_bounds(price: f64) -> bool {
    price > MIN_PRICE && price < MAX_PRICE
}

lazy_static! {
    // Nightly price patterns, most specific first; the first match that
    // passes the sanity bound wins.
    static ref NIGHTLY_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\$\s*([\d,]+(?:\.\d{1,2})?)\s*(?:per|/)\s*night").unwrap(),
        Regex::new(r"(?i)(?:per|/)\s*night[^$\d]{0,24}\$\s*([\d,]+(?:\.\d{1,2})?)").unwrap(),
        Regex::new(r#"(?i)"(?:nightly|perNight)[a-zA-Z]*"\s*:\s*"?\$?([\d,]+(?:\.\d{1,2})?)"#)
            .unwrap(),
        Regex::new(r#"(?i)"price"\s*:\s*"?\$?([\d,]+(?:\.\d{1,2})?)"#).unwrap(),
        Regex::new(r#"(?i)"amount"\s*:\s*"?([\d,]+(?:\.\d{1,2})?)"#).unwrap(),
    ];
    static ref BEDROOM_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"bedrooms?(?:Count|_count)?"\s*:\s*"?(\d+)"#).unwrap(),
        Regex::new(r"(?i)(\d+)\s*bedroom").unwrap(),
        Regex::new(r"(?i)(\d+)\s*br\b").unwrap(),
    ];
    static ref BATHROOM_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"bathrooms?(?:Count|_count)?"\s*:\s*"?(\d+(?:\.\d+)?)"#).unwrap(),
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:bath|ba\b)").unwrap(),
    ];
    // Two alternates each for latitude and longitude: JSON-style keys,
    // then looser assignments in inline scripts.
    static ref LAT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"lat(?:itude)?"\s*:\s*"?(-?\d{1,3}\.\d+)"#).unwrap(),
        Regex::new(r"(?i)lat(?:itude)?\s*[=:]\s*(-?\d{1,3}\.\d+)").unwrap(),
    ];
    static ref LNG_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"l(?:o)?ng(?:itude)?"\s*:\s*"?(-?\d{1,3}\.\d+)"#).unwrap(),
        Regex::new(r"(?i)l(?:o)?ng(?:itude)?\s*[=:]\s*(-?\d{1,3}\.\d+)").unwrap(),
    ];
    static ref RATING_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"(?:star_?rating|rating_?value|average_?rating)"\s*:\s*"?([\d.]+)"#)
            .unwrap(),
        Regex::new(r"(?i)(\d(?:\.\d{1,2})?)\s*(?:out of 5|stars)").unwrap(),
    ];
    static ref REVIEW_COUNT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)"(?:review_?count|reviews_?count)"\s*:\s*"?(\d+)"#).unwrap(),
        Regex::new(r"(?i)(\d[\d,]*)\s*reviews?\b").unwrap(),
    ];
    static ref BEACH_DISTANCE_RE: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?[\s-]*(?:min(?:ute)?s?|miles?|km|meters?|m)\s*(?:walk|drive|stroll)?\s*(?:to|from)\s*(?:the\s*)?beach)"
    )
    .unwrap();
    static ref IMG_SRC_RE: Regex =
        Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).unwrap();
    static ref SCRIPT_BLOCK_RE: Regex =
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref NUMERIC_ENTITY_RE: Regex = Regex::new(r"&#(\d+);").unwrap();
}

/// Decode the HTML entities that show up in listing titles and captions.
pub fn decode_entities(text: &str) -> String {
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    NUMERIC_ENTITY_RE
        .replace_all(&decoded, |caps: &regex::Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}

/// Reduce an HTML fragment to readable text: drop script/style bodies,
/// strip tags, decode entities, collapse whitespace.
pub fn strip_tags(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_scripts, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Parse a price string like `"$1,234.56"` into a number.
pub fn parse_price_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value = cleaned.parse::<f64>().ok()?;
    (value > 0.0).then_some(value)
}

fn first_capture<'a>(patterns: &[Regex], text: &'a str) -> Option<&'a str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text)?.get(1).map(|m| m.as_str()))
}

/// Nightly price from raw page text. Patterns are tried in order; the
/// first match inside the sanity bounds wins.
pub fn find_nightly_price(text: &str) -> Option<f64> {
    for re in NIGHTLY_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            if let Some(price) = parse_price_str(&caps[1]) {
                if price_in_bounds(price) {
                    return Some(price);
                }
            }
        }
    }
    None
}

pub fn find_bedrooms(text: &str) -> Option<u32> {
    first_capture(&BEDROOM_PATTERNS, text)?.parse().ok()
}

pub fn find_bathrooms(text: &str) -> Option<f64> {
    first_capture(&BATHROOM_PATTERNS, text)?.parse().ok()
}

pub fn find_rating(text: &str) -> Option<f64> {
    let rating: f64 = first_capture(&RATING_PATTERNS, text)?.parse().ok()?;
    (rating > 0.0 && rating <= 5.0).then_some(rating)
}

pub fn find_review_count(text: &str) -> Option<u32> {
    first_capture(&REVIEW_COUNT_PATTERNS, text)?
        .replace(',', "")
        .parse()
        .ok()
}

/// Coordinates from inline scripts or JSON fragments. Requires both a
/// plausible latitude and longitude; `(0, 0)` stays the unknown sentinel.
pub fn find_coordinates(text: &str) -> Option<(f64, f64)> {
    let lat: f64 = first_capture(&LAT_PATTERNS, text)?.parse().ok()?;
    let lng: f64 = first_capture(&LNG_PATTERNS, text)?.parse().ok()?;
    let plausible =
        lat.abs() <= 90.0 && lng.abs() <= 180.0 && !(lat == 0.0 && lng == 0.0);
    plausible.then_some((lat, lng))
}

/// Verbatim "X min walk to the beach" style fragment, when present.
pub fn find_beach_distance(text: &str) -> Option<String> {
    BEACH_DISTANCE_RE
        .captures(text)
        .map(|caps| WHITESPACE_RE.replace_all(caps[1].trim(), " ").into_owned())
}

/// Tracking pixels and layout spacers masquerading as images.
pub fn is_tracking_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("1x1")
        || lower.contains("pixel")
        || lower.contains("spacer")
        || lower.contains("beacon")
        || lower.contains("tracking")
        || lower.ends_with(".svg")
}

/// First `cap` distinct non-tracking `<img src>` URLs in document order.
pub fn collect_image_urls(html: &str, cap: usize) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for caps in IMG_SRC_RE.captures_iter(html) {
        let url = decode_entities(&caps[1]);
        if !url.starts_with("http") || is_tracking_image(&url) {
            continue;
        }
        if urls.iter().any(|seen| *seen == url) {
            continue;
        }
        urls.push(url);
        if urls.len() >= cap {
            break;
        }
    }
    urls
}

/// `"ocean-view_condo"` to `"Ocean View Condo"`.
pub fn title_case_slug(slug: &str) -> String {
    slug.split(|c| c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
