//! Partial-result classification: is an extraction "good enough", or a
//! failed scrape wearing a placeholder name?

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::ScrapedListing;

/// Placeholder prefixes a failed or degraded scrape synthesizes for a
/// name. Matched case-insensitively against the start of the name.
const GENERIC_NAME_PREFIXES: [&str; 7] = [
    "loading...",
    "listing from",
    "airbnb listing",
    "vrbo listing",
    "booking.com listing",
    "other listing",
    "untitled",
];

lazy_static! {
    // Bare platform tokens: "Airbnb 123", "Vrbo", "Booking.com 99".
    static ref BARE_PLATFORM_RE: Regex =
        Regex::new(r"(?i)^(?:airbnb|vrbo|booking(?:\.com)?|other)(?:\s+\d+)?$").unwrap();
}

/// Whether a name carries no real information about the listing.
pub fn is_generic_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    GENERIC_NAME_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
        || BARE_PLATFORM_RE.is_match(trimmed)
}

/// Whether an extraction result is partial: a generic name AND not
/// enough real data to be usable.
///
/// Two alternate "not enough" conditions: no price and no photos, or no
/// price, no bedroom count, and no description. A generic name with real
/// photos and a price still counts as usable.
pub fn is_partial(listing: &ScrapedListing) -> bool {
    if !is_generic_name(&listing.name) {
        return false;
    }
    let no_price = !listing.has_price();
    let no_photos = listing.photos.is_empty();
    let no_rooms_or_text = listing.bedrooms.is_none() && listing.description.is_none();
    (no_price && no_photos) || (no_price && no_rooms_or_text)
}
