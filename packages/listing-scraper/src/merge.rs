//! Field-priority merge of two partial extraction results.
//!
//! The single reducer behind both strategy folding inside an extractor
//! and the mobile-retry merge in the pipeline. Primary wins ties; a
//! retry can only add information, never regress it.

use crate::classify::is_generic_name;
use crate::types::ScrapedListing;

/// Merge two partial results, primary first.
///
/// - name: prefer the non-generic candidate; both non-generic or both
///   generic keeps the primary's (a non-empty generic still beats an
///   empty one).
/// - scalar optionals: first non-null, primary checked first.
/// - `lat`/`lng`: exact `(0, 0)` is unknown; primary wins unless unknown.
/// - collections: the longer side wins, ties favor primary.
pub fn merge(primary: ScrapedListing, secondary: ScrapedListing) -> ScrapedListing {
    let name = merge_name(&primary.name, &secondary.name);
    let (lat, lng) = if primary.has_coords() {
        (primary.lat, primary.lng)
    } else {
        (secondary.lat, secondary.lng)
    };

    ScrapedListing {
        name,
        source: primary.source,
        external_id: primary.external_id.or(secondary.external_id),

        total_cost: primary.total_cost.or(secondary.total_cost),
        per_night: primary.per_night.or(secondary.per_night),
        cleaning_fee: primary.cleaning_fee.or(secondary.cleaning_fee),
        service_fee: primary.service_fee.or(secondary.service_fee),
        taxes: primary.taxes.or(secondary.taxes),
        currency: primary.currency.or(secondary.currency),

        lat,
        lng,
        address: primary.address.or(secondary.address),
        neighborhood: primary.neighborhood.or(secondary.neighborhood),

        bedrooms: primary.bedrooms.or(secondary.bedrooms),
        bathrooms: primary.bathrooms.or(secondary.bathrooms),
        beds: richer(primary.beds, secondary.beds),
        bathroom_notes: primary.bathroom_notes.or(secondary.bathroom_notes),
        kitchen: primary.kitchen.or(secondary.kitchen),
        kitchen_details: primary.kitchen_details.or(secondary.kitchen_details),

        photos: richer(primary.photos, secondary.photos),
        description: primary.description.or(secondary.description),
        amenities: richer(primary.amenities, secondary.amenities),
        kid_friendly: primary.kid_friendly.or(secondary.kid_friendly),
        kid_notes: primary.kid_notes.or(secondary.kid_notes),
        beach_type: primary.beach_type.or(secondary.beach_type),
        beach_distance: primary.beach_distance.or(secondary.beach_distance),

        rating: primary.rating.or(secondary.rating),
        review_count: primary.review_count.or(secondary.review_count),
    }
}

fn merge_name(primary: &str, secondary: &str) -> String {
    if !is_generic_name(primary) {
        return primary.to_string();
    }
    if !is_generic_name(secondary) {
        return secondary.to_string();
    }
    if !primary.trim().is_empty() {
        primary.to_string()
    } else {
        secondary.to_string()
    }
}

fn richer<T>(primary: Vec<T>, secondary: Vec<T>) -> Vec<T> {
    if secondary.len() > primary.len() {
        secondary
    } else {
        primary
    }
}
