//! The extraction output contract - a loosely-populated bag of everything
//! one pass over a listing page might learn.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// One bed line in a sleeping arrangement ("2 queen beds").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedEntry {
    pub bed_type: String,
    pub count: u32,
}

/// Kitchen capability, when a page states one.
///
/// `None` here is an affirmative "no kitchen"; an undetermined kitchen is
/// `Option::None` on the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kitchen {
    Full,
    Kitchenette,
    Microwave,
    None,
}

/// Best-effort room tag for a photo, derived from its caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Exterior,
    Bedroom,
    Bathroom,
    Kitchen,
    Pool,
    Living,
    View,
    Dining,
    Other,
}

impl PhotoCategory {
    /// Tag a photo from caption text. Returns `None` when nothing matches;
    /// callers decide whether untagged means `Other` or unset.
    pub fn from_caption(caption: &str) -> Option<PhotoCategory> {
        let lower = caption.to_lowercase();
        let table: [(&str, PhotoCategory); 12] = [
            ("bedroom", PhotoCategory::Bedroom),
            ("bed", PhotoCategory::Bedroom),
            ("bathroom", PhotoCategory::Bathroom),
            ("bath", PhotoCategory::Bathroom),
            ("kitchen", PhotoCategory::Kitchen),
            ("pool", PhotoCategory::Pool),
            ("hot tub", PhotoCategory::Pool),
            ("living", PhotoCategory::Living),
            ("lounge", PhotoCategory::Living),
            ("view", PhotoCategory::View),
            ("dining", PhotoCategory::Dining),
            ("exterior", PhotoCategory::Exterior),
        ];
        for (needle, category) in table {
            if lower.contains(needle) {
                return Some(category);
            }
        }
        if lower.contains("front") || lower.contains("outside") || lower.contains("garden") {
            return Some(PhotoCategory::Exterior);
        }
        None
    }
}

/// A listing photo in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub caption: Option<String>,
    pub category: Option<PhotoCategory>,
}

impl Photo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: None,
            category: None,
        }
    }

    /// Attach a caption and derive the category tag from it.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        let caption = caption.into();
        self.category = PhotoCategory::from_caption(&caption);
        self.caption = Some(caption);
        self
    }
}

/// Everything one scrape pass might learn about a rental listing.
///
/// Every field except `name`, `source`, `lat`, `lng` may be absent, and
/// absence means "not determined", never "false" or "zero". `lat`/`lng`
/// use exactly `(0, 0)` as the unknown sentinel; consumers must treat
/// that pair as missing, not as a real coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedListing {
    pub name: String,
    pub source: Platform,
    pub external_id: Option<String>,

    pub total_cost: Option<f64>,
    pub per_night: Option<f64>,
    pub cleaning_fee: Option<f64>,
    pub service_fee: Option<f64>,
    pub taxes: Option<f64>,
    pub currency: Option<String>,

    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub neighborhood: Option<String>,

    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub beds: Vec<BedEntry>,
    pub bathroom_notes: Option<String>,
    pub kitchen: Option<Kitchen>,
    pub kitchen_details: Option<String>,

    pub photos: Vec<Photo>,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub kid_friendly: Option<bool>,
    pub kid_notes: Option<String>,
    pub beach_type: Option<String>,
    pub beach_distance: Option<String>,

    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

impl ScrapedListing {
    /// An empty partial for a platform: no name, no data. The shape every
    /// strategy starts from.
    pub fn empty(source: Platform) -> Self {
        Self {
            name: String::new(),
            source,
            external_id: None,
            total_cost: None,
            per_night: None,
            cleaning_fee: None,
            service_fee: None,
            taxes: None,
            currency: None,
            lat: 0.0,
            lng: 0.0,
            address: None,
            neighborhood: None,
            bedrooms: None,
            bathrooms: None,
            beds: Vec::new(),
            bathroom_notes: None,
            kitchen: None,
            kitchen_details: None,
            photos: Vec::new(),
            description: None,
            amenities: Vec::new(),
            kid_friendly: None,
            kid_notes: None,
            beach_type: None,
            beach_distance: None,
            rating: None,
            review_count: None,
        }
    }

    /// Minimal total-failure result: a synthesized name and nothing else.
    ///
    /// `"Airbnb Listing 12345678"`, `"VRBO Listing"`, and so on.
    pub fn placeholder(source: Platform, external_id: Option<&str>) -> Self {
        let name = match external_id {
            Some(id) => format!("{} Listing {}", source.label(), id),
            None => format!("{} Listing", source.label()),
        };
        let mut listing = Self::empty(source);
        listing.name = name;
        listing.external_id = external_id.map(str::to_string);
        listing
    }

    /// At least one of nightly or total price present.
    pub fn has_price(&self) -> bool {
        self.per_night.is_some() || self.total_cost.is_some()
    }

    /// Coordinates other than the `(0, 0)` unknown sentinel.
    pub fn has_coords(&self) -> bool {
        self.lat != 0.0 || self.lng != 0.0
    }

    /// Append an amenity, first occurrence wins.
    pub fn push_amenity(&mut self, amenity: impl Into<String>) {
        let amenity = amenity.into();
        let trimmed = amenity.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self
            .amenities
            .iter()
            .any(|a| a.eq_ignore_ascii_case(trimmed))
        {
            self.amenities.push(trimmed.to_string());
        }
    }

    /// Backfill kitchen/kid/beach fields from amenity text when no
    /// strategy set them directly.
    pub fn infer_amenity_details(&mut self) {
        if self.kitchen.is_none() {
            if let Some((kitchen, detail)) = Self::kitchen_from_amenities(&self.amenities) {
                self.kitchen = Some(kitchen);
                if self.kitchen_details.is_none() {
                    self.kitchen_details = detail;
                }
            }
        }
        if self.kid_friendly.is_none() {
            if let Some(notes) = Self::kid_signals(&self.amenities) {
                self.kid_friendly = Some(true);
                if self.kid_notes.is_none() {
                    self.kid_notes = Some(notes);
                }
            }
        }
        if self.beach_type.is_none() {
            self.beach_type = Self::beach_signal(&self.amenities);
        }
    }

    fn kitchen_from_amenities(amenities: &[String]) -> Option<(Kitchen, Option<String>)> {
        let mut microwave: Option<&String> = None;
        for amenity in amenities {
            let lower = amenity.to_lowercase();
            if lower.contains("kitchenette") {
                return Some((Kitchen::Kitchenette, Some(amenity.clone())));
            }
            if lower.contains("kitchen") {
                let detail = (amenity.len() > "kitchen".len()).then(|| amenity.clone());
                return Some((Kitchen::Full, detail));
            }
            if lower.contains("microwave") {
                microwave = Some(amenity);
            }
        }
        microwave.map(|a| (Kitchen::Microwave, Some(a.clone())))
    }

    fn kid_signals(amenities: &[String]) -> Option<String> {
        let hits: Vec<&str> = amenities
            .iter()
            .filter(|a| {
                let lower = a.to_lowercase();
                ["crib", "high chair", "children", "kid", "family friendly", "pack 'n play"]
                    .iter()
                    .any(|needle| lower.contains(needle))
            })
            .map(String::as_str)
            .collect();
        if hits.is_empty() {
            None
        } else {
            Some(hits.join("; "))
        }
    }

    fn beach_signal(amenities: &[String]) -> Option<String> {
        for amenity in amenities {
            let lower = amenity.to_lowercase();
            if lower.contains("beachfront") {
                return Some("beachfront".to_string());
            }
            if lower.contains("beach access") || lower.contains("beach view") {
                return Some("beach access".to_string());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_carries_id_when_known() {
        let listing = ScrapedListing::placeholder(Platform::Airbnb, Some("12345678"));
        assert_eq!(listing.name, "Airbnb Listing 12345678");
        assert_eq!(listing.external_id.as_deref(), Some("12345678"));
        assert!(!listing.has_coords());
        assert!(!listing.has_price());

        let anonymous = ScrapedListing::placeholder(Platform::Vrbo, None);
        assert_eq!(anonymous.name, "VRBO Listing");
    }

    #[test]
    fn amenities_deduplicate_case_insensitively() {
        let mut listing = ScrapedListing::empty(Platform::Other);
        listing.push_amenity("Wifi");
        listing.push_amenity("wifi");
        listing.push_amenity("  ");
        listing.push_amenity("Pool");
        assert_eq!(listing.amenities, vec!["Wifi", "Pool"]);
    }

    #[test]
    fn kitchen_inference_prefers_full_over_microwave() {
        let mut listing = ScrapedListing::empty(Platform::Airbnb);
        listing.push_amenity("Microwave");
        listing.push_amenity("Full kitchen with dishwasher");
        listing.infer_amenity_details();
        assert_eq!(listing.kitchen, Some(Kitchen::Full));
        assert_eq!(
            listing.kitchen_details.as_deref(),
            Some("Full kitchen with dishwasher")
        );
    }

    #[test]
    fn microwave_only_when_no_kitchen_listed() {
        let mut listing = ScrapedListing::empty(Platform::Airbnb);
        listing.push_amenity("Microwave");
        listing.infer_amenity_details();
        assert_eq!(listing.kitchen, Some(Kitchen::Microwave));
    }

    #[test]
    fn kid_signals_collect_matching_amenities() {
        let mut listing = ScrapedListing::empty(Platform::Vrbo);
        listing.push_amenity("Crib");
        listing.push_amenity("High chair");
        listing.push_amenity("Wifi");
        listing.infer_amenity_details();
        assert_eq!(listing.kid_friendly, Some(true));
        assert_eq!(listing.kid_notes.as_deref(), Some("Crib; High chair"));
    }

    #[test]
    fn inference_never_overwrites_explicit_values() {
        let mut listing = ScrapedListing::empty(Platform::Airbnb);
        listing.kitchen = Some(Kitchen::Kitchenette);
        listing.kid_friendly = Some(false);
        listing.push_amenity("Full kitchen");
        listing.push_amenity("Crib");
        listing.infer_amenity_details();
        assert_eq!(listing.kitchen, Some(Kitchen::Kitchenette));
        assert_eq!(listing.kid_friendly, Some(false));
    }

    #[test]
    fn photo_caption_drives_category() {
        let photo = Photo::new("https://cdn.example.com/1.jpg").with_caption("Master bedroom");
        assert_eq!(photo.category, Some(PhotoCategory::Bedroom));

        let untagged = Photo::new("https://cdn.example.com/2.jpg").with_caption("Blue walls");
        assert_eq!(untagged.category, None);

        assert_eq!(
            PhotoCategory::from_caption("Ocean view from the deck"),
            Some(PhotoCategory::View)
        );
        assert_eq!(
            PhotoCategory::from_caption("Private pool at dusk"),
            Some(PhotoCategory::Pool)
        );
    }
}
