//! Parsing layers shared by the extractors: meta tags, JSON-LD,
//! embedded-state flattening, and raw-text regexes.

pub mod flatten;
pub mod jsonld;
pub mod meta;
pub mod text;

use serde_json::Value;

/// Cap on photos collected from any single source.
pub const MAX_PHOTOS: usize = 20;

/// Number or numeric string, the two shapes third-party JSON uses
/// interchangeably.
pub fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
