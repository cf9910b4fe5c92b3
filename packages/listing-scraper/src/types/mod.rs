//! Core types shared across the pipeline.

pub mod job;
pub mod listing;

pub use job::{ListingUpdate, PhotoRecord, ScrapeJob, ScrapeStatus};
pub use listing::{BedEntry, Kitchen, Photo, PhotoCategory, ScrapedListing};
