//! Run the listing scraper against a single URL from the terminal.
//!
//! Scrapes into the in-memory store and prints the persisted outcome,
//! as text or JSON. Useful for poking at a live listing page without
//! the rest of the application.

use anyhow::{Context, Result};
use clap::Parser;
use listing_scraper::{
    detect_platform, scrape_listing, HttpFetcher, MemoryStore, Platform, ScrapeConfig,
    ScrapeJob, ScrapeStatus,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "scrape-cli")]
#[command(about = "Scrape one vacation-rental listing URL and print the result")]
struct Cli {
    /// Listing URL to scrape
    url: String,

    /// Override platform detection (airbnb, vrbo, booking, other)
    #[arg(long)]
    platform: Option<String>,

    /// Disable the Airbnb API strategy
    #[arg(long)]
    no_api: bool,

    /// Print the stored update as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbose logging (debug level for the scraper)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "listing_scraper=debug,scrape_cli=debug"
    } else {
        "listing_scraper=info,scrape_cli=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let platform = match cli.platform.as_deref() {
        Some(name) => parse_platform(name)?,
        None => detect_platform(&cli.url),
    };

    let mut config = ScrapeConfig::from_env();
    if cli.no_api {
        config = config.without_airbnb_api();
    }

    let fetcher = HttpFetcher::new().context("failed to build HTTP client")?;
    let store = MemoryStore::new();
    let listing_id = Uuid::new_v4().to_string();
    let job = ScrapeJob::new(&listing_id, &cli.url, platform);

    let status = scrape_listing(&store, &fetcher, &job, &config).await;

    if cli.json {
        print_json(&store, &listing_id, status)?;
    } else {
        print_text(&store, &listing_id, status);
    }

    Ok(())
}

fn parse_platform(name: &str) -> Result<Platform> {
    match name.to_lowercase().as_str() {
        "airbnb" => Ok(Platform::Airbnb),
        "vrbo" => Ok(Platform::Vrbo),
        "booking" => Ok(Platform::Booking),
        "other" => Ok(Platform::Other),
        other => anyhow::bail!("unknown platform '{}' (expected airbnb, vrbo, booking, other)", other),
    }
}

fn print_json(store: &MemoryStore, listing_id: &str, status: ScrapeStatus) -> Result<()> {
    let output = serde_json::json!({
        "status": status,
        "update": store.update_of(listing_id),
        "photos": store.photos_for(listing_id),
        "error": store.error_of(listing_id),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(store: &MemoryStore, listing_id: &str, status: ScrapeStatus) {
    println!("status: {}", status);

    let Some(update) = store.update_of(listing_id) else {
        if let Some(error) = store.error_of(listing_id) {
            println!("error:  {}", error);
        }
        return;
    };
    let listing = &update.listing;

    println!("name:   {}", listing.name);
    println!("source: {}", listing.source);
    if let Some(id) = &listing.external_id {
        println!("id:     {}", id);
    }
    if let Some(price) = listing.per_night {
        println!("price:  ${:.0}/night", price);
    }
    if let Some(bedrooms) = listing.bedrooms {
        println!("beds:   {} bedroom(s)", bedrooms);
    }
    if let Some(bathrooms) = listing.bathrooms {
        println!("baths:  {}", bathrooms);
    }
    if listing.lat != 0.0 || listing.lng != 0.0 {
        println!("coords: {}, {}", listing.lat, listing.lng);
    }
    if let Some(rating) = listing.rating {
        match listing.review_count {
            Some(count) => println!("rating: {} ({} reviews)", rating, count),
            None => println!("rating: {}", rating),
        }
    }
    if !listing.amenities.is_empty() {
        println!("amenities: {}", listing.amenities.join(", "));
    }
    let photos = store.photos_for(listing_id);
    if !photos.is_empty() {
        println!("photos: {}", photos.len());
        for photo in photos.iter().take(5) {
            println!("  - {}", photo.url);
        }
    }
    if let Some(error) = &update.scrape_error {
        println!("note:   {}", error);
    }
}
