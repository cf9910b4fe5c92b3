//! End-to-end orchestrator flows against the mock fetcher and the
//! in-memory store.

use std::sync::Arc;
use std::time::Duration;

use listing_scraper::testing::{page_with_og, page_with_text, MockFetcher};
use listing_scraper::{
    scrape_listing, Disguise, MemoryStore, Platform, ScrapeConfig, ScrapeJob, ScrapeStatus,
    PARTIAL_ADVISORY,
};

fn test_config() -> ScrapeConfig {
    // No courtesy delay in tests; API strategy off unless a test
    // provides the endpoint.
    ScrapeConfig::new()
        .without_airbnb_api()
        .with_retry_delay(Duration::ZERO)
}

const AIRBNB_URL: &str = "https://www.airbnb.com/rooms/12345678";
const VRBO_URL: &str = "https://www.vrbo.com/vacation-rentals/1234567";

#[tokio::test]
async fn airbnb_meta_fallback_scrape_completes() {
    // API unreachable (no endpoint canned), HTML page answers with OG tags.
    let fetcher = MockFetcher::new().with_page(
        AIRBNB_URL,
        page_with_og(
            "Cozy Beach House - Airbnb",
            Some("https://a0.muscache.com/x.jpg"),
            None,
        ),
    );
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-1", AIRBNB_URL);
    assert_eq!(job.platform, Platform::Airbnb);

    let status = scrape_listing(&store, &fetcher, &job, &ScrapeConfig::default()).await;

    assert_eq!(status, ScrapeStatus::Done);
    let update = store.update_of("listing-1").unwrap();
    assert_eq!(update.listing.name, "Cozy Beach House");
    assert_eq!(update.listing.external_id.as_deref(), Some("12345678"));
    assert_eq!(update.scrape_error, None);

    let photos = store.photos_for("listing-1");
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].url, "https://a0.muscache.com/x.jpg");
    assert_eq!(photos[0].sort_order, 0);
}

#[tokio::test]
async fn total_fetch_failure_lands_partial_with_advisory() {
    let fetcher = MockFetcher::new().with_page_failure(VRBO_URL);
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-2", VRBO_URL);

    let status = scrape_listing(&store, &fetcher, &job, &test_config()).await;

    assert_eq!(status, ScrapeStatus::Partial);
    assert_eq!(store.status_of("listing-2"), Some(ScrapeStatus::Partial));
    let update = store.update_of("listing-2").unwrap();
    assert_eq!(update.listing.name, "VRBO Listing 1234567");
    assert_eq!(update.listing.lat, 0.0);
    assert_eq!(update.listing.lng, 0.0);
    assert!(update.listing.photos.is_empty());
    assert_eq!(update.scrape_error.as_deref(), Some(PARTIAL_ADVISORY));
    // Both disguises were attempted before giving up.
    assert_eq!(
        fetcher.disguises_for(VRBO_URL),
        vec![Disguise::Desktop, Disguise::Mobile]
    );
}

#[tokio::test]
async fn vrbo_text_only_page_yields_price_and_bedrooms() {
    let fetcher = MockFetcher::new().with_page(
        VRBO_URL,
        page_with_text("Lovely home, 3 bedroom, at $245 per night."),
    );
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-3", VRBO_URL);

    let status = scrape_listing(&store, &fetcher, &job, &test_config()).await;

    assert_eq!(status, ScrapeStatus::Done);
    let update = store.update_of("listing-3").unwrap();
    assert_eq!(update.listing.per_night, Some(245.0));
    assert_eq!(update.listing.bedrooms, Some(3));
}

#[tokio::test]
async fn mobile_retry_rescues_a_partial_primary() {
    // Desktop serves an empty shell; mobile serves real data.
    let fetcher = MockFetcher::new()
        .with_desktop_page(VRBO_URL, "<html><body></body></html>")
        .with_mobile_page(
            VRBO_URL,
            r#"<html><head>
                <meta property="og:image" content="https://images.trvl-media.com/a.jpg">
            </head><body>From $310 per night.</body></html>"#,
        );
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-4", VRBO_URL);

    let status = scrape_listing(&store, &fetcher, &job, &test_config()).await;

    assert_eq!(status, ScrapeStatus::Done);
    let update = store.update_of("listing-4").unwrap();
    assert_eq!(update.listing.per_night, Some(310.0));
    assert_eq!(update.listing.photos.len(), 1);
    assert_eq!(update.scrape_error, None);
    assert_eq!(store.photos_for("listing-4").len(), 1);
}

#[tokio::test]
async fn failed_retry_keeps_the_primary_partial() {
    let fetcher = MockFetcher::new()
        .with_desktop_page(VRBO_URL, "<html><body></body></html>")
        .with_disguise_failure(VRBO_URL, Disguise::Mobile);
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-5", VRBO_URL);

    let status = scrape_listing(&store, &fetcher, &job, &test_config()).await;

    assert_eq!(status, ScrapeStatus::Partial);
    let update = store.update_of("listing-5").unwrap();
    assert_eq!(update.listing.name, "VRBO Listing 1234567");
    assert_eq!(update.scrape_error.as_deref(), Some(PARTIAL_ADVISORY));
}

#[tokio::test]
async fn usable_primary_skips_the_retry_fetch() {
    let fetcher = MockFetcher::new().with_page(
        VRBO_URL,
        page_with_og("Dune Cottage | VRBO", None, Some("Quiet end of the island")),
    );
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-6", VRBO_URL);

    scrape_listing(&store, &fetcher, &job, &test_config()).await;

    assert_eq!(fetcher.disguises_for(VRBO_URL), vec![Disguise::Desktop]);
}

#[tokio::test]
async fn persistence_failure_records_failed_status() {
    let fetcher = MockFetcher::new().with_page(
        VRBO_URL,
        page_with_og("Dune Cottage | VRBO", None, None),
    );
    let store = MemoryStore::new().with_failing_saves();
    let job = ScrapeJob::from_url("listing-7", VRBO_URL);

    let status = scrape_listing(&store, &fetcher, &job, &test_config()).await;

    assert_eq!(status, ScrapeStatus::Failed);
    assert_eq!(store.status_of("listing-7"), Some(ScrapeStatus::Failed));
    let message = store.error_of("listing-7").unwrap();
    assert!(message.contains("simulated save failure"));
}

#[tokio::test]
async fn rescrape_of_unchanged_page_is_idempotent() {
    let fetcher = MockFetcher::new().with_page(
        AIRBNB_URL,
        page_with_og("Cozy Beach House - Airbnb", Some("https://a0.muscache.com/x.jpg"), None),
    );
    let store = MemoryStore::new();
    let job = ScrapeJob::from_url("listing-8", AIRBNB_URL);
    let config = test_config();

    let first = scrape_listing(&store, &fetcher, &job, &config).await;
    let first_update = store.update_of("listing-8").unwrap();

    // Upstream clears photos before requesting a re-scrape.
    store.clear_photos("listing-8");
    let second = scrape_listing(&store, &fetcher, &job, &config).await;
    let second_update = store.update_of("listing-8").unwrap();

    assert_eq!(first, second);
    assert_eq!(first_update.listing, second_update.listing);
    assert_eq!(store.photos_for("listing-8").len(), 1);
}

#[tokio::test]
async fn concurrent_jobs_do_not_interfere() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_page(
                AIRBNB_URL,
                page_with_og("Cozy Beach House - Airbnb", None, Some("By the water")),
            )
            .with_page_failure(VRBO_URL),
    );
    let store = Arc::new(MemoryStore::new());
    let config = test_config();

    let a = {
        let (store, fetcher, config) = (store.clone(), fetcher.clone(), config.clone());
        tokio::spawn(async move {
            let job = ScrapeJob::from_url("listing-a", AIRBNB_URL);
            scrape_listing(store.as_ref(), fetcher.as_ref(), &job, &config).await
        })
    };
    let b = {
        let (store, fetcher, config) = (store.clone(), fetcher.clone(), config.clone());
        tokio::spawn(async move {
            let job = ScrapeJob::from_url("listing-b", VRBO_URL);
            scrape_listing(store.as_ref(), fetcher.as_ref(), &job, &config).await
        })
    };

    assert_eq!(a.await.unwrap(), ScrapeStatus::Done);
    assert_eq!(b.await.unwrap(), ScrapeStatus::Partial);
    assert_eq!(store.status_of("listing-a"), Some(ScrapeStatus::Done));
    assert_eq!(store.status_of("listing-b"), Some(ScrapeStatus::Partial));
}
