use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use tokio::time::{sleep, Duration};

use marquee_api::api::{create_router, AppState};
use marquee_api::error::{AppError, AppResult};
use marquee_api::models::MovieRecord;
use marquee_api::services::scraper::MovieScraper;
use marquee_api::services::trailer::TrailerProvider;

/// Trailer stub that always resolves the same watch URL
struct FixedTrailers {
    url: &'static str,
}

#[async_trait]
impl TrailerProvider for FixedTrailers {
    async fn trailer_url(&self, _title: &str) -> AppResult<String> {
        Ok(self.url.to_string())
    }
}

/// Trailer stub that never finds anything
struct NoTrailers;

#[async_trait]
impl TrailerProvider for NoTrailers {
    async fn trailer_url(&self, title: &str) -> AppResult<String> {
        Err(AppError::TrailerNotFound(format!(
            "nothing listed for {}",
            title
        )))
    }
}

/// Scraper stub that returns a fixed record and remembers the titles it saw
struct FixedScraper {
    record: MovieRecord,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FixedScraper {
    fn new(record: MovieRecord) -> (Self, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let scraper = Self {
            record,
            seen: Arc::clone(&seen),
        };
        (scraper, seen)
    }
}

#[async_trait]
impl MovieScraper for FixedScraper {
    async fn scrape_details(&self, title: &str) -> AppResult<MovieRecord> {
        self.seen.lock().unwrap().push(title.to_string());
        Ok(self.record.clone())
    }
}

/// Scraper stub that fails the way a stuck page would
struct TimingOutScraper;

#[async_trait]
impl MovieScraper for TimingOutScraper {
    async fn scrape_details(&self, _title: &str) -> AppResult<MovieRecord> {
        Err(AppError::NavigationTimeout(
            "timed out after 30s waiting for '.article'".to_string(),
        ))
    }
}

/// Scraper stub that tracks how many scrapes run at once
struct GatedScraper {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl GatedScraper {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let scraper = Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::clone(&max_in_flight),
        };
        (scraper, max_in_flight)
    }
}

#[async_trait]
impl MovieScraper for GatedScraper {
    async fn scrape_details(&self, _title: &str) -> AppResult<MovieRecord> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(MovieRecord::unavailable())
    }
}

fn create_test_server(
    trailers: Arc<dyn TrailerProvider>,
    scraper: Arc<dyn MovieScraper>,
    max_concurrent_scrapes: usize,
) -> TestServer {
    let state = AppState::new(trailers, scraper, max_concurrent_scrapes);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn matrix_record() -> MovieRecord {
    MovieRecord {
        title: "The Matrix (1999)".to_string(),
        rating: "8.7".to_string(),
        rating_count: "1,800,000".to_string(),
        poster_url: "https://img.example.test/matrix.jpg".to_string(),
        summary: "A computer hacker learns about the true nature of reality.".to_string(),
        director: "Lana Wachowski".to_string(),
        cast_photos: vec!["https://img.example.test/reeves.jpg".to_string()],
        cast_roles: vec!["Neo".to_string(), "Trinity".to_string()],
        cast_names: vec!["Keanu Reeves".to_string(), "Carrie-Anne Moss".to_string()],
    }
}

#[tokio::test]
async fn test_health_check() {
    let (scraper, _) = FixedScraper::new(matrix_record());
    let server = create_test_server(
        Arc::new(FixedTrailers {
            url: "https://www.youtube.com/watch?v=abc123XYZ9",
        }),
        Arc::new(scraper),
        2,
    );

    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_movie_info_happy_path() {
    let (scraper, seen) = FixedScraper::new(matrix_record());
    let server = create_test_server(
        Arc::new(FixedTrailers {
            url: "https://www.youtube.com/watch?v=abc123XYZ9",
        }),
        Arc::new(scraper),
        2,
    );

    let response = server
        .get("/api/v1/movies/info")
        .add_query_param("name", "The Matrix")
        .await;

    response.assert_status_ok();
    let info: serde_json::Value = response.json();

    assert_eq!(info["trailer"]["video_id"], "abc123XYZ9");
    assert_eq!(
        info["trailer"]["url"],
        "https://www.youtube.com/watch?v=abc123XYZ9"
    );
    assert_eq!(info["details"]["title"], "The Matrix (1999)");
    assert_eq!(info["details"]["director"], "Lana Wachowski");
    assert!(info["fetched_at"].is_string());

    // The scrape target sees the title with all whitespace stripped.
    assert_eq!(*seen.lock().unwrap(), vec!["TheMatrix".to_string()]);
}

#[tokio::test]
async fn test_missing_name_is_bad_request() {
    let (scraper, _) = FixedScraper::new(matrix_record());
    let server = create_test_server(
        Arc::new(FixedTrailers {
            url: "https://www.youtube.com/watch?v=abc123XYZ9",
        }),
        Arc::new(scraper),
        2,
    );

    let response = server.get("/api/v1/movies/info").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_name_is_bad_request() {
    let (scraper, seen) = FixedScraper::new(matrix_record());
    let server = create_test_server(
        Arc::new(FixedTrailers {
            url: "https://www.youtube.com/watch?v=abc123XYZ9",
        }),
        Arc::new(scraper),
        2,
    );

    let response = server
        .get("/api/v1/movies/info")
        .add_query_param("name", "   ")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "movie name must not be empty");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_trailer_failure_collapses_to_bad_gateway() {
    let (scraper, seen) = FixedScraper::new(matrix_record());
    let server = create_test_server(Arc::new(NoTrailers), Arc::new(scraper), 2);

    let response = server
        .get("/api/v1/movies/info")
        .add_query_param("name", "Obscure Film")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "movie lookup failed");

    // The trailer failure short-circuits the scrape entirely.
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_scrape_failure_collapses_to_bad_gateway() {
    let server = create_test_server(
        Arc::new(FixedTrailers {
            url: "https://www.youtube.com/watch?v=abc123XYZ9",
        }),
        Arc::new(TimingOutScraper),
        2,
    );

    let response = server
        .get("/api/v1/movies/info")
        .add_query_param("name", "The Matrix")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();

    // Same opaque message as every other pipeline failure; the timeout
    // details stay in the logs.
    assert_eq!(body["error"], "movie lookup failed");
    assert!(!body["error"].to_string().contains(".article"));
}

#[tokio::test]
async fn test_scrapes_respect_concurrency_cap() {
    let (scraper, max_in_flight) = GatedScraper::new();
    let server = create_test_server(
        Arc::new(FixedTrailers {
            url: "https://www.youtube.com/watch?v=abc123XYZ9",
        }),
        Arc::new(scraper),
        1,
    );

    let (first, second) = tokio::join!(
        server
            .get("/api/v1/movies/info")
            .add_query_param("name", "Heat"),
        server
            .get("/api/v1/movies/info")
            .add_query_param("name", "Ronin"),
    );

    first.assert_status_ok();
    second.assert_status_ok();
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}
