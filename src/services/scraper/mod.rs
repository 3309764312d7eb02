mod browser;
mod extract;

pub use browser::BrowserSession;
pub use extract::{Arity, ExtractMode, ExtractionSchema, FieldSpec};

use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::MovieRecord;

/// Marker that appears once the search result listing has rendered
const RESULTS_MARKER: &str = ".article";
/// Anchor of each row in the result listing
const RESULT_ROWS: &str = r#"td[class="result_text"] > a"#;
/// Marker that appears once the detail page has rendered its cast table
const DETAIL_MARKER: &str = ".castlist_label";

/// Fetches the detail record for a movie title.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieScraper: Send + Sync {
    /// Looks `title` up on the search site and scrapes its detail page.
    async fn scrape_details(&self, title: &str) -> AppResult<MovieRecord>;
}

/// One live search session, from landing page to detail snapshot
///
/// The pipeline drives a session through the search flow and consumes it on
/// [`SearchSession::shutdown`], so a session cannot outlive its lookup.
#[async_trait]
pub trait SearchSession: Send + Sized {
    /// Opens the landing page and waits for it to settle.
    async fn open_landing_page(&self, url: &str) -> AppResult<()>;

    /// Types the query into the search box and submits it.
    async fn submit_search(&self, query: &str) -> AppResult<()>;

    /// Waits until `selector` matches, or fails with a navigation timeout.
    async fn wait_for_marker(&self, selector: &str, timeout: Duration) -> AppResult<()>;

    /// Counts the elements matching `selector`.
    async fn result_row_count(&self, selector: &str) -> AppResult<usize>;

    /// Clicks the `index`-th element matching `selector`.
    async fn open_result(&self, selector: &str, index: usize) -> AppResult<()>;

    /// Captures the serialized DOM of the current page.
    async fn dom_snapshot(&self) -> AppResult<String>;

    /// Tears the session down. Runs on every path, success or failure.
    async fn shutdown(self);
}

/// Tunables for the browser-driven scrape
#[derive(Clone, Debug)]
pub struct ScraperSettings {
    pub base_url: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
}

impl ScraperSettings {
    /// Builds settings from application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.search_base_url.clone(),
            headless: config.headless,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        }
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.imdb.com".to_string(),
            headless: true,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs the search flow on `session`, then shuts the session down regardless
/// of outcome.
pub async fn scrape_with<S: SearchSession>(
    session: S,
    query: &str,
    settings: &ScraperSettings,
    schema: &ExtractionSchema,
) -> AppResult<MovieRecord> {
    let outcome = run_pipeline(&session, query, settings, schema).await;
    session.shutdown().await;
    outcome
}

async fn run_pipeline<S: SearchSession>(
    session: &S,
    query: &str,
    settings: &ScraperSettings,
    schema: &ExtractionSchema,
) -> AppResult<MovieRecord> {
    let timeout = settings.navigation_timeout;

    session.open_landing_page(&settings.base_url).await?;
    session.submit_search(query).await?;
    session.wait_for_marker(RESULTS_MARKER, timeout).await?;

    let rows = session.result_row_count(RESULT_ROWS).await?;
    if rows == 0 {
        return Err(AppError::NoResultsFound(format!(
            "search returned no result rows for '{}'",
            query
        )));
    }
    tracing::debug!(rows, "Search results rendered");

    session.open_result(RESULT_ROWS, 0).await?;
    session.wait_for_marker(DETAIL_MARKER, timeout).await?;

    let snapshot = session.dom_snapshot().await?;
    schema.extract(&snapshot)
}

/// Production scraper: one fresh browser per lookup
pub struct DetailScraper {
    settings: ScraperSettings,
    schema: ExtractionSchema,
}

impl DetailScraper {
    /// Creates a new scraper from application configuration
    pub fn new(config: &Config) -> Self {
        Self {
            settings: ScraperSettings::from_config(config),
            schema: ExtractionSchema::movie_details(),
        }
    }
}

#[async_trait]
impl MovieScraper for DetailScraper {
    async fn scrape_details(&self, title: &str) -> AppResult<MovieRecord> {
        tracing::info!(title = %title, "Scraping movie details");

        let session = BrowserSession::launch(&self.settings).await?;
        let record = scrape_with(session, title, &self.settings, &self.schema).await?;

        tracing::info!(title = %title, scraped_title = %record.title, "Scrape complete");

        Ok(record)
    }
}
