use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::services::scraper::MovieScraper;
use crate::services::trailer::TrailerProvider;

/// Shared application state
///
/// Holds the pluggable lookup backends plus the permit pool that bounds how
/// many browser scrapes may run at once.
#[derive(Clone)]
pub struct AppState {
    pub trailers: Arc<dyn TrailerProvider>,
    pub scraper: Arc<dyn MovieScraper>,
    pub scrape_permits: Arc<Semaphore>,
}

impl AppState {
    /// Creates application state with a bounded scrape pool
    pub fn new(
        trailers: Arc<dyn TrailerProvider>,
        scraper: Arc<dyn MovieScraper>,
        max_concurrent_scrapes: usize,
    ) -> Self {
        Self {
            trailers,
            scraper,
            scrape_permits: Arc::new(Semaphore::new(max_concurrent_scrapes)),
        }
    }
}
