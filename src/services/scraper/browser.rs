use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;

use super::{ScraperSettings, SearchSession};
use crate::error::{AppError, AppResult};

/// Search box on the landing page
const SEARCH_INPUT: &str = "#suggestion-search";
/// Button that submits the search box
const SEARCH_BUTTON: &str = "#suggestion-search-button";

/// Flags passed to the browser process; the sandbox and /dev/shm flags keep
/// Chromium usable inside containers.
const BROWSER_ARGS: [&str; 3] = ["--no-sandbox", "--disable-gpu", "--disable-dev-shm-usage"];

/// Cadence of page polls while waiting for markers or quiescence
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Consecutive quiet polls before the landing page counts as settled
const QUIET_SAMPLES: u32 = 3;

/// Probe evaluated in the page to judge whether loading has finished
const PAGE_ACTIVITY_JS: &str = "({ ready: document.readyState === 'complete', \
     resources: performance.getEntriesByType('resource').length })";

/// Snapshot of in-page loading activity
#[derive(Debug, Deserialize)]
struct PageActivity {
    ready: bool,
    resources: u64,
}

/// A [`SearchSession`] backed by one dedicated Chromium process
///
/// Every session owns its own browser, page, and event-drain task, so
/// concurrent lookups never share state.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl BrowserSession {
    /// Launches a fresh browser and opens a blank page
    pub async fn launch(settings: &ScraperSettings) -> AppResult<Self> {
        let mut builder = BrowserConfig::builder().args(BROWSER_ARGS);
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(AppError::Internal)?;

        let (mut browser, mut handler) = Browser::launch(config).await?;

        let handler_task = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(error) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(error.into());
            }
        };

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: settings.navigation_timeout,
        })
    }

    async fn probe_activity(&self) -> AppResult<PageActivity> {
        let evaluated = self.page.evaluate(PAGE_ACTIVITY_JS).await?;
        evaluated
            .into_value()
            .map_err(|e| AppError::Internal(format!("malformed page activity probe: {}", e)))
    }

    /// Waits until the document is complete and its resource count has been
    /// stable for [`QUIET_SAMPLES`] consecutive polls
    async fn settle(&self, timeout: Duration) -> AppResult<()> {
        let deadline = Instant::now() + timeout;
        let mut last_resources = None;
        let mut quiet_polls = 0;

        while Instant::now() < deadline {
            match self.probe_activity().await {
                Ok(activity) => {
                    if activity.ready && last_resources == Some(activity.resources) {
                        quiet_polls += 1;
                        if quiet_polls >= QUIET_SAMPLES {
                            return Ok(());
                        }
                    } else {
                        quiet_polls = 0;
                    }
                    last_resources = Some(activity.resources);
                }
                // Probes can land mid-navigation when the page redirects;
                // count that as activity and keep polling.
                Err(error) => {
                    tracing::debug!(error = %error, "Page activity probe failed; retrying");
                    quiet_polls = 0;
                    last_resources = None;
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }

        Err(AppError::NavigationTimeout(format!(
            "landing page did not settle within {:?}",
            timeout
        )))
    }
}

#[async_trait]
impl SearchSession for BrowserSession {
    async fn open_landing_page(&self, url: &str) -> AppResult<()> {
        tracing::debug!(url = %url, "Opening landing page");
        self.page.goto(url).await?;
        self.settle(self.navigation_timeout).await
    }

    async fn submit_search(&self, query: &str) -> AppResult<()> {
        self.page
            .find_element(SEARCH_INPUT)
            .await?
            .click()
            .await?
            .type_str(query)
            .await?;

        self.page.find_element(SEARCH_BUTTON).await?.click().await?;

        Ok(())
    }

    async fn wait_for_marker(&self, selector: &str, timeout: Duration) -> AppResult<()> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::NavigationTimeout(format!(
                    "timed out after {:?} waiting for '{}'",
                    timeout, selector
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn result_row_count(&self, selector: &str) -> AppResult<usize> {
        Ok(self.page.find_elements(selector).await?.len())
    }

    async fn open_result(&self, selector: &str, index: usize) -> AppResult<()> {
        let rows = self.page.find_elements(selector).await?;
        let row = rows
            .get(index)
            .ok_or_else(|| AppError::NoResultsFound(format!("result row {} not present", index)))?;
        row.click().await?;
        Ok(())
    }

    async fn dom_snapshot(&self) -> AppResult<String> {
        Ok(self.page.content().await?)
    }

    async fn shutdown(mut self) {
        if let Err(error) = self.browser.close().await {
            tracing::warn!(error = %error, "Browser close failed during shutdown");
        }
        if let Err(error) = self.browser.wait().await {
            tracing::warn!(error = %error, "Browser process did not exit cleanly");
        }
        self.handler_task.abort();
    }
}
