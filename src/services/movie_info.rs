use chrono::Utc;
use tokio::sync::Semaphore;

use crate::error::{AppError, AppResult};
use crate::models::{MovieInfo, MovieQuery, TrailerClip};
use crate::services::scraper::MovieScraper;
use crate::services::trailer::{extract_video_id, TrailerProvider};

/// Resolves trailer and detail data for one movie title.
///
/// The trailer lookup runs first and short-circuits the browser scrape when
/// it fails. The scrape itself holds one of the shared permits, so the
/// number of live browsers stays bounded even under concurrent requests.
pub async fn lookup_movie(
    trailers: &dyn TrailerProvider,
    scraper: &dyn MovieScraper,
    scrape_permits: &Semaphore,
    raw_title: &str,
) -> AppResult<MovieInfo> {
    if raw_title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "movie name must not be empty".to_string(),
        ));
    }

    let query = MovieQuery::new(raw_title);

    let trailer_url = trailers.trailer_url(&query.raw).await?;
    let video_id = extract_video_id(&trailer_url).ok_or_else(|| {
        AppError::TrailerNotFound(format!("unrecognized video url shape: {}", trailer_url))
    })?;

    let details = {
        let _permit = scrape_permits
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("scrape permit pool closed: {}", e)))?;
        scraper.scrape_details(&query.normalized).await?
    };

    Ok(MovieInfo {
        trailer: TrailerClip {
            video_id,
            url: trailer_url,
        },
        details,
        fetched_at: Utc::now(),
    })
}
