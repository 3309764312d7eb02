use async_trait::async_trait;
use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{TmdbSearchResponse, TmdbVideo, TmdbVideoList};

/// Resolves a movie title to a playable trailer URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrailerProvider: Send + Sync {
    /// Returns the watch URL of the best trailer for `title`.
    async fn trailer_url(&self, title: &str) -> AppResult<String>;
}

/// Trailer lookup backed by the TMDB API
///
/// Resolution is a two-step flow: search for the movie by title, then list
/// its videos and pick the first YouTube trailer.
pub struct TmdbTrailerProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbTrailerProvider {
    /// Creates a new TMDB provider from application configuration
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.tmdb_api_key.clone(),
            base_url: config.tmdb_api_url.clone(),
        }
    }

    /// Searches TMDB for a movie and returns the id of the first match
    async fn search_movie_id(&self, title: &str) -> AppResult<u64> {
        let url = format!("{}/search/movie", self.base_url);

        tracing::debug!(title = %title, "Searching TMDB for movie");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB search failed with status {}: {}",
                status, body
            )));
        }

        let search = response.json::<TmdbSearchResponse>().await?;

        let movie = search
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::TrailerNotFound(format!("no TMDB match for '{}'", title)))?;

        tracing::debug!(movie_id = movie.id, matched_title = %movie.title, "TMDB search matched");

        Ok(movie.id)
    }

    /// Fetches the video list attached to a TMDB movie
    async fn fetch_videos(&self, movie_id: u64) -> AppResult<TmdbVideoList> {
        let url = format!("{}/movie/{}/videos", self.base_url, movie_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB videos lookup failed with status {}: {}",
                status, body
            )));
        }

        Ok(response.json::<TmdbVideoList>().await?)
    }

    /// Picks the key of the first YouTube trailer, falling back to the first
    /// YouTube video of any kind
    fn first_video_key(videos: &[TmdbVideo]) -> Option<&str> {
        videos
            .iter()
            .find(|video| video.site == "YouTube" && video.video_type == "Trailer")
            .or_else(|| videos.iter().find(|video| video.site == "YouTube"))
            .map(|video| video.key.as_str())
    }
}

#[async_trait]
impl TrailerProvider for TmdbTrailerProvider {
    async fn trailer_url(&self, title: &str) -> AppResult<String> {
        let movie_id = self.search_movie_id(title).await?;
        let videos = self.fetch_videos(movie_id).await?;

        let key = Self::first_video_key(&videos.results).ok_or_else(|| {
            AppError::TrailerNotFound(format!("no YouTube trailer listed for '{}'", title))
        })?;

        tracing::info!(title = %title, video_key = %key, "Resolved trailer");

        Ok(format!("https://www.youtube.com/watch?v={}", key))
    }
}

/// Pulls the video id out of a YouTube watch URL.
///
/// Recognized shapes, tried in order: short links (`youtu.be/<id>`),
/// `/v/<id>`, legacy upload paths (`/u/<segment>/<id>`), `/embed/<id>`,
/// and query-string forms (`?v=<id>`, `&v=<id>`). The id runs until the
/// first `#`, `&`, or `?`. Returns `None` when no shape matches or the
/// matched id is empty.
pub fn extract_video_id(url: &str) -> Option<String> {
    const MARKERS: [&str; 6] = ["youtu.be/", "/v/", "/u/", "/embed/", "?v=", "&v="];

    for marker in MARKERS {
        let Some(position) = url.find(marker) else {
            continue;
        };

        let mut rest = &url[position + marker.len()..];

        // Upload paths carry one channel segment before the id.
        if marker == "/u/" {
            rest = match rest.split_once('/') {
                Some((_, after)) => after,
                None => return None,
            };
        }

        let id: String = rest
            .chars()
            .take_while(|c| !matches!(c, '#' | '&' | '?'))
            .collect();

        return if id.is_empty() { None } else { Some(id) };
    }

    None
}
