use serde::Deserialize;

pub mod movie;

pub use movie::{MovieInfo, MovieQuery, MovieRecord, TrailerClip, NOT_AVAILABLE};

// ============================================================================
// TMDB API Types
// ============================================================================

/// TMDB movie search response
#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    pub results: Vec<TmdbMovie>,
}

/// One match from TMDB's movie search
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
}

/// TMDB video list response for a movie
#[derive(Debug, Deserialize)]
pub struct TmdbVideoList {
    pub results: Vec<TmdbVideo>,
}

/// One video entry attached to a TMDB movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    /// Platform-side video key (for YouTube, the watch id)
    pub key: String,
    /// Hosting platform, e.g. "YouTube"
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}
