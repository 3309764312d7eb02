use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder substituted for any scalar field with no extractable data,
/// so every field of a [`MovieRecord`] is always present.
pub const NOT_AVAILABLE: &str = "not available";

/// A free-text movie title as submitted by the caller
///
/// Carries both the raw form (fed to the trailer lookup) and a normalized
/// form with all whitespace stripped (typed into the scrape target's search
/// box). Immutable and request-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    pub raw: String,
    pub normalized: String,
}

impl MovieQuery {
    /// Creates a query from a raw title
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw.chars().filter(|c| !c.is_whitespace()).collect();
        Self { raw, normalized }
    }
}

/// Structured profile scraped from a movie detail page
///
/// Every scalar field holds either extracted data or the
/// [`NOT_AVAILABLE`] sentinel — never an absent value. The three cast
/// sequences are extracted independently and may have differing lengths;
/// consumers must not assume alignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub rating: String,
    pub rating_count: String,
    pub poster_url: String,
    pub summary: String,
    pub director: String,
    pub cast_photos: Vec<String>,
    pub cast_roles: Vec<String>,
    pub cast_names: Vec<String>,
}

impl MovieRecord {
    /// A record with every scalar at the sentinel and empty cast lists,
    /// i.e. what a blank detail page extracts to
    pub fn unavailable() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            rating: NOT_AVAILABLE.to_string(),
            rating_count: NOT_AVAILABLE.to_string(),
            poster_url: NOT_AVAILABLE.to_string(),
            summary: NOT_AVAILABLE.to_string(),
            director: NOT_AVAILABLE.to_string(),
            cast_photos: Vec::new(),
            cast_roles: Vec::new(),
            cast_names: Vec::new(),
        }
    }
}

/// Trailer reference resolved for a title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrailerClip {
    /// Platform video identifier extracted from the URL
    pub video_id: String,
    /// Full watch URL as returned by the resolver
    pub url: String,
}

/// Combined lookup result returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieInfo {
    pub trailer: TrailerClip,
    pub details: MovieRecord,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_strips_all_whitespace() {
        let query = MovieQuery::new("The Lord of the Rings");
        assert_eq!(query.raw, "The Lord of the Rings");
        assert_eq!(query.normalized, "TheLordoftheRings");
    }

    #[test]
    fn test_query_strips_tabs_and_newlines() {
        let query = MovieQuery::new(" Blade\tRunner\n2049 ");
        assert_eq!(query.normalized, "BladeRunner2049");
    }

    #[test]
    fn test_query_without_whitespace_is_unchanged() {
        let query = MovieQuery::new("Inception");
        assert_eq!(query.raw, query.normalized);
    }

    #[test]
    fn test_unavailable_record_has_sentinel_in_every_scalar() {
        let record = MovieRecord::unavailable();
        for field in [
            &record.title,
            &record.rating,
            &record.rating_count,
            &record.poster_url,
            &record.summary,
            &record.director,
        ] {
            assert_eq!(field, NOT_AVAILABLE);
        }
        assert!(record.cast_photos.is_empty());
        assert!(record.cast_roles.is_empty());
        assert!(record.cast_names.is_empty());
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = MovieRecord {
            title: "Inception".to_string(),
            rating: "8.8".to_string(),
            rating_count: "2,100,000".to_string(),
            poster_url: "https://m.media-amazon.com/images/inception.jpg".to_string(),
            summary: "A thief who steals corporate secrets.".to_string(),
            director: "Christopher Nolan".to_string(),
            cast_photos: vec!["https://m.media-amazon.com/images/cast1.jpg".to_string()],
            cast_roles: vec!["Cobb".to_string(), "Arthur".to_string()],
            cast_names: vec!["Leonardo DiCaprio".to_string()],
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: MovieRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
