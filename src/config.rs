use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Landing page of the site the detail scraper drives
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// TMDB API key for trailer lookups
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Run the browser headless (disable to watch scrapes locally)
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Bound for every marker/quiescence wait, in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// How many browser instances may run at once
    #[serde(default = "default_max_concurrent_scrapes")]
    pub max_concurrent_scrapes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_search_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_scrapes() -> usize {
    2
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
