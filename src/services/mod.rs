pub mod movie_info;
pub mod scraper;
pub mod trailer;
