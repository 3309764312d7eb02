use std::sync::Arc;

use axum::middleware;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use marquee_api::api::{create_router, AppState};
use marquee_api::config::Config;
use marquee_api::middleware::{attach_request_id, request_span};
use marquee_api::services::scraper::DetailScraper;
use marquee_api::services::trailer::TmdbTrailerProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let trailers = Arc::new(TmdbTrailerProvider::new(&config));
    let scraper = Arc::new(DetailScraper::new(&config));
    let state = AppState::new(trailers, scraper, config.max_concurrent_scrapes);

    // Request ids are attached outermost so the trace spans can pick them up.
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(attach_request_id))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(CorsLayer::permissive()),
    );

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
