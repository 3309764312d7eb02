use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::MovieInfo;
use crate::services::movie_info::lookup_movie;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct MovieInfoParams {
    name: String,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Handler for the movie info endpoint
pub async fn movie_info(
    State(state): State<AppState>,
    Query(params): Query<MovieInfoParams>,
) -> AppResult<Json<MovieInfo>> {
    let info = lookup_movie(
        state.trailers.as_ref(),
        state.scraper.as_ref(),
        &state.scrape_permits,
        &params.name,
    )
    .await?;

    Ok(Json(info))
}
