use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use reel_review_models::Movie;
use reel_review_sources::tmdb::api::DEFAULT_IMAGE_SIZE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::http::error::AppResult;
use crate::http::extract::{empty_as_none, ApiQuery};
use crate::http::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/popular", get(popular))
        .route("/search", get(search))
        .route("/:id", get(movie))
        .route("/:id/recommendations", get(recommendations))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u32>,
}

async fn popular(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.movies.popular(q.page).await?))
}

async fn search(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SearchQuery>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.movies.search(&q.query, q.page).await?))
}

/// Mirrored movie plus absolute image URLs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    #[serde(flatten)]
    pub movie: Movie,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

async fn movie(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<MovieResponse>> {
    let movie = state.movies.get_movie(&id).await?;
    let client = state.movies.client();
    Ok(Json(MovieResponse {
        poster_url: client.image_url(movie.poster_path.as_deref(), DEFAULT_IMAGE_SIZE),
        backdrop_url: client.image_url(movie.backdrop_path.as_deref(), DEFAULT_IMAGE_SIZE),
        movie,
    }))
}

async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> AppResult<Json<Value>> {
    Ok(Json(state.movies.recommendations(&id, q.page).await?))
}
