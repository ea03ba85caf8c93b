use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use crate::http::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let cache = state.movies.client().cache();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cachedResponses": cache.len(),
        "upstreamConfigured": state.movies.client().has_api_key(),
    }))
}
