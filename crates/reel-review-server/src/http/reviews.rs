use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use reel_review_core::{CommentDraft, ReviewDraft, ReviewPatch};
use reel_review_models::{Comment, Review};
use serde_json::{json, Value};
use crate::http::auth::AuthUser;
use crate::http::error::AppResult;
use crate::http::extract::ApiJson;
use crate::http::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/:review_id", get(get_review).put(update_review).delete(delete_review))
        .route("/:review_id/comments", post(add_comment))
        .route(
            "/:review_id/comments/:comment_id",
            put(update_comment).delete(delete_comment),
        )
}

async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.list().await?))
}

async fn create_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ReviewDraft>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.reviews.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn get_review(State(state): State<AppState>, Path(review_id): Path<String>) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.get(&review_id).await?))
}

async fn update_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    ApiJson(patch): ApiJson<ReviewPatch>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.update(&user, &review_id, patch).await?))
}

async fn delete_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> AppResult<Json<Value>> {
    state.reviews.delete(&user, &review_id).await?;
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}

async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    ApiJson(draft): ApiJson<CommentDraft>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = state.reviews.add_comment(&user, &review_id, draft).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn update_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((review_id, comment_id)): Path<(String, String)>,
    ApiJson(draft): ApiJson<CommentDraft>,
) -> AppResult<Json<Value>> {
    state
        .reviews
        .update_comment(&user, &review_id, &comment_id, draft)
        .await?;
    Ok(Json(json!({ "message": "Comment updated successfully" })))
}

async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((review_id, comment_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    state
        .reviews
        .delete_comment(&user, &review_id, &comment_id)
        .await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
