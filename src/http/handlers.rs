use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::auth::RequestUser;
use super::error::{ApiError, ValidatedJson};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: String,
}

/// Run the content-generation pipeline for one submitted link
#[tracing::instrument(skip_all, fields(user_id = %user.0))]
pub async fn generate_post(
    State(state): State<AppState>,
    user: RequestUser,
    ValidatedJson(req): ValidatedJson<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.pipeline.run(user.0, &req.link).await?;

    Ok(Json(GenerateResponse {
        content: post.content,
    }))
}

/// List the requesting user's posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    user: RequestUser,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list_by_owner(user.0).await?;
    Ok(Json(posts))
}

/// Fetch one post; 404 unless it exists and belongs to the requesting user
pub async fn get_post(
    State(state): State<AppState>,
    user: RequestUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .posts
        .get_by_id(id)
        .await?
        .filter(|post| post.owner_id == user.0)
        .ok_or(ApiError::NotFound("Post not found"))?;

    Ok(Json(post))
}

/// Liveness check
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
