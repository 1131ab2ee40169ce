//! dashboard.rs
//!
//! Posts CRUD backed by the placeholder REST API.
//!
//! The upstream accepts writes but never stores them, so a created or updated
//! post is echoed back and a later read will not see it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::{ApiResult, AppError};
use crate::models::{CreatePost, Post, UpdatePost};
use crate::AppState;

/// The dashboard only ever shows the first few posts.
pub const DASHBOARD_POST_LIMIT: usize = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/posts", get(list_posts).post(create_post))
        .route(
            "/dashboard/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

fn positive(id: i64) -> Result<i64, AppError> {
    if id <= 0 {
        return Err(AppError::Validation("Post ID must be > 0".to_string()));
    }
    Ok(id)
}

async fn list_posts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Post>>> {
    let mut posts = state.placeholder.list_posts().await?;
    posts.truncate(DASHBOARD_POST_LIMIT);
    Ok(Json(posts))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.placeholder.get_post(positive(id)?).await?))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePost>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let post = state.placeholder.create_post(&req).await?;
    info!("Post {} created", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePost>,
) -> ApiResult<Json<Post>> {
    req.validate()?;
    Ok(Json(state.placeholder.update_post(positive(id)?, &req).await?))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.placeholder.delete_post(positive(id)?).await?;
    info!("Post {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}
