use axum::{
    extract::{Path, State},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::account::{AccountNotice, PreferenceToggled, ProfileSaved};
use crate::error::{ApiResult, AppError};
use crate::models::account::PreferenceKey;
use crate::models::{Account, AppSettings, Profile};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/account", get(get_account))
        .route("/account/profile", put(update_profile))
        .route("/account/preferences/{key}", patch(toggle_preference))
        .route("/account/settings", put(update_settings))
        .route("/account/settings/theme", put(set_theme))
        .route("/account/settings/reset", post(reset_settings))
        .route("/account/password-reset", post(request_password_reset))
        .route("/account/delete", post(delete_account))
        .route("/account/export", post(export_data))
}

async fn get_account(State(state): State<Arc<AppState>>) -> Json<Account> {
    Json(state.account.get().await)
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<Profile>,
) -> ApiResult<Json<ProfileSaved>> {
    Ok(Json(state.account.update_profile(profile).await?))
}

async fn toggle_preference(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<PreferenceToggled>> {
    let key: PreferenceKey = key.parse().map_err(AppError::NotFound)?;
    Ok(Json(state.account.toggle_preference(key).await))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<AppSettings>,
) -> ApiResult<Json<AppSettings>> {
    Ok(Json(state.account.update_settings(settings).await?))
}

#[derive(Debug, Deserialize)]
struct ThemeRequest {
    theme: String,
}

async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ThemeRequest>,
) -> ApiResult<Json<AppSettings>> {
    Ok(Json(state.account.set_theme(&req.theme).await?))
}

async fn reset_settings(State(state): State<Arc<AppState>>) -> Json<AppSettings> {
    Json(state.account.reset_settings().await)
}

async fn request_password_reset(State(state): State<Arc<AppState>>) -> Json<AccountNotice> {
    Json(state.account.request_password_reset().await)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteRequest {
    confirm: bool,
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> ApiResult<Json<AccountNotice>> {
    Ok(Json(state.account.delete_account(req.confirm).await?))
}

async fn export_data(State(state): State<Arc<AppState>>) -> Json<AccountNotice> {
    Json(state.account.export_data().await)
}
