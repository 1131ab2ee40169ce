use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::catalog::search::{DateFilter, FilterCriteria, PriceBucket, SortKey, ALL};
use crate::catalog::EventNotice;
use crate::error::ApiResult;
use crate::middleware::ReferenceDate;
use crate::models::EventRecord;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/featured", get(featured_events))
        .route("/events/categories", get(list_categories))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/quick-book", post(quick_book))
        .route("/events/{id}/wishlist", post(add_to_wishlist))
        .route("/events/{id}/share", post(share_event))
        .route("/newsletter", post(newsletter_signup))
}

/* ---------- EVENTS ---------- */

// GET /api/events?search=&category=&priceRange=&dateFilter=&sortBy=
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventsQuery {
    pub search: String,
    pub category: Option<String>,
    pub price_range: PriceBucket,
    pub date_filter: Option<String>,
    pub sort_by: Option<String>,
}

impl EventsQuery {
    fn criteria(&self) -> FilterCriteria {
        let date_filter = self
            .date_filter
            .as_deref()
            .map(|raw| {
                raw.parse().unwrap_or_else(|e| {
                    debug!("{}, showing all dates", e);
                    DateFilter::All
                })
            })
            .unwrap_or_default();

        FilterCriteria {
            search_text: self.search.trim().to_string(),
            category: self.category.clone().unwrap_or_else(|| ALL.to_string()),
            price_range: self.price_range,
            date_filter,
        }
    }

    fn sort_key(&self) -> Option<SortKey> {
        let raw = self.sort_by.as_deref()?;
        match raw.parse() {
            Ok(key) => Some(key),
            Err(e) => {
                debug!("{}, keeping catalog order", e);
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
    pub total: usize,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    ReferenceDate(today): ReferenceDate,
    Query(params): Query<EventsQuery>,
) -> ApiResult<Json<EventsResponse>> {
    let criteria = params.criteria();
    let events = state.catalog.search(&criteria, params.sort_key(), today).await?;
    Ok(Json(EventsResponse { total: events.len(), events }))
}

// GET /api/events/featured?category=
#[derive(Debug, Default, Deserialize)]
pub struct FeaturedQuery {
    pub category: Option<String>,
}

async fn featured_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeaturedQuery>,
) -> Json<Vec<EventRecord>> {
    Json(state.catalog.featured(params.category.as_deref()).await)
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.catalog.categories())
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EventRecord>> {
    Ok(Json(state.catalog.get_event(id).await?))
}

/* ---------- CARD ACTIONS ---------- */

async fn quick_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EventNotice>> {
    Ok(Json(state.catalog.quick_book(id)?))
}

async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EventNotice>> {
    Ok(Json(state.catalog.add_to_wishlist(id)?))
}

async fn share_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EventNotice>> {
    Ok(Json(state.catalog.share(id)?))
}

/* ---------- NEWSLETTER ---------- */

#[derive(Debug, Deserialize, Validate)]
pub struct NewsletterRequest {
    #[validate(length(min = 1, message = "Please enter your email"))]
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct NewsletterResponse {
    pub message: String,
}

async fn newsletter_signup(Json(req): Json<NewsletterRequest>) -> ApiResult<Json<NewsletterResponse>> {
    let req = NewsletterRequest { email: req.email.trim().to_string() };
    req.validate()?;
    tracing::info!("Newsletter signup: {}", req.email);
    Ok(Json(NewsletterResponse { message: "Thanks for signing up!".to_string() }))
}
