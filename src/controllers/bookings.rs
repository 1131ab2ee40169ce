use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::booking::form::FormField;
use crate::booking::wizard::BookingTab;
use crate::booking::{BookingReceipt, BookingView, QuantityChange, SeatMap};
use crate::error::{ApiResult, AppError};
use crate::middleware::ReferenceDate;
use crate::models::SeatId;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(open_booking))
        .route("/bookings/{id}", get(get_booking).delete(close_booking))
        .route("/bookings/{id}/tab", patch(change_tab))
        .route("/bookings/{id}/quantity", patch(change_quantity))
        .route("/bookings/{id}/seats", get(get_seat_map).patch(toggle_seat))
        .route("/bookings/{id}/form", patch(update_form))
        .route("/bookings/{id}/confirm", post(confirm_booking))
}

// POST /api/bookings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenBookingRequest {
    event_id: i64,
}

async fn open_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.event_id <= 0 {
        return Err(AppError::Validation("eventId must be > 0".to_string()));
    }
    let event = state.catalog.get_event(req.event_id).await?;
    let view = state.bookings.open(event).await;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookingView>> {
    Ok(Json(state.bookings.view(id).await?))
}

async fn close_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.bookings.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/bookings/{id}/tab
#[derive(Debug, Deserialize)]
struct TabRequest {
    tab: BookingTab,
}

async fn change_tab(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TabRequest>,
) -> ApiResult<Json<BookingView>> {
    Ok(Json(state.bookings.change_tab(id, req.tab).await?))
}

// PATCH /api/bookings/{id}/quantity, either {"action": "increment"} or {"quantity": 3}
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum QuantityAction {
    Increment,
    Decrement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuantityRequest {
    action: Option<QuantityAction>,
    quantity: Option<i64>,
}

impl QuantityRequest {
    fn change(&self) -> Result<QuantityChange, AppError> {
        match (self.action, self.quantity) {
            (Some(QuantityAction::Increment), None) => Ok(QuantityChange::Increment),
            (Some(QuantityAction::Decrement), None) => Ok(QuantityChange::Decrement),
            (None, Some(quantity)) => Ok(QuantityChange::Set(quantity)),
            _ => Err(AppError::Validation(
                "Provide either an action (increment/decrement) or a quantity".to_string(),
            )),
        }
    }
}

async fn change_quantity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<QuantityRequest>,
) -> ApiResult<Json<BookingView>> {
    let change = req.change()?;
    Ok(Json(state.bookings.change_quantity(id, change).await?))
}

/* ---------- SEATS ---------- */

async fn get_seat_map(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SeatMap>> {
    Ok(Json(state.bookings.seat_map(id).await?))
}

#[derive(Debug, Deserialize)]
struct SeatRequest {
    seat: String,
}

async fn toggle_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SeatRequest>,
) -> ApiResult<Json<BookingView>> {
    let seat: SeatId = req
        .seat
        .parse()
        .map_err(|e: crate::models::seat::InvalidSeat| AppError::Validation(e.to_string()))?;
    Ok(Json(state.bookings.toggle_seat(id, seat).await?))
}

/* ---------- PAYMENT ---------- */

// PATCH /api/bookings/{id}/form with {"firstName": "John", "email": "..."}
async fn update_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(fields): Json<BTreeMap<String, String>>,
) -> ApiResult<Json<BookingView>> {
    let fields = fields
        .into_iter()
        .map(|(name, value)| {
            let field: FormField = name.parse().map_err(AppError::Validation)?;
            Ok((field, value))
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(Json(state.bookings.update_form(id, fields).await?))
}

async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    ReferenceDate(today): ReferenceDate,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookingReceipt>> {
    Ok(Json(state.bookings.confirm(id, &state.tickets, today).await?))
}
