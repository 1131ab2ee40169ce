use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiResult, AppError};
use crate::models::{TicketRecord, TicketStatus};
use crate::tickets::TicketNotice;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets", get(list_tickets))
        .route("/tickets/{id}", get(get_ticket))
        .route("/tickets/{id}/cancel", post(cancel_ticket))
        .route("/tickets/{id}/refund", post(request_refund))
        .route("/tickets/{id}/download", get(download_ticket))
        .route("/tickets/{id}/resend-email", post(resend_email))
}

// GET /api/tickets?status=confirmed, "all" or nothing for every ticket
#[derive(Debug, Default, Deserialize)]
struct TicketsQuery {
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct TicketsResponse {
    tickets: Vec<TicketRecord>,
    total: usize,
}

async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TicketsQuery>,
) -> ApiResult<Json<TicketsResponse>> {
    let status = match params.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<TicketStatus>().map_err(AppError::Validation)?),
    };
    let tickets = state.tickets.list(status).await;
    Ok(Json(TicketsResponse { total: tickets.len(), tickets }))
}

async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TicketRecord>> {
    Ok(Json(state.tickets.get(&id).await?))
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    ticket: TicketRecord,
    message: &'static str,
}

async fn cancel_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CancelResponse>> {
    let ticket = state.tickets.cancel(&id).await?;
    Ok(Json(CancelResponse { ticket, message: "Ticket cancelled successfully" }))
}

async fn request_refund(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TicketNotice>> {
    Ok(Json(state.tickets.refund(&id).await?))
}

async fn download_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TicketNotice>> {
    Ok(Json(state.tickets.download(&id).await?))
}

async fn resend_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TicketNotice>> {
    Ok(Json(state.tickets.resend_email(&id).await?))
}
