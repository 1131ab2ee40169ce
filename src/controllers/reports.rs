//! reports.rs
//!
//! User listings from the placeholder REST API plus the static report summary.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{ApiResult, AppError};
use crate::models::User;
use crate::AppState;

const REPORT_GENERATION_TIME: Duration = Duration::from_secs(2);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/users", get(list_users))
        .route("/reports/users/{id}", get(get_user))
        .route("/reports/summary", get(summary))
        .route("/reports/generate", post(generate_report))
        .route("/reports/export", post(export_report))
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub name: &'static str,
    pub value: u32,
}

pub static CHART: [ChartPoint; 5] = [
    ChartPoint { name: "Users", value: 45 },
    ChartPoint { name: "Posts", value: 120 },
    ChartPoint { name: "Comments", value: 89 },
    ChartPoint { name: "Views", value: 234 },
    ChartPoint { name: "Shares", value: 67 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Summary,
    Users,
    Posts,
    Traffic,
    Engagement,
    Revenue,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportType::Summary => "Summary",
            ReportType::Users => "User Analytics",
            ReportType::Posts => "Post Performance",
            ReportType::Traffic => "Traffic Analysis",
            ReportType::Engagement => "Engagement Metrics",
            ReportType::Revenue => "Revenue Report",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Excel => "EXCEL",
            ExportFormat::Csv => "CSV",
        })
    }
}

#[derive(Debug, Serialize)]
struct ReportMessage {
    message: String,
}

async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.placeholder.list_users().await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    if id <= 0 {
        return Err(AppError::Validation("User ID must be > 0".to_string()));
    }
    Ok(Json(state.placeholder.get_user(id).await?))
}

async fn summary() -> Json<&'static [ChartPoint]> {
    Json(&CHART[..])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GenerateRequest {
    report_type: ReportType,
}

async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Json<ReportMessage> {
    state.simulation.delay_fixed(REPORT_GENERATION_TIME).await;
    info!("{} report generated", req.report_type);
    Json(ReportMessage { message: format!("{} report generated successfully!", req.report_type) })
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    format: ExportFormat,
}

async fn export_report(Json(req): Json<ExportRequest>) -> Json<ReportMessage> {
    info!("Exporting report as {}", req.format);
    Json(ReportMessage { message: format!("Report exported as {}", req.format) })
}
