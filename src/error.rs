use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::booking::form::FormError;
use crate::config::ConfigError;
use crate::booking::wizard::WizardError;
use crate::placeholder_client::UpstreamError;

/// Every failure a handler can report. Nothing here is fatal: each variant
/// becomes a notice for the caller while the underlying state stays as it was.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Simulated outages and deliberately unimplemented operations.
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(UpstreamError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Form(form) => AppError::from(form),
            other => AppError::Conflict(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// First message of the first failing field, fields taken in name order.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .first()
            .and_then(|(field, errs)| {
                let err = errs.first()?;
                Some(match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value for {field}"),
                })
            })
            .unwrap_or_else(|| "Invalid input".to_string());
        AppError::Validation(message)
    }
}

#[derive(Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}: {}", status, self);
        } else {
            tracing::debug!("{}: {}", status, self);
        }
        (status, Json(ApiError { success: false, message: self.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatId;

    #[test]
    fn wizard_errors_map_to_conflict() {
        let err: AppError = WizardError::SelectionLimit.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Maximum 6 seats can be selected");

        let seat: SeatId = "C4".parse().unwrap();
        let err: AppError = WizardError::SeatOccupied(seat).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn form_errors_map_to_validation() {
        let err: AppError = WizardError::Form(FormError::InvalidEmail).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Please enter a valid email address");
    }

    #[test]
    fn upstream_not_found_is_not_a_gateway_error() {
        let err: AppError = UpstreamError::NotFound("posts/999".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err: AppError = UpstreamError::CircuitOpen.into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
