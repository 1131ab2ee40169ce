use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Local, NaiveDate};

use crate::error::AppError;

pub const REFERENCE_DATE_HEADER: &str = "x-reference-date";

/// The "today" date filters and bookings are evaluated against. Clients may
/// pin it with an `X-Reference-Date: YYYY-MM-DD` header; otherwise it is the
/// server's local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate(pub NaiveDate);

impl<S: Send + Sync> FromRequestParts<S> for ReferenceDate {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(REFERENCE_DATE_HEADER) else {
            return Ok(ReferenceDate(Local::now().date_naive()));
        };

        let raw = raw
            .to_str()
            .map_err(|_| AppError::Validation("X-Reference-Date must be ASCII".to_string()))?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(ReferenceDate)
            .map_err(|_| AppError::Validation(format!("Invalid X-Reference-Date '{raw}', expected YYYY-MM-DD")))
    }
}
