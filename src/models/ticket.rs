use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Confirmed,
    Pending,
    Cancelled,
    Failed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Confirmed => "confirmed",
            TicketStatus::Pending => "pending",
            TicketStatus::Cancelled => "cancelled",
            TicketStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "confirmed" => Ok(TicketStatus::Confirmed),
            "pending" => Ok(TicketStatus::Pending),
            "cancelled" => Ok(TicketStatus::Cancelled),
            "failed" => Ok(TicketStatus::Failed),
            other => Err(format!("unknown ticket status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    pub id: String,
    pub event_title: String,
    pub event_date: NaiveDate,
    #[serde(with = "crate::models::event::hour_minute")]
    pub event_time: NaiveTime,
    pub venue: String,
    pub seats: Vec<String>,
    pub price: f64,
    pub status: TicketStatus,
    pub booking_date: NaiveDate,
    pub qr_token: String,
}
