use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::booking::wizard::Confirmation;
use crate::error::AppError;
use crate::models::{EventRecord, TicketRecord, TicketStatus};
use crate::services::simulation::{FaultSite, Simulation, UNDEFINED};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketNotice {
    pub ticket_id: String,
    pub message: String,
}

/// The user's tickets. Mock records plus whatever gets booked during the run;
/// nothing outlives the process.
#[derive(Clone)]
pub struct TicketStore {
    tickets: Arc<RwLock<Vec<TicketRecord>>>,
    simulation: Simulation,
}

impl TicketStore {
    pub fn new(tickets: Vec<TicketRecord>, simulation: Simulation) -> Self {
        Self { tickets: Arc::new(RwLock::new(tickets)), simulation }
    }

    pub fn with_mock_tickets(simulation: Simulation) -> Self {
        Self::new(mock_tickets(), simulation)
    }

    pub async fn list(&self, status: Option<TicketStatus>) -> Vec<TicketRecord> {
        self.simulation.delay().await;
        if self.simulation.trips(FaultSite::TicketsEmpty) {
            return Vec::new();
        }
        self.tickets
            .read()
            .await
            .iter()
            .filter(|ticket| status.map_or(true, |s| ticket.status == s))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<TicketRecord, AppError> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|ticket| ticket.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Only the status changes; every other field of the record is kept.
    pub async fn cancel(&self, id: &str) -> Result<TicketRecord, AppError> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|ticket| ticket.id == id)
            .ok_or_else(|| not_found(id))?;

        if ticket.status != TicketStatus::Confirmed {
            return Err(AppError::Conflict(format!(
                "Ticket {id} is {} and cannot be cancelled",
                ticket.status
            )));
        }
        if self.simulation.trips(FaultSite::TicketCancel) {
            return Err(AppError::Unavailable(
                "Unable to cancel ticket. Please contact support.".to_string(),
            ));
        }

        ticket.status = TicketStatus::Cancelled;
        info!("Ticket {} cancelled", id);
        Ok(ticket.clone())
    }

    pub async fn refund(&self, id: &str) -> Result<TicketNotice, AppError> {
        let ticket = self.get(id).await?;
        if ticket.status != TicketStatus::Failed {
            return Err(AppError::Conflict(format!(
                "Refunds are only offered for failed bookings; ticket {id} is {}",
                ticket.status
            )));
        }
        Err(AppError::Unavailable("Refund processing is temporarily unavailable".to_string()))
    }

    pub async fn download(&self, id: &str) -> Result<TicketNotice, AppError> {
        let ticket = self.get(id).await?;
        let message = if self.simulation.trips(FaultSite::TicketDownload) {
            UNDEFINED.to_string()
        } else {
            format!("Downloading {} ticket", ticket.event_title)
        };
        Ok(TicketNotice { ticket_id: ticket.id, message })
    }

    pub async fn resend_email(&self, id: &str) -> Result<TicketNotice, AppError> {
        let ticket = self.get(id).await?;
        info!("Resending confirmation email for ticket {}", ticket.id);
        Ok(TicketNotice { ticket_id: ticket.id, message: "Confirmation email sent!".to_string() })
    }

    /// Records a confirmed booking under the next free `TKT-NNN` id.
    pub async fn append(&self, event: &EventRecord, confirmation: &Confirmation) -> TicketRecord {
        let mut tickets = self.tickets.write().await;
        let next = tickets
            .iter()
            .filter_map(|ticket| ticket.id.strip_prefix("TKT-")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("TKT-{next:03}");

        let ticket = TicketRecord {
            qr_token: qr_token(&id, event.id, confirmation.booking_date),
            id,
            event_title: event.title.clone(),
            event_date: event.date,
            event_time: event.time,
            venue: event.location.clone(),
            seats: confirmation.seats.iter().map(ToString::to_string).collect(),
            price: confirmation.total,
            status: TicketStatus::Confirmed,
            booking_date: confirmation.booking_date,
        };
        tickets.push(ticket.clone());
        ticket
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Ticket {id} not found"))
}

/// "QR" followed by nine digits derived from the ticket identity.
pub fn qr_token(ticket_id: &str, event_id: i64, booking_date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ticket_id.as_bytes());
    hasher.update(event_id.to_be_bytes());
    hasher.update(booking_date.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    format!("QR{:09}", u64::from_be_bytes(head) % 1_000_000_000)
}

#[allow(clippy::too_many_arguments)]
fn ticket(
    id: &str,
    event_title: &str,
    date: (i32, u32, u32),
    time: (u32, u32),
    venue: &str,
    seats: &[&str],
    price: f64,
    status: TicketStatus,
    booked: (i32, u32, u32),
    qr: &str,
) -> TicketRecord {
    TicketRecord {
        id: id.to_string(),
        event_title: event_title.to_string(),
        event_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
        event_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap_or_default(),
        venue: venue.to_string(),
        seats: seats.iter().map(|s| s.to_string()).collect(),
        price,
        status,
        booking_date: NaiveDate::from_ymd_opt(booked.0, booked.1, booked.2).unwrap_or_default(),
        qr_token: qr.to_string(),
    }
}

pub fn mock_tickets() -> Vec<TicketRecord> {
    vec![
        ticket("TKT-001", "Summer Music Festival 2024", (2024, 7, 15), (18, 0), "Central Park, New York", &["A12", "A13"], 178.0, TicketStatus::Confirmed, (2024, 6, 1), "QR123456789"),
        ticket("TKT-002", "Tech Conference: AI & Future", (2024, 8, 22), (9, 0), "Convention Center, San Francisco", &["B5"], 199.0, TicketStatus::Pending, (2024, 6, 10), "QR987654321"),
        ticket("TKT-003", "Comedy Night Special", (2024, 5, 20), (21, 0), "Laugh Factory, Hollywood", &["C8", "C9"], 70.0, TicketStatus::Cancelled, (2024, 5, 1), "QR456789123"),
        ticket("TKT-004", "Art Gallery Opening", (2024, 7, 8), (19, 0), "Modern Art Museum, Los Angeles", &["D15"], 25.0, TicketStatus::Failed, (2024, 6, 15), "QR789123456"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::events::mock_events;

    fn store() -> TicketStore {
        TicketStore::with_mock_tickets(Simulation::quiet(2))
    }

    #[tokio::test]
    async fn cancel_changes_only_the_status() {
        let store = store();
        let before = store.get("TKT-001").await.unwrap();
        let after = store.cancel("TKT-001").await.unwrap();

        assert_eq!(after.status, TicketStatus::Cancelled);
        assert_eq!(TicketRecord { status: TicketStatus::Confirmed, ..after.clone() }, before);
        assert_eq!(store.get("TKT-001").await.unwrap(), after);
    }

    #[tokio::test]
    async fn only_confirmed_tickets_cancel() {
        let store = store();
        assert!(matches!(store.cancel("TKT-002").await, Err(AppError::Conflict(_))));
        assert!(matches!(store.cancel("TKT-999").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_cancel_leaves_ticket_untouched() {
        let store = TicketStore::with_mock_tickets(Simulation::faulty(4));
        let before = store.get("TKT-001").await.unwrap();
        for _ in 0..20 {
            match store.cancel("TKT-001").await {
                Ok(_) => break,
                Err(AppError::Unavailable(msg)) => {
                    assert_eq!(msg, "Unable to cancel ticket. Please contact support.");
                    assert_eq!(store.get("TKT-001").await.unwrap(), before);
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn refund_is_never_available() {
        let store = store();
        assert!(matches!(store.refund("TKT-004").await, Err(AppError::Unavailable(_))));
        assert!(matches!(store.refund("TKT-001").await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = store();
        assert_eq!(store.list(None).await.len(), 4);
        let failed = store.list(Some(TicketStatus::Failed)).await;
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, "TKT-004");
    }

    #[tokio::test]
    async fn download_and_resend_messages() {
        let store = store();
        let notice = store.download("TKT-002").await.unwrap();
        assert_eq!(notice.message, "Downloading Tech Conference: AI & Future ticket");
        let notice = store.resend_email("TKT-002").await.unwrap();
        assert_eq!(notice.message, "Confirmation email sent!");
    }

    #[tokio::test]
    async fn appended_tickets_get_sequential_ids() {
        let store = store();
        let event = mock_events().remove(6);
        let confirmation = Confirmation {
            event_id: event.id,
            event_title: event.title.clone(),
            seats: vec!["B3".parse().unwrap()],
            quantity: 1,
            total: 120.0,
            booking_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
        };
        let first = store.append(&event, &confirmation).await;
        let second = store.append(&event, &confirmation).await;

        assert_eq!(first.id, "TKT-005");
        assert_eq!(second.id, "TKT-006");
        assert_eq!(first.venue, "Symphony Hall, Boston");
        assert_eq!(first.seats, vec!["B3".to_string()]);
        assert_eq!(first.status, TicketStatus::Confirmed);
        assert!(first.qr_token.starts_with("QR") && first.qr_token.len() == 11);
        assert_ne!(first.qr_token, second.qr_token);
    }
}
