use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{EventRecord, SeatId, TicketRecord};
use crate::services::simulation::{FaultSite, Simulation};
use crate::tickets::TicketStore;

pub mod form;
pub mod seats;
pub mod wizard;

use form::{FormField, PaymentForm};
use seats::{RowView, SeatGrid};
use wizard::{BookingMode, BookingSession, BookingTab, Confirmation, SeatToggle};

pub const TICKETS_REDIRECT: &str = "/tickets";

/// What the client sees of a booking session after every operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub event_id: i64,
    pub event_title: String,
    pub unit_price: f64,
    pub active_tab: BookingTab,
    pub selected_seats: Vec<SeatId>,
    pub ticket_quantity: u8,
    pub mode: BookingMode,
    pub total_price: f64,
    pub form: PaymentForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl BookingView {
    fn of(session: &BookingSession) -> Self {
        Self {
            id: session.id(),
            event_id: session.event().id,
            event_title: session.event().title.clone(),
            unit_price: session.event().price,
            active_tab: session.active_tab(),
            selected_seats: session.selected_seats().to_vec(),
            ticket_quantity: session.ticket_quantity(),
            mode: session.mode(),
            total_price: session.total_price(),
            form: session.form().clone(),
            notice: None,
        }
    }

    fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    pub rows: Vec<RowView>,
    pub available: usize,
    pub selected: Vec<SeatId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub confirmation: Confirmation,
    pub ticket: TicketRecord,
    pub message: String,
    /// Where the client should go next; `None` when the redirect fails.
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Increment,
    Decrement,
    Set(i64),
}

/// In-flight booking sessions, one per opened booking view.
#[derive(Clone)]
pub struct BookingRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, BookingSession>>>,
    simulation: Simulation,
    idle_timeout: ChronoDuration,
}

impl BookingRegistry {
    pub fn new(simulation: Simulation, idle_timeout: std::time::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            simulation,
            idle_timeout: ChronoDuration::from_std(idle_timeout).unwrap_or_else(|_| ChronoDuration::days(365)),
        }
    }

    pub async fn open(&self, event: EventRecord) -> BookingView {
        let session = BookingSession::new(event, Utc::now());
        let view = BookingView::of(&session);
        info!("Booking session {} opened for event {}", view.id, view.event_id);
        self.sessions.write().await.insert(session.id(), session);
        view
    }

    pub async fn view(&self, id: Uuid) -> Result<BookingView, AppError> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(BookingView::of).ok_or_else(|| not_found(id))
    }

    pub async fn close(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Booking session {} closed", id);
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn change_tab(&self, id: Uuid, tab: BookingTab) -> Result<BookingView, AppError> {
        if tab != BookingTab::Seats {
            return self.update(id, |session| {
                session.go_to(tab)?;
                Ok(BookingView::of(session))
            })
            .await;
        }

        if self.simulation.trips(FaultSite::SeatsTab) {
            return self.view(id).await;
        }

        self.simulation.delay().await;
        if self.simulation.trips(FaultSite::SeatGrid) {
            // session must still exist for the failure to be reported against it
            self.view(id).await?;
            return Err(AppError::Unavailable("Failed to load seat map. Please try again.".to_string()));
        }

        let grid = self.simulation.with_rng(|rng| SeatGrid::generate(rng));
        self.update(id, move |session| {
            let dropped = session.enter_seats(grid);
            let view = BookingView::of(session);
            if dropped.is_empty() {
                return Ok(view);
            }
            let labels: Vec<String> = dropped.iter().map(SeatId::to_string).collect();
            debug!("Session {} lost seats {:?} on regeneration", session.id(), labels);
            Ok(view.with_notice(format!("Seats no longer available: {}", labels.join(", "))))
        })
        .await
    }

    pub async fn seat_map(&self, id: Uuid) -> Result<SeatMap, AppError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        let grid = session.grid().ok_or(wizard::WizardError::GridNotLoaded)?;
        Ok(SeatMap {
            rows: seats::render(grid, session.selected_seats()),
            available: grid.available_count(),
            selected: session.selected_seats().to_vec(),
        })
    }

    pub async fn toggle_seat(&self, id: Uuid, seat: SeatId) -> Result<BookingView, AppError> {
        self.update(id, |session| {
            let outcome = session.toggle_seat(seat)?;
            let view = BookingView::of(session);
            Ok(match outcome {
                SeatToggle::Selected => view,
                SeatToggle::Deselected => view.with_notice(format!("Seat {seat} released")),
            })
        })
        .await
    }

    pub async fn change_quantity(&self, id: Uuid, change: QuantityChange) -> Result<BookingView, AppError> {
        self.update(id, |session| {
            match change {
                QuantityChange::Increment => session.increment_quantity(),
                QuantityChange::Decrement => session.decrement_quantity(),
                QuantityChange::Set(quantity) => session.set_quantity(quantity),
            };
            Ok(BookingView::of(session))
        })
        .await
    }

    pub async fn update_form(
        &self,
        id: Uuid,
        fields: Vec<(FormField, String)>,
    ) -> Result<BookingView, AppError> {
        self.update(id, move |session| {
            let form = session.form_mut();
            for (field, value) in fields {
                form.set(field, value);
            }
            Ok(BookingView::of(session))
        })
        .await
    }

    /// Validates the payment step, waits out the simulated submission, then
    /// discards the session and records the ticket. A session closed while
    /// the submission was pending is not booked.
    pub async fn confirm(
        &self,
        id: Uuid,
        tickets: &TicketStore,
        today: NaiveDate,
    ) -> Result<BookingReceipt, AppError> {
        self.update(id, |session| session.confirm(today).map_err(AppError::from)).await?;

        if self.simulation.trips(FaultSite::BookingSubmit) {
            return Err(AppError::Unavailable(
                "Booking system temporarily unavailable. Please try again.".to_string(),
            ));
        }

        self.simulation.delay().await;

        let (session, confirmation) = {
            let mut sessions = self.sessions.write().await;
            let pending = sessions.get(&id).ok_or_else(|| {
                warn!("Booking session {} closed before submission completed", id);
                not_found(id)
            })?;
            // the form may have changed during the delay; a rejected
            // submission leaves the session in place
            let confirmation = pending.confirm(today)?;
            let session = sessions.remove(&id).ok_or_else(|| not_found(id))?;
            (session, confirmation)
        };
        let ticket = tickets.append(session.event(), &confirmation).await;
        info!(
            "Booking {} confirmed: {} x {} = {:.2} (card {})",
            id,
            session.ticket_count(),
            confirmation.event_title,
            confirmation.total,
            session.form().masked_card()
        );

        let redirect = if self.simulation.trips(FaultSite::Redirect) {
            None
        } else {
            Some(TICKETS_REDIRECT.to_string())
        };

        Ok(BookingReceipt {
            confirmation,
            ticket,
            message: "Booking confirmed! Redirecting to My Tickets...".to_string(),
            redirect,
        })
    }

    /// Drops sessions with no activity for longer than the idle timeout.
    pub async fn sweep_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_activity() <= self.idle_timeout);
        before - sessions.len()
    }

    async fn update<T>(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut BookingSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.touch(Utc::now());
        apply(session)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Booking session {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::events::mock_events;
    use crate::config::SimulationConfig;
    use std::time::Duration;

    fn registry() -> BookingRegistry {
        BookingRegistry::new(Simulation::quiet(3), Duration::from_secs(1800))
    }

    fn festival() -> EventRecord {
        mock_events().remove(0)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn contact(email: &str) -> Vec<(FormField, String)> {
        vec![
            (FormField::FirstName, "John".into()),
            (FormField::LastName, "Doe".into()),
            (FormField::Email, email.into()),
            (FormField::CardNumber, "4111111111111111".into()),
            (FormField::ExpiryDate, "12/27".into()),
            (FormField::Cvv, "123".into()),
        ]
    }

    async fn first_free_seats(registry: &BookingRegistry, id: Uuid, n: usize) -> Vec<SeatId> {
        let map = registry.seat_map(id).await.unwrap();
        map.rows
            .iter()
            .flat_map(|row| row.seats.iter())
            .filter(|seat| seat.selectable)
            .map(|seat| seat.id)
            .take(n)
            .collect()
    }

    #[tokio::test]
    async fn seat_booking_flow_appends_a_ticket() {
        let registry = registry();
        let tickets = TicketStore::with_mock_tickets(Simulation::quiet(3));
        let id = registry.open(festival()).await.id;

        registry.change_tab(id, BookingTab::Seats).await.unwrap();
        for seat in first_free_seats(&registry, id, 2).await {
            registry.toggle_seat(id, seat).await.unwrap();
        }
        let view = registry.change_tab(id, BookingTab::Payment).await.unwrap();
        assert_eq!(view.total_price, 178.0);
        assert_eq!(view.mode, BookingMode::Seats);

        registry.update_form(id, contact("john@doe.com")).await.unwrap();
        let receipt = registry.confirm(id, &tickets, today()).await.unwrap();

        assert_eq!(receipt.confirmation.total, 178.0);
        assert_eq!(receipt.ticket.seats.len(), 2);
        assert_eq!(receipt.redirect.as_deref(), Some(TICKETS_REDIRECT));
        assert!(registry.is_empty().await);
        assert_eq!(tickets.list(None).await.len(), 5);
    }

    #[tokio::test]
    async fn invalid_email_keeps_session_open() {
        let registry = registry();
        let tickets = TicketStore::with_mock_tickets(Simulation::quiet(3));
        let id = registry.open(festival()).await.id;
        registry.change_tab(id, BookingTab::Payment).await.unwrap();
        registry.update_form(id, contact("john.doe.example.com")).await.unwrap();

        let err = registry.confirm(id, &tickets, today()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(registry.len().await, 1);
        assert_eq!(tickets.list(None).await.len(), 4);
    }

    #[tokio::test]
    async fn form_edited_during_submission_keeps_session() {
        let simulation = Simulation::from_config(&SimulationConfig {
            latency_min_ms: 300,
            latency_max_ms: 300,
            enable_fault_injection: false,
            seed: Some(3),
        });
        let registry = BookingRegistry::new(simulation, Duration::from_secs(1800));
        let tickets = TicketStore::with_mock_tickets(Simulation::quiet(3));
        let id = registry.open(festival()).await.id;
        registry.change_tab(id, BookingTab::Payment).await.unwrap();
        registry.update_form(id, contact("john@doe.com")).await.unwrap();

        let (confirmed, _) = tokio::join!(registry.confirm(id, &tickets, today()), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            registry
                .update_form(id, vec![(FormField::Email, "john.doe.example.com".into())])
                .await
                .unwrap();
        });

        assert!(matches!(confirmed, Err(AppError::Validation(_))));
        let view = registry.view(id).await.unwrap();
        assert_eq!(view.active_tab, BookingTab::Payment);
        assert_eq!(tickets.list(None).await.len(), 4);
    }

    #[tokio::test]
    async fn quantity_updates_are_clamped() {
        let registry = registry();
        let id = registry.open(festival()).await.id;
        let view = registry.change_quantity(id, QuantityChange::Set(9)).await.unwrap();
        assert_eq!(view.ticket_quantity, 6);
        let view = registry.change_quantity(id, QuantityChange::Increment).await.unwrap();
        assert_eq!(view.ticket_quantity, 6);
        assert_eq!(view.total_price, 534.0);
    }

    #[tokio::test]
    async fn closed_sessions_are_gone() {
        let registry = registry();
        let id = registry.open(festival()).await.id;
        registry.close(id).await.unwrap();
        assert!(matches!(registry.view(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            registry.change_tab(id, BookingTab::Seats).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn seat_map_requires_seats_tab_first() {
        let registry = registry();
        let id = registry.open(festival()).await.id;
        assert!(matches!(registry.seat_map(id).await, Err(AppError::Conflict(_))));
        registry.change_tab(id, BookingTab::Seats).await.unwrap();
        let map = registry.seat_map(id).await.unwrap();
        assert_eq!(map.rows.len(), 8);
    }

    #[tokio::test]
    async fn idle_sessions_are_swept() {
        let registry = BookingRegistry::new(Simulation::quiet(3), Duration::from_secs(60));
        let id = registry.open(festival()).await.id;
        assert_eq!(registry.sweep_idle(Utc::now()).await, 0);
        assert_eq!(registry.sweep_idle(Utc::now() + ChronoDuration::minutes(5)).await, 1);
        assert!(registry.view(id).await.is_err());
    }

    #[tokio::test]
    async fn faults_never_break_seat_limit() {
        let registry = BookingRegistry::new(Simulation::faulty(8), Duration::from_secs(1800));
        let id = registry.open(festival()).await.id;
        for _ in 0..10 {
            if registry.change_tab(id, BookingTab::Seats).await.is_ok()
                && registry.seat_map(id).await.is_ok()
            {
                break;
            }
        }
        if registry.seat_map(id).await.is_err() {
            return;
        }
        for seat in first_free_seats(&registry, id, 10).await {
            let _ = registry.toggle_seat(id, seat).await;
        }
        assert!(registry.view(id).await.unwrap().selected_seats.len() <= 6);
    }
}
