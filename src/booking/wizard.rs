//! wizard.rs
//!
//! The three-tab booking flow: Overview -> Seats -> Payment.
//!
//! - Backward moves are always allowed.
//! - Entering the seats tab draws a fresh seat grid; selected seats survive
//!   unless the new grid marks them occupied, in which case they are dropped
//!   and reported.
//! - Payment can be reached from the seats tab only with at least one seat
//!   selected. Going straight from the overview is the ticket-quantity path.
//! - Seat selection wins over ticket quantity whenever any seat is selected.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::form::{FormError, PaymentForm};
use super::seats::SeatGrid;
use crate::models::{EventRecord, SeatId};

pub const MAX_SELECTED_SEATS: usize = 6;
pub const MIN_QUANTITY: u8 = 1;
pub const MAX_QUANTITY: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingTab {
    #[default]
    Overview,
    Seats,
    Payment,
}

impl fmt::Display for BookingTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BookingTab::Overview => "overview",
            BookingTab::Seats => "seats",
            BookingTab::Payment => "payment",
        })
    }
}

impl FromStr for BookingTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(BookingTab::Overview),
            "seats" => Ok(BookingTab::Seats),
            "payment" => Ok(BookingTab::Payment),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingMode {
    Seats,
    Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Maximum {MAX_SELECTED_SEATS} seats can be selected")]
    SelectionLimit,
    #[error("Seat {0} is occupied")]
    SeatOccupied(SeatId),
    #[error("Seat map is not loaded; open the seats tab first")]
    GridNotLoaded,
    #[error("Please select at least one seat")]
    NoSeatsSelected,
    #[error("Booking can only be confirmed from the payment tab")]
    NotOnPayment,
    #[error(transparent)]
    Form(#[from] FormError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatToggle {
    Selected,
    Deselected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub event_id: i64,
    pub event_title: String,
    pub seats: Vec<SeatId>,
    pub quantity: u8,
    pub total: f64,
    pub booking_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct BookingSession {
    id: Uuid,
    event: EventRecord,
    active_tab: BookingTab,
    selected_seats: Vec<SeatId>,
    ticket_quantity: u8,
    form: PaymentForm,
    grid: Option<SeatGrid>,
    last_activity: DateTime<Utc>,
}

impl BookingSession {
    pub fn new(event: EventRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            active_tab: BookingTab::Overview,
            selected_seats: Vec::new(),
            ticket_quantity: MIN_QUANTITY,
            form: PaymentForm::default(),
            grid: None,
            last_activity: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event(&self) -> &EventRecord {
        &self.event
    }

    pub fn active_tab(&self) -> BookingTab {
        self.active_tab
    }

    pub fn selected_seats(&self) -> &[SeatId] {
        &self.selected_seats
    }

    pub fn ticket_quantity(&self) -> u8 {
        self.ticket_quantity
    }

    pub fn form(&self) -> &PaymentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PaymentForm {
        &mut self.form
    }

    pub fn grid(&self) -> Option<&SeatGrid> {
        self.grid.as_ref()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn mode(&self) -> BookingMode {
        if self.selected_seats.is_empty() {
            BookingMode::Quantity
        } else {
            BookingMode::Seats
        }
    }

    /// Tickets being bought: seat count when seats are picked, else the quantity.
    pub fn ticket_count(&self) -> u32 {
        match self.mode() {
            BookingMode::Seats => self.selected_seats.len() as u32,
            BookingMode::Quantity => u32::from(self.ticket_quantity),
        }
    }

    pub fn total_price(&self) -> f64 {
        f64::from(self.ticket_count()) * self.event.price
    }

    /// Moves to `overview` or `payment`. The seats tab needs a fresh grid,
    /// so it goes through [`BookingSession::enter_seats`].
    pub fn go_to(&mut self, tab: BookingTab) -> Result<(), WizardError> {
        match tab {
            BookingTab::Overview => {}
            BookingTab::Seats => {
                if self.grid.is_none() {
                    return Err(WizardError::GridNotLoaded);
                }
            }
            BookingTab::Payment => {
                if self.active_tab == BookingTab::Seats && self.selected_seats.is_empty() {
                    return Err(WizardError::NoSeatsSelected);
                }
            }
        }
        self.active_tab = tab;
        Ok(())
    }

    /// Switches to the seats tab with a newly drawn grid. Returns the
    /// previously selected seats that the new grid marks occupied; those are
    /// no longer selected.
    pub fn enter_seats(&mut self, grid: SeatGrid) -> Vec<SeatId> {
        let (kept, dropped): (Vec<SeatId>, Vec<SeatId>) = self
            .selected_seats
            .iter()
            .partition(|seat| !grid.is_occupied(**seat));
        self.selected_seats = kept;
        self.grid = Some(grid);
        self.active_tab = BookingTab::Seats;
        dropped
    }

    pub fn toggle_seat(&mut self, seat: SeatId) -> Result<SeatToggle, WizardError> {
        let grid = self.grid.as_ref().ok_or(WizardError::GridNotLoaded)?;

        if let Some(pos) = self.selected_seats.iter().position(|s| *s == seat) {
            self.selected_seats.remove(pos);
            return Ok(SeatToggle::Deselected);
        }
        if grid.is_occupied(seat) {
            return Err(WizardError::SeatOccupied(seat));
        }
        if self.selected_seats.len() >= MAX_SELECTED_SEATS {
            return Err(WizardError::SelectionLimit);
        }
        self.selected_seats.push(seat);
        Ok(SeatToggle::Selected)
    }

    /// Clamped to 1..=6.
    pub fn set_quantity(&mut self, quantity: i64) -> u8 {
        let clamped = quantity.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY));
        self.ticket_quantity = clamped as u8;
        self.ticket_quantity
    }

    pub fn increment_quantity(&mut self) -> u8 {
        self.set_quantity(i64::from(self.ticket_quantity) + 1)
    }

    pub fn decrement_quantity(&mut self) -> u8 {
        self.set_quantity(i64::from(self.ticket_quantity) - 1)
    }

    /// Validates the payment step and produces the booking summary. The
    /// session itself is left untouched; the caller discards it.
    pub fn confirm(&self, today: NaiveDate) -> Result<Confirmation, WizardError> {
        if self.active_tab != BookingTab::Payment {
            return Err(WizardError::NotOnPayment);
        }
        self.form.check()?;

        Ok(Confirmation {
            event_id: self.event.id,
            event_title: self.event.title.clone(),
            seats: self.selected_seats.clone(),
            quantity: self.ticket_quantity,
            total: self.total_price(),
            booking_date: today,
        })
    }
}
