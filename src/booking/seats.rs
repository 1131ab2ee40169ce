use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::seat::SEATS_PER_ROW;
use crate::models::{Seat, SeatId};

/// Chance that any one seat is already taken when the grid is drawn.
pub const OCCUPANCY_RATE: f64 = 0.3;

/// One drawing of the 8x12 hall. Occupancy is decided once, at generation,
/// and a new grid is drawn every time the seats tab is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatGrid {
    seats: Vec<Seat>,
}

impl SeatGrid {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let seats = SeatId::all()
            .map(|id| Seat { id, occupied: rng.gen_bool(OCCUPANCY_RATE) })
            .collect();
        Self { seats }
    }

    /// A grid with exactly the given seats taken.
    pub fn with_occupied(occupied: impl IntoIterator<Item = SeatId>) -> Self {
        let taken: HashSet<SeatId> = occupied.into_iter().collect();
        let seats = SeatId::all()
            .map(|id| Seat { id, occupied: taken.contains(&id) })
            .collect();
        Self { seats }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Seat]> {
        self.seats.chunks(SEATS_PER_ROW as usize)
    }

    pub fn is_occupied(&self, id: SeatId) -> bool {
        self.seats.iter().any(|seat| seat.id == id && seat.occupied)
    }

    pub fn available_count(&self) -> usize {
        self.seats.iter().filter(|seat| !seat.occupied).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    Available,
    Occupied,
    Selected,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub id: SeatId,
    pub state: SeatState,
    pub selectable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub row: char,
    pub seats: Vec<SeatView>,
}

/// The grid as shown to the user, with their current selection overlaid.
pub fn render(grid: &SeatGrid, selected: &[SeatId]) -> Vec<RowView> {
    grid.rows()
        .filter_map(|row| {
            let letter = row.first()?.id.row();
            let seats = row
                .iter()
                .map(|seat| {
                    let state = if seat.occupied {
                        SeatState::Occupied
                    } else if selected.contains(&seat.id) {
                        SeatState::Selected
                    } else {
                        SeatState::Available
                    };
                    SeatView { id: seat.id, state, selectable: !seat.occupied }
                })
                .collect();
            Some(RowView { row: letter, seats })
        })
        .collect()
}
