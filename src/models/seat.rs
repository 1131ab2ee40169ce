use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ROW_LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
pub const SEATS_PER_ROW: u8 = 12;

/// Row letter A-H plus column 1-12, written as "A12".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    row: u8,
    number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a seat (expected row A-H and number 1-12)")]
pub struct InvalidSeat(pub String);

impl SeatId {
    pub fn new(row: char, number: u8) -> Option<Self> {
        let row = ROW_LETTERS.iter().position(|r| *r == row.to_ascii_uppercase())?;
        if !(1..=SEATS_PER_ROW).contains(&number) {
            return None;
        }
        Some(SeatId { row: row as u8, number })
    }

    pub fn row(&self) -> char {
        ROW_LETTERS[self.row as usize]
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Every seat in the hall, row by row.
    pub fn all() -> impl Iterator<Item = SeatId> {
        (0..ROW_LETTERS.len() as u8)
            .flat_map(|row| (1..=SEATS_PER_ROW).map(move |number| SeatId { row, number }))
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row(), self.number)
    }
}

impl FromStr for SeatId {
    type Err = InvalidSeat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let row = chars.next().ok_or_else(|| InvalidSeat(s.to_string()))?;
        let number: u8 = chars.as_str().parse().map_err(|_| InvalidSeat(s.to_string()))?;
        SeatId::new(row, number).ok_or_else(|| InvalidSeat(s.to_string()))
    }
}

impl TryFrom<String> for SeatId {
    type Error = InvalidSeat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub id: SeatId,
    pub occupied: bool,
}
