//! Seat selection over a session's fixed row x column layout.

use cinema_shared::{CreateBookingRequest, Seat, SeatLayout, SessionDetails};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    /// Taken by another booking, cannot be selected
    Booked,
    Selected,
    Available,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatError {
    #[error("Seat layout must have at least one row and one seat per row, got {rows}x{seats_per_row}")]
    EmptyLayout { rows: u32, seats_per_row: u32 },

    #[error("Seat {row}:{seat} is outside the {rows}x{seats_per_row} layout")]
    OutOfRange {
        row: u32,
        seat: u32,
        rows: u32,
        seats_per_row: u32,
    },
}

/// The user's pending seat selection for one session.
///
/// The selection keeps click order and never contains a booked seat or the
/// same seat twice.
#[derive(Debug, Clone)]
pub struct SeatGrid {
    layout: SeatLayout,
    booked: HashSet<Seat>,
    selected: Vec<Seat>,
}

impl SeatGrid {
    /// Build a grid from a layout, the seats already taken and an initial selection.
    ///
    /// Initial selections that are booked, out of range or repeated are dropped.
    pub fn new(layout: SeatLayout, booked_seats: &[Seat], selected: Vec<Seat>) -> Result<Self, SeatError> {
        if layout.rows == 0 || layout.seats_per_row == 0 {
            return Err(SeatError::EmptyLayout {
                rows: layout.rows,
                seats_per_row: layout.seats_per_row,
            });
        }

        let mut grid = Self {
            layout,
            booked: booked_seats.iter().copied().collect(),
            selected: Vec::with_capacity(selected.len()),
        };
        grid.set_selection(selected);
        Ok(grid)
    }

    pub fn for_session(details: &SessionDetails) -> Result<Self, SeatError> {
        Self::new(details.seats, &details.booked_seats, Vec::new())
    }

    pub fn layout(&self) -> SeatLayout {
        self.layout
    }

    pub fn contains(&self, seat: Seat) -> bool {
        (1..=self.layout.rows).contains(&seat.row_number)
            && (1..=self.layout.seats_per_row).contains(&seat.seat_number)
    }

    /// Classify a seat; `None` when it is outside the layout
    pub fn state(&self, seat: Seat) -> Option<SeatState> {
        if !self.contains(seat) {
            return None;
        }
        let state = if self.booked.contains(&seat) {
            SeatState::Booked
        } else if self.selected.contains(&seat) {
            SeatState::Selected
        } else {
            SeatState::Available
        };
        Some(state)
    }

    /// Every seat of the layout in grid order (row by row)
    pub fn cells(&self) -> impl Iterator<Item = (Seat, SeatState)> + '_ {
        (1..=self.layout.rows).flat_map(move |row| self.row(row))
    }

    /// One row of the layout, left to right
    pub fn row(&self, row: u32) -> impl Iterator<Item = (Seat, SeatState)> + '_ {
        (1..=self.layout.seats_per_row).filter_map(move |number| {
            let seat = Seat::new(row, number);
            self.state(seat).map(|state| (seat, state))
        })
    }

    /// Toggle a seat.
    ///
    /// Returns the updated selection when it changed, `None` for booked seats.
    pub fn toggle(&mut self, seat: Seat) -> Result<Option<&[Seat]>, SeatError> {
        if !self.contains(seat) {
            return Err(SeatError::OutOfRange {
                row: seat.row_number,
                seat: seat.seat_number,
                rows: self.layout.rows,
                seats_per_row: self.layout.seats_per_row,
            });
        }
        if self.booked.contains(&seat) {
            debug!(row = seat.row_number, seat = seat.seat_number, "Ignoring toggle of booked seat");
            return Ok(None);
        }

        match self.selected.iter().position(|s| *s == seat) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(seat),
        }
        Ok(Some(self.selected.as_slice()))
    }

    /// Current selection in click order
    pub fn selection(&self) -> &[Seat] {
        &self.selected
    }

    /// Replace the selection, as when the bound value changes from outside
    pub fn set_selection(&mut self, seats: Vec<Seat>) {
        self.selected.clear();
        for seat in seats {
            if self.contains(seat) && !self.booked.contains(&seat) && !self.selected.contains(&seat) {
                self.selected.push(seat);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn to_request(&self) -> CreateBookingRequest {
        CreateBookingRequest {
            seats: self.selected.clone(),
        }
    }
}
