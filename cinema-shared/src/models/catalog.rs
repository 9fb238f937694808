use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub rating: f64,
    pub poster_image: String,
    pub length_minutes: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cinema {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// A scheduled screening of a movie at a cinema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieSession {
    pub id: i64,
    pub movie_id: i64,
    pub cinema_id: i64,
    pub start_time: DateTime<Utc>,
}

/// A physical seat, identified by its 1-based row and seat number
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub row_number: u32,
    pub seat_number: u32,
}

impl Seat {
    pub fn new(row_number: u32, seat_number: u32) -> Self {
        Self { row_number, seat_number }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatLayout {
    pub rows: u32,
    pub seats_per_row: u32,
}

/// Session detail as fetched for booking: layout plus seats taken by other bookings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetails {
    pub id: i64,
    pub movie_id: i64,
    pub cinema_id: i64,
    pub start_time: DateTime<Utc>,
    pub seats: SeatLayout,
    #[serde(default)]
    pub booked_seats: Vec<Seat>,
}

impl SessionDetails {
    pub fn session(&self) -> MovieSession {
        MovieSession {
            id: self.id,
            movie_id: self.movie_id,
            cinema_id: self.cinema_id,
            start_time: self.start_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieWithSessions {
    pub movie: Movie,
    pub sessions: Vec<MovieSession>,
}

/// Sessions of one calendar day, grouped per movie
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateGroup {
    /// Display label, e.g. "19 октября"
    pub date: String,
    pub day: NaiveDate,
    pub movies: Vec<MovieWithSessions>,
}
