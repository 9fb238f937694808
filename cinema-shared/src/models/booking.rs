use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Seat;

/// A claim on a set of seats for a session, initially unpaid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub movie_session_id: i64,
    pub booked_at: DateTime<Utc>,
    pub seats: Vec<Seat>,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBookingRequest {
    pub seats: Vec<Seat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingCreated {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub booking_payment_time_seconds: i64,
}
