//! Lifecycle classification of bookings.
//!
//! An unpaid booking is either still inside its payment window or expired,
//! never both: the window is measured in whole elapsed seconds and the
//! boundary belongs to the expired side (`elapsed < window` is unpaid,
//! `elapsed >= window` is expired). Upcoming/past compare the session start
//! strictly against now, so a session starting exactly now is neither.

use chrono::{DateTime, Utc};
use cinema_shared::{Booking, MovieSession};
use std::collections::HashMap;

/// Payment window used until settings have been fetched
pub const DEFAULT_PAYMENT_WINDOW_SECONDS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    /// Awaiting payment, window still open
    Unpaid,
    /// Payment window closed without payment
    Expired,
    /// Paid, session still ahead
    Upcoming,
    /// Session already started
    Past,
    /// Paid, but the session is unknown or starts right now
    Unscheduled,
}

/// Whole seconds since `booked_at`, floored (negative under clock skew)
pub fn elapsed_seconds(booked_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now.timestamp_millis() - booked_at.timestamp_millis()).div_euclid(1000)
}

pub fn is_unpaid(booking: &Booking, window_seconds: i64, now: DateTime<Utc>) -> bool {
    !booking.is_paid && elapsed_seconds(booking.booked_at, now) < window_seconds
}

pub fn is_expired_unpaid(booking: &Booking, window_seconds: i64, now: DateTime<Utc>) -> bool {
    !booking.is_paid && elapsed_seconds(booking.booked_at, now) >= window_seconds
}

pub fn is_upcoming(booking: &Booking, session: Option<&MovieSession>, now: DateTime<Utc>) -> bool {
    booking.is_paid && session.is_some_and(|s| s.start_time > now)
}

pub fn is_past(session: Option<&MovieSession>, now: DateTime<Utc>) -> bool {
    session.is_some_and(|s| s.start_time < now)
}

pub fn has_expired_unpaid(bookings: &[Booking], window_seconds: i64, now: DateTime<Utc>) -> bool {
    bookings
        .iter()
        .any(|b| is_expired_unpaid(b, window_seconds, now))
}

pub fn classify(
    booking: &Booking,
    session: Option<&MovieSession>,
    window_seconds: i64,
    now: DateTime<Utc>,
) -> BookingStage {
    if !booking.is_paid {
        if is_unpaid(booking, window_seconds, now) {
            return BookingStage::Unpaid;
        }
        return BookingStage::Expired;
    }
    if is_past(session, now) {
        BookingStage::Past
    } else if is_upcoming(booking, session, now) {
        BookingStage::Upcoming
    } else {
        BookingStage::Unscheduled
    }
}

/// Index sessions by id
pub fn session_map(sessions: &[MovieSession]) -> HashMap<i64, &MovieSession> {
    sessions.iter().map(|s| (s.id, s)).collect()
}
