use chrono::{DateTime, Utc};

use crate::booking::elapsed_seconds;

/// Seconds left in the payment window, never negative
pub fn remaining_seconds(booked_at: DateTime<Utc>, window_seconds: i64, now: DateTime<Utc>) -> i64 {
    (window_seconds - elapsed_seconds(booked_at, now)).max(0)
}

/// `MM:SS`, both parts zero padded
pub fn format_countdown(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
