//! Display strings for the ru-RU locale the service ships with.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Day and month, e.g. "19 октября"
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {}", date.day(), month)
}

pub fn format_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", date.hour(), date.minute())
}

pub fn format_date_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!("{} {}", format_date(date), format_time(date))
}

/// Running time, e.g. "2ч 15м", "2ч" or "45м"
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (h, m) if h > 0 && m > 0 => format!("{}ч {}м", h, m),
        (h, _) if h > 0 => format!("{}ч", h),
        (_, m) => format!("{}м", m),
    }
}

/// Russian plural form of "ticket" for a count
pub fn ticket_word(count: u64) -> &'static str {
    let last_digit = count % 10;
    let last_two_digits = count % 100;
    if (11..=19).contains(&last_two_digits) {
        return "билетов";
    }
    match last_digit {
        1 => "билет",
        2..=4 => "билета",
        _ => "билетов",
    }
}

pub fn format_tickets(count: u64) -> String {
    format!("{} {}", count, ticket_word(count))
}

/// Capitalize the first letter and lower-case the rest
pub fn format_cinema_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Resolve a poster path against the API base URL
pub fn image_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http") {
        return path.to_string();
    }
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
