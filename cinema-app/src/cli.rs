//! Command-line argument definitions for the `cinema` client.

use clap::{Parser, Subcommand};
use cinema_shared::Seat;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Parser)]
#[command(
    name = "cinema",
    version,
    about = "Cinema ticket booking client",
    long_about = "Browse movies and cinemas, pick seats, and pay for bookings\n\
                  against the cinema booking backend."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding default.toml and per-environment overrides.
    #[arg(long = "config-dir", value_name = "DIR", default_value = "config", global = true)]
    pub config_dir: PathBuf,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all movies.
    Movies,

    /// Show a movie and its upcoming sessions.
    Movie { id: i64 },

    /// List all cinemas.
    Cinemas,

    /// Show a cinema and its schedule.
    Cinema { id: i64 },

    /// Show the seat map of a session.
    Session { id: i64 },

    /// Book seats for a session.
    Book(BookArgs),

    /// Show your bookings grouped by state.
    Bookings,

    /// Pay for a booking.
    Pay { booking: String },

    /// Watch the payment countdown of an unpaid booking.
    Countdown { booking: String },

    /// Sign in and remember the token.
    Login(LoginArgs),

    /// Create an account and sign in.
    Register(RegisterArgs),

    /// Forget the stored token.
    Logout,
}

#[derive(Parser)]
pub struct BookArgs {
    /// Session to book.
    #[arg(value_name = "SESSION")]
    pub session: i64,

    /// Seat as ROW:SEAT, repeat for several seats.
    #[arg(long = "seat", value_name = "ROW:SEAT", required = true, value_parser = parse_seat)]
    pub seats: Vec<Seat>,
}

#[derive(Parser)]
pub struct LoginArgs {
    pub username: String,

    #[arg(long, env = "CINEMA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser)]
pub struct RegisterArgs {
    pub username: String,

    #[arg(long, env = "CINEMA_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Repeat the password.
    #[arg(long = "confirm")]
    pub confirmation: String,
}

/// Parse "ROW:SEAT", both 1-based
pub fn parse_seat(raw: &str) -> Result<Seat, AppError> {
    let invalid = || AppError::InvalidSeat(raw.to_string());
    let (row, seat) = raw.split_once(':').ok_or_else(invalid)?;
    let row: u32 = row.trim().parse().map_err(|_| invalid())?;
    let seat: u32 = seat.trim().parse().map_err(|_| invalid())?;
    if row == 0 || seat == 0 {
        return Err(invalid());
    }
    Ok(Seat::new(row, seat))
}
