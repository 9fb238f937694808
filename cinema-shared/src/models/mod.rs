pub mod auth;
pub mod booking;
pub mod catalog;

pub use auth::{ApiMessage, AuthToken, Credentials};
pub use booking::{Booking, BookingCreated, CreateBookingRequest, Settings};
pub use catalog::{
    Cinema, DateGroup, Movie, MovieSession, MovieWithSessions, Seat, SeatLayout, SessionDetails,
};
