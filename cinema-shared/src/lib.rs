pub mod models;
pub mod pii;

pub use models::{
    ApiMessage, AuthToken, Booking, BookingCreated, Cinema, CreateBookingRequest, Credentials,
    DateGroup, Movie, MovieSession, MovieWithSessions, Seat, SeatLayout, SessionDetails, Settings,
};
pub use pii::Masked;
