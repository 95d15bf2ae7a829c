//! Reservation intake and lookup endpoints

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::{create_reservation, get_reservation, ReservationAppState};
