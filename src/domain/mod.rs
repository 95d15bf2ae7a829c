//! Core business entities and types

pub mod dates;
pub mod error;
pub mod reservation;

pub use dates::StayRange;
pub use error::{DomainError, DomainResult};
pub use reservation::{Reservation, ReservationStatus};
