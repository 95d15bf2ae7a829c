pub mod health;
pub mod notifications;
pub mod payments;
pub mod reservations;
