//! External collaborators: store, payment provider, calendar, email

pub mod calendar;
pub mod email;
pub mod payment;
pub mod store;
