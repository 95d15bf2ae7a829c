//! # Flats Booking Service
//!
//! Reservation backend for a small vacation-flat operation: booking intake
//! with date-overlap checking, hosted checkout sessions, payment-webhook
//! reconciliation and guest notifications (email + operator calendar holds).
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities: reservations, stay ranges, errors
//! - **application**: Booking flows: intake, checkout, webhook reconciliation
//! - **infrastructure**: External ports: store, payment, calendar, email
//! - **interfaces**: REST API with Swagger documentation

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use config::AppConfig;

// Re-export API router
pub use interfaces::http::create_api_router;
