//! Confirmation-email resend endpoint

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::{resend_confirmation, NotificationAppState};
