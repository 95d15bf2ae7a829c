//! Checkout-session and payment-webhook endpoints

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::{create_checkout, payment_webhook, PaymentAppState};
