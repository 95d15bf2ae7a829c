//! Payment DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::webhook::WebhookAck;

/// Checkout-session request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCheckoutRequest {
    #[validate(length(min = 1, max = 60))]
    pub reserva_id: String,
}

/// A hosted checkout session ready for redirect.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionDto {
    pub reserva_id: String,
    pub preference_id: String,
    /// URL the guest is redirected to
    pub init_point: String,
}

/// Webhook acknowledgement. Always returned with HTTP 200.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAckDto {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    #[serde(rename = "reservaId", skip_serializing_if = "Option::is_none")]
    pub reserva_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<WebhookAck> for WebhookAckDto {
    fn from(ack: WebhookAck) -> Self {
        Self {
            ok: ack.ok,
            skipped: ack.skipped.map(str::to_string),
            reserva_id: ack.reservation_id,
            status: ack.status.map(str::to_string),
        }
    }
}
