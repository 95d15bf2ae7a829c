//! Payment HTTP handlers
//!
//! The webhook endpoint never fails: providers treat any non-2xx as a
//! delivery failure and retry, so even an unparseable body is acknowledged
//! with 200 and a `skipped` marker.

use std::sync::Arc;

// Aliased so utoipa's axum_extras does not try to derive a request-body
// schema for the raw byte payload (it matches the literal name `Bytes`).
use axum::body::Bytes as RawBytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::warn;

use crate::application::{CheckoutService, WebhookReconciler};
use crate::interfaces::http::common::{domain_error, ApiResponse, ValidatedJson};

use super::dto::*;

/// Application state for payment handlers.
#[derive(Clone)]
pub struct PaymentAppState {
    pub checkout: Arc<CheckoutService>,
    pub webhook: Arc<WebhookReconciler>,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/checkout",
    tag = "Payments",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = ApiResponse<CheckoutSessionDto>),
        (status = 404, description = "Reservation not found"),
        (status = 502, description = "Payment provider unreachable")
    )
)]
pub async fn create_checkout(
    State(state): State<PaymentAppState>,
    ValidatedJson(request): ValidatedJson<CreateCheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutSessionDto>>, (StatusCode, Json<ApiResponse<CheckoutSessionDto>>)>
{
    let session = state
        .checkout
        .create_session(&request.reserva_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(CheckoutSessionDto {
        reserva_id: session.reservation_id,
        preference_id: session.preference_id,
        init_point: session.init_point,
    })))
}

/// Parse a webhook body. Some provider flows deliver the JSON payload
/// doubly encoded, as a JSON string containing JSON.
fn parse_webhook_body(raw: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(raw).ok()?;
    match value {
        Value::String(inner) => serde_json::from_str(&inner).ok(),
        other => Some(other),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    tag = "Payments",
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAckDto)
    )
)]
pub async fn payment_webhook(
    State(state): State<PaymentAppState>,
    // Bytes, not String: the String extractor turns a non-UTF-8 body
    // into a 400 before this handler runs.
    raw: RawBytes,
) -> Json<WebhookAckDto> {
    let raw = String::from_utf8_lossy(&raw);
    let Some(body) = parse_webhook_body(&raw) else {
        warn!("unparseable webhook payload");
        return Json(WebhookAckDto {
            ok: true,
            skipped: Some("invalid_payload".to_string()),
            reserva_id: None,
            status: None,
        });
    };

    let ack = state.webhook.process(body).await;
    Json(ack.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_body() {
        let body = parse_webhook_body(r#"{"type":"payment","data":{"id":1}}"#).unwrap();
        assert_eq!(body["type"], "payment");
    }

    #[test]
    fn parses_doubly_encoded_body() {
        let raw = serde_json::to_string(r#"{"topic":"merchant_order","resource":"5"}"#).unwrap();
        let body = parse_webhook_body(&raw).unwrap();
        assert_eq!(body["topic"], "merchant_order");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_webhook_body("not json at all").is_none());
    }
}
