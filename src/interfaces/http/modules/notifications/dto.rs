//! Notification DTOs

use serde::Serialize;
use utoipa::ToSchema;

/// Result of a manual confirmation-email resend.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResendResponse {
    pub reserva_id: String,
    /// Provider message id of the re-sent email
    pub message_id: String,
}
