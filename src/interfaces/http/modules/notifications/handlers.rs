//! Notification HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::application::ResendService;
use crate::interfaces::http::common::{domain_error, ApiResponse};

use super::dto::*;

/// Application state for notification handlers.
#[derive(Clone)]
pub struct NotificationAppState {
    pub resend: Arc<ResendService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/{reservation_id}/resend",
    tag = "Notifications",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Confirmation email re-sent", body = ApiResponse<ResendResponse>),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation not confirmed"),
        (status = 422, description = "No guest email on file"),
        (status = 502, description = "Mail provider failed")
    )
)]
pub async fn resend_confirmation(
    State(state): State<NotificationAppState>,
    Path(reservation_id): Path<String>,
) -> Result<Json<ApiResponse<ResendResponse>>, (StatusCode, Json<ApiResponse<ResendResponse>>)> {
    let message_id = state
        .resend
        .resend_confirmation(&reservation_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(ResendResponse {
        reserva_id: reservation_id,
        message_id,
    })))
}
