//! Reservation HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::application::ReservationIntake;
use crate::domain::DomainError;
use crate::infrastructure::store::ReservationStore;
use crate::interfaces::http::common::{domain_error, ApiResponse, ValidatedJson};

use super::dto::*;

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub intake: Arc<ReservationIntake>,
    pub store: Arc<dyn ReservationStore>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Pending reservation created", body = ApiResponse<CreateReservationResponse>),
        (status = 200, description = "Existing pending hold reused", body = ApiResponse<CreateReservationResponse>),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Dates unavailable"),
        (status = 502, description = "Reservation store unreachable")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<CreateReservationResponse>>),
    (StatusCode, Json<ApiResponse<CreateReservationResponse>>),
> {
    let outcome = state
        .intake
        .handle(request.into())
        .await
        .map_err(domain_error)?;

    let status = if outcome.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let response = CreateReservationResponse {
        reserva_id: outcome.reservation.id.clone(),
        reused: outcome.reused,
        email_status: outcome.email_status.as_str().to_string(),
        reserva: outcome.reservation.into(),
    };
    Ok((status, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    Path(reservation_id): Path<String>,
) -> Result<Json<ApiResponse<ReservationDto>>, (StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let reservation = state
        .store
        .get(&reservation_id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| {
            domain_error(DomainError::NotFound {
                entity: "reservation",
                id: reservation_id.clone(),
            })
        })?;

    Ok(Json(ApiResponse::success(reservation.into())))
}
