//! Reservation DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::intake::{GuestDetails, IntakeRequest};
use crate::domain::Reservation;

/// Guest sub-object of a booking request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GuestDto {
    #[validate(length(min = 1, max = 120))]
    pub nome: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 30))]
    pub telefone: String,
    #[validate(range(min = 1, max = 20))]
    #[serde(default = "default_hospedes")]
    pub hospedes: u32,
    #[validate(length(min = 1, max = 20))]
    pub hora_chegada: String,
    #[validate(length(max = 500))]
    pub obs: Option<String>,
}

fn default_hospedes() -> u32 {
    1
}

/// Booking request body. Nights and total are server-computed; only the
/// nightly price is taken from the client.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, max = 60))]
    pub flat_id: String,
    #[validate(length(min = 1, max = 60))]
    pub flat_slug: String,
    #[validate(length(min = 1, max = 120))]
    pub flat_nome: String,
    /// Check-in date, `YYYY-MM-DD`
    pub checkin: NaiveDate,
    /// Check-out date, `YYYY-MM-DD` (exclusive)
    pub checkout: NaiveDate,
    #[validate(range(min = 0.01))]
    pub preco_noite: f64,
    #[validate(nested)]
    pub hospede: GuestDto,
}

impl From<CreateReservationRequest> for IntakeRequest {
    fn from(dto: CreateReservationRequest) -> Self {
        IntakeRequest {
            flat_id: dto.flat_id,
            flat_slug: dto.flat_slug,
            flat_nome: dto.flat_nome,
            checkin: dto.checkin,
            checkout: dto.checkout,
            preco_noite: dto.preco_noite,
            guest: GuestDetails {
                nome: dto.hospede.nome,
                email: dto.hospede.email,
                telefone: dto.hospede.telefone,
                hospedes: dto.hospede.hospedes,
                hora_chegada: dto.hospede.hora_chegada,
                obs: dto.hospede.obs,
            },
        }
    }
}

/// A reservation as exposed over the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationDto {
    pub id: String,
    pub flat_id: String,
    pub flat_slug: String,
    pub flat_nome: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub noites: i64,
    pub preco_noite: f64,
    pub total: f64,
    pub hospede_nome: String,
    pub hospede_email: String,
    pub hospede_telefone: Option<String>,
    pub hospedes: Option<u32>,
    pub hora_chegada: Option<String>,
    pub obs: Option<String>,
    pub status: String,
    pub expira_em: Option<String>,
    pub created_at: Option<String>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            flat_id: r.flat_id,
            flat_slug: r.flat_slug,
            flat_nome: r.flat_nome,
            checkin: r.checkin,
            checkout: r.checkout,
            noites: r.noites,
            preco_noite: r.preco_noite,
            total: r.total,
            hospede_nome: r.hospede_nome,
            hospede_email: r.hospede_email,
            hospede_telefone: r.hospede_telefone,
            hospedes: r.hospedes,
            hora_chegada: r.hora_chegada,
            obs: r.obs,
            status: r.status.to_string(),
            expira_em: r.expira_em.map(|t| t.to_rfc3339()),
            created_at: r.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Result of a booking request.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateReservationResponse {
    pub reserva_id: String,
    /// `true` when an existing pending hold of the same guest was reused
    pub reused: bool,
    /// Outcome of the pending-notice email: `sent`, `failed` or `skipped`
    pub email_status: String,
    pub reserva: ReservationDto,
}
