//! Reservation intake
//!
//! Validates a booking request, checks the range against active
//! reservations, and creates (or reuses) a pending hold. The pending
//! notice email is strictly best-effort: its outcome is reported back but
//! never fails the request.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::BookingConfig;
use crate::domain::{DomainError, DomainResult, Reservation, ReservationStatus, StayRange};
use crate::infrastructure::store::{NewReservation, ReservationStore};

use super::notify::ConfirmationNotifier;
use super::overlap::{Blocker, OverlapChecker};

/// Guest sub-object of a booking request.
#[derive(Debug, Clone)]
pub struct GuestDetails {
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub hospedes: u32,
    pub hora_chegada: String,
    pub obs: Option<String>,
}

/// A validated-enough booking request. Nights and total are recomputed
/// here from the dates and nightly price; client-supplied figures are not
/// trusted.
#[derive(Debug, Clone)]
pub struct IntakeRequest {
    pub flat_id: String,
    pub flat_slug: String,
    pub flat_nome: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub preco_noite: f64,
    pub guest: GuestDetails,
}

/// Outcome of the pending-notice dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Sent,
    Failed,
    Skipped,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug)]
pub struct IntakeOutcome {
    pub reservation: Reservation,
    pub reused: bool,
    pub email_status: EmailStatus,
}

pub struct ReservationIntake {
    store: Arc<dyn ReservationStore>,
    checker: OverlapChecker,
    notifier: Arc<ConfirmationNotifier>,
    booking: BookingConfig,
}

impl ReservationIntake {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        notifier: Arc<ConfirmationNotifier>,
        booking: BookingConfig,
    ) -> Self {
        let checker = OverlapChecker::new(Arc::clone(&store));
        Self {
            store,
            checker,
            notifier,
            booking,
        }
    }

    pub async fn handle(&self, request: IntakeRequest) -> DomainResult<IntakeOutcome> {
        self.handle_at(request, Utc::now()).await
    }

    /// Entry point with an injectable clock for tests.
    pub async fn handle_at(
        &self,
        request: IntakeRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<IntakeOutcome> {
        validate(&request)?;
        let range = StayRange::new(request.checkin, request.checkout)?;

        match self
            .checker
            .blocker_for(&request.flat_id, &range, &request.guest.email, now)
            .await?
        {
            Some(Blocker::Conflict) => {
                info!(flat_id = %request.flat_id, period = %range, "date conflict");
                return Err(DomainError::DateConflict);
            }
            Some(Blocker::ReusablePending(existing)) => {
                info!(
                    flat_id = %request.flat_id,
                    reservation_id = %existing.id,
                    "reusing pending reservation for the same guest"
                );
                return Ok(IntakeOutcome {
                    reservation: existing,
                    reused: true,
                    email_status: EmailStatus::Skipped,
                });
            }
            None => {}
        }

        let noites = range.nights();
        let total = noites as f64 * request.preco_noite;
        let row = NewReservation {
            flat_id: request.flat_id,
            flat_slug: request.flat_slug,
            flat_nome: request.flat_nome,
            checkin: range.checkin,
            checkout: range.checkout,
            noites,
            preco_noite: request.preco_noite,
            total,
            hospede_nome: request.guest.nome,
            hospede_email: request.guest.email,
            hospede_telefone: request.guest.telefone,
            hospedes: request.guest.hospedes,
            hora_chegada: request.guest.hora_chegada,
            obs: request.guest.obs,
            status: ReservationStatus::Pending,
            expira_em: now + Duration::minutes(self.booking.hold_minutes),
        };

        let reservation = self.store.insert(row).await?;
        info!(
            reservation_id = %reservation.id,
            flat_id = %reservation.flat_id,
            period = %range,
            "pending reservation created"
        );

        let email_status = if self.notifier.has_mailer() {
            match self.notifier.send_pending_notice(&reservation).await {
                Ok(_) => EmailStatus::Sent,
                Err(e) => {
                    warn!(
                        reservation_id = %reservation.id,
                        error = %e,
                        "pending notice failed"
                    );
                    EmailStatus::Failed
                }
            }
        } else {
            EmailStatus::Skipped
        };

        Ok(IntakeOutcome {
            reservation,
            reused: false,
            email_status,
        })
    }
}

fn validate(request: &IntakeRequest) -> DomainResult<()> {
    let required = [
        ("flat_id", &request.flat_id),
        ("flat_slug", &request.flat_slug),
        ("flat_nome", &request.flat_nome),
        ("hospede.nome", &request.guest.nome),
        ("hospede.email", &request.guest.email),
        ("hospede.telefone", &request.guest.telefone),
        ("hospede.hora_chegada", &request.guest.hora_chegada),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "Campo obrigatório ausente: {}",
                name
            )));
        }
    }
    if request.guest.hospedes == 0 {
        return Err(DomainError::Validation(
            "hospede.hospedes must be at least 1".to_string(),
        ));
    }
    if !(request.preco_noite > 0.0 && request.preco_noite.is_finite()) {
        return Err(DomainError::Validation(
            "preco_noite must be positive".to_string(),
        ));
    }
    Ok(())
}
