//! Reservation store port
//!
//! The external store is the single source of truth; this service never
//! caches reservation state across requests.

mod memory;
mod rest;

pub use memory::InMemoryReservationStore;
pub use rest::RestReservationStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{DomainResult, Reservation, ReservationStatus};

/// Insert payload for a new pending reservation.
#[derive(Debug, Clone, Serialize)]
pub struct NewReservation {
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
    pub hospede_telefone: String,
    pub hospedes: u32,
    pub hora_chegada: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
    pub status: ReservationStatus,
    pub expira_em: DateTime<Utc>,
}

/// Store operations needed by the booking flows.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// All reservations for a flat whose stored status is active
    /// (`pendente`, `confirmada` or `pago`). Staleness of pending rows is
    /// the caller's concern.
    async fn list_active_for_flat(&self, flat_id: &str) -> DomainResult<Vec<Reservation>>;

    /// Find a reservation by id.
    async fn get(&self, id: &str) -> DomainResult<Option<Reservation>>;

    /// Insert a new row and return it as stored (with the assigned id).
    async fn insert(&self, row: NewReservation) -> DomainResult<Reservation>;

    /// Patch the status of an existing row. Patching an absent id is not
    /// an error at this layer (PATCH with a filter matches zero rows).
    async fn set_status(&self, id: &str, status: ReservationStatus) -> DomainResult<()>;
}
