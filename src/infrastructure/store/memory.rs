//! In-memory reservation store for development and testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{DomainResult, Reservation, ReservationStatus};

use super::{NewReservation, ReservationStore};

#[derive(Default)]
pub struct InMemoryReservationStore {
    rows: DashMap<String, Reservation>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing row, e.g. from a test fixture.
    pub fn put(&self, reservation: Reservation) {
        self.rows.insert(reservation.id.clone(), reservation);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn list_active_for_flat(&self, flat_id: &str) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| {
                r.flat_id == flat_id
                    && matches!(
                        r.status,
                        ReservationStatus::Pending
                            | ReservationStatus::Confirmed
                            | ReservationStatus::Paid
                    )
            })
            .map(|r| r.clone())
            .collect())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Reservation>> {
        Ok(self.rows.get(id).map(|r| r.clone()))
    }

    async fn insert(&self, row: NewReservation) -> DomainResult<Reservation> {
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            flat_id: row.flat_id,
            flat_slug: row.flat_slug,
            flat_nome: row.flat_nome,
            checkin: row.checkin,
            checkout: row.checkout,
            noites: row.noites,
            preco_noite: row.preco_noite,
            total: row.total,
            hospede_nome: row.hospede_nome,
            hospede_email: row.hospede_email,
            hospede_telefone: Some(row.hospede_telefone),
            hospedes: Some(row.hospedes),
            hora_chegada: Some(row.hora_chegada),
            obs: row.obs,
            status: row.status,
            expira_em: Some(row.expira_em),
            created_at: Some(Utc::now()),
        };
        self.rows
            .insert(reservation.id.clone(), reservation.clone());
        Ok(reservation)
    }

    async fn set_status(&self, id: &str, status: ReservationStatus) -> DomainResult<()> {
        if let Some(mut row) = self.rows.get_mut(id) {
            row.status = status;
        }
        Ok(())
    }
}
