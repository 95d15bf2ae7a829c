//! Reservation domain entity
//!
//! Field names follow the store schema (`reservas` table), which predates
//! this service, so the wire names are Portuguese.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::dates::StayRange;

/// Reservation status as stored.
///
/// `pago` is a legacy synonym for a confirmed (paid) reservation and is
/// treated as blocking everywhere. There is no stored "expired" state:
/// a pending reservation goes stale when `expira_em` passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "pago")]
    Paid,
    #[serde(other)]
    Unknown,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendente",
            Self::Confirmed => "confirmada",
            Self::Paid => "pago",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reservation row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Store-assigned opaque id
    pub id: String,
    /// Flat being booked
    pub flat_id: String,
    pub flat_slug: String,
    pub flat_nome: String,
    /// Stay period, half-open `[checkin, checkout)`
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    /// Nights and pricing, fixed at intake time
    #[serde(default)]
    pub noites: i64,
    #[serde(default)]
    pub preco_noite: f64,
    pub total: f64,
    /// Guest details
    pub hospede_nome: String,
    pub hospede_email: String,
    #[serde(default)]
    pub hospede_telefone: Option<String>,
    #[serde(default)]
    pub hospedes: Option<u32>,
    #[serde(default)]
    pub hora_chegada: Option<String>,
    #[serde(default)]
    pub obs: Option<String>,
    pub status: ReservationStatus,
    /// Validity deadline of a pending hold; absent on old rows
    #[serde(default)]
    pub expira_em: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn range(&self) -> StayRange {
        StayRange {
            checkin: self.checkin,
            checkout: self.checkout,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Confirmed | ReservationStatus::Paid
        )
    }

    /// A pending hold whose `expira_em` has passed.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Pending
            && self.expira_em.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Whether this row blocks the given candidate range at `now`.
    ///
    /// Confirmed/paid rows always block on overlap. A pending row blocks
    /// only while it is not stale; a pending row without `expira_em` is
    /// conservatively treated as still valid.
    pub fn blocks(&self, candidate: &StayRange, now: DateTime<Utc>) -> bool {
        if !self.range().overlaps(candidate) {
            return false;
        }
        match self.status {
            ReservationStatus::Confirmed | ReservationStatus::Paid => true,
            ReservationStatus::Pending => !self.is_stale(now),
            ReservationStatus::Unknown => false,
        }
    }
}

/// Fixture shared by tests across the crate.
#[cfg(test)]
pub(crate) fn sample(status: ReservationStatus) -> Reservation {
    Reservation {
        id: "r-1".to_string(),
        flat_id: "flat-1".to_string(),
        flat_slug: "flat-1".to_string(),
        flat_nome: "Flat 1".to_string(),
        checkin: "2025-01-10".parse().expect("valid date"),
        checkout: "2025-01-12".parse().expect("valid date"),
        noites: 2,
        preco_noite: 150.0,
        total: 300.0,
        hospede_nome: "Maria Silva".to_string(),
        hospede_email: "maria@example.com".to_string(),
        hospede_telefone: Some("+55 86 99999-0000".to_string()),
        hospedes: Some(2),
        hora_chegada: Some("15:00".to_string()),
        obs: None,
        status,
        expira_em: None,
        created_at: Some(Utc::now()),
    }
}
