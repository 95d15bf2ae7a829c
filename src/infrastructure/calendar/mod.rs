//! Calendar provider port
//!
//! Holds are idempotent by construction: every event carries the
//! reservation id as a private extended property, and creation is guarded
//! by a prior search for that property within the stay window.

mod google;

pub use google::GoogleCalendarGateway;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::domain::DomainResult;

/// A calendar hold to be created for a confirmed reservation.
#[derive(Debug, Clone)]
pub struct CalendarHold {
    pub calendar_id: String,
    pub reservation_id: String,
    pub summary: String,
    pub description: String,
    /// Stay window in the property's fixed local offset
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// The subset of a provider event this service reads back.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Find an existing event tagged with this reservation id inside the
    /// hold's window.
    async fn find_hold(&self, hold: &CalendarHold) -> DomainResult<Option<CalendarEvent>>;

    /// Create the hold event, tagged for future idempotent lookup.
    async fn create_hold(&self, hold: &CalendarHold) -> DomainResult<CalendarEvent>;
}
