//! Overlap checking against active reservations
//!
//! The application-level check is a fast path only: two concurrent intakes
//! can both pass it before either row lands (check-then-act). The
//! authoritative guard belongs in the store as a range-exclusion
//! constraint; its violation surfaces through the same `DateConflict`
//! error path.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{DomainResult, Reservation, ReservationStatus, StayRange};
use crate::infrastructure::store::ReservationStore;

/// What stands in the way of a candidate range.
#[derive(Debug)]
pub enum Blocker {
    /// A still-valid pending hold by the same guest; intake reuses it
    /// instead of raising a conflict.
    ReusablePending(Reservation),
    /// Someone else's active reservation.
    Conflict,
}

/// Decide whether anything in `rows` blocks `candidate` at `now`.
///
/// Reuse applies only when every blocking row is a still-valid pending
/// hold of the requesting guest (matched by case-insensitive email); the
/// earliest such hold is returned.
pub fn find_blocker(
    rows: &[Reservation],
    candidate: &StayRange,
    guest_email: &str,
    now: DateTime<Utc>,
) -> Option<Blocker> {
    let blockers: Vec<&Reservation> = rows.iter().filter(|r| r.blocks(candidate, now)).collect();
    if blockers.is_empty() {
        return None;
    }

    let email = guest_email.trim().to_lowercase();
    let all_own_pending = blockers.iter().all(|r| {
        r.status == ReservationStatus::Pending && r.hospede_email.trim().to_lowercase() == email
    });
    if all_own_pending {
        let reusable = blockers
            .into_iter()
            .min_by_key(|r| r.created_at)
            .cloned()
            .expect("non-empty blockers");
        return Some(Blocker::ReusablePending(reusable));
    }

    Some(Blocker::Conflict)
}

/// Store-backed overlap checker.
pub struct OverlapChecker {
    store: Arc<dyn ReservationStore>,
}

impl OverlapChecker {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Whether any active reservation blocks the range, optionally
    /// ignoring one reservation id.
    ///
    /// Direct availability check for callers that already hold a
    /// reservation (pass its id so it does not block itself). Intake
    /// goes through [`Self::blocker_for`] instead, which adds the
    /// same-guest reuse tie-break on top of this answer.
    pub async fn has_blocking_overlap(
        &self,
        flat_id: &str,
        candidate: &StayRange,
        exclude_reservation_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let rows = self.store.list_active_for_flat(flat_id).await?;
        Ok(rows
            .iter()
            .filter(|r| Some(r.id.as_str()) != exclude_reservation_id)
            .any(|r| r.blocks(candidate, now)))
    }

    /// Blocker lookup used by intake, with the same-guest reuse tie-break.
    pub async fn blocker_for(
        &self,
        flat_id: &str,
        candidate: &StayRange,
        guest_email: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Blocker>> {
        let rows = self.store.list_active_for_flat(flat_id).await?;
        Ok(find_blocker(&rows, candidate, guest_email, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::sample;
    use chrono::Duration;

    fn candidate(ci: &str, co: &str) -> StayRange {
        StayRange::new(ci.parse().unwrap(), co.parse().unwrap()).unwrap()
    }

    #[test]
    fn no_rows_means_no_blocker() {
        let now = Utc::now();
        assert!(find_blocker(&[], &candidate("2025-01-10", "2025-01-12"), "a@b.c", now).is_none());
    }

    #[test]
    fn confirmed_overlap_is_a_conflict_even_for_same_guest() {
        let now = Utc::now();
        let rows = vec![sample(ReservationStatus::Confirmed)];
        let blocker = find_blocker(
            &rows,
            &candidate("2025-01-11", "2025-01-13"),
            "maria@example.com",
            now,
        );
        assert!(matches!(blocker, Some(Blocker::Conflict)));
    }

    #[test]
    fn other_guests_pending_is_a_conflict() {
        let now = Utc::now();
        let mut r = sample(ReservationStatus::Pending);
        r.expira_em = Some(now + Duration::minutes(20));
        let blocker = find_blocker(
            &[r],
            &candidate("2025-01-10", "2025-01-12"),
            "someone-else@example.com",
            now,
        );
        assert!(matches!(blocker, Some(Blocker::Conflict)));
    }

    #[test]
    fn same_guest_valid_pending_is_reusable() {
        let now = Utc::now();
        let mut r = sample(ReservationStatus::Pending);
        r.expira_em = Some(now + Duration::minutes(20));
        let blocker = find_blocker(
            &[r],
            &candidate("2025-01-10", "2025-01-12"),
            "MARIA@Example.com",
            now,
        );
        match blocker {
            Some(Blocker::ReusablePending(found)) => assert_eq!(found.id, "r-1"),
            other => panic!("expected reusable pending, got {:?}", other),
        }
    }

    #[test]
    fn expired_pending_does_not_block_at_all() {
        let now = Utc::now();
        let mut r = sample(ReservationStatus::Pending);
        r.expira_em = Some(now - Duration::minutes(1));
        let blocker = find_blocker(
            &[r],
            &candidate("2025-01-10", "2025-01-12"),
            "third@example.com",
            now,
        );
        assert!(blocker.is_none());
    }

    #[test]
    fn back_to_back_range_is_free() {
        let now = Utc::now();
        let rows = vec![sample(ReservationStatus::Confirmed)];
        let blocker = find_blocker(
            &rows,
            &candidate("2025-01-12", "2025-01-15"),
            "third@example.com",
            now,
        );
        assert!(blocker.is_none());
    }

    #[test]
    fn mixed_blockers_never_reuse() {
        let now = Utc::now();
        let mut own = sample(ReservationStatus::Pending);
        own.id = "r-own".to_string();
        own.expira_em = Some(now + Duration::minutes(20));
        let confirmed = sample(ReservationStatus::Confirmed);
        let blocker = find_blocker(
            &[own, confirmed],
            &candidate("2025-01-10", "2025-01-12"),
            "maria@example.com",
            now,
        );
        assert!(matches!(blocker, Some(Blocker::Conflict)));
    }

    #[tokio::test]
    async fn checker_can_exclude_a_reservation_id() {
        use crate::infrastructure::store::InMemoryReservationStore;

        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Confirmed));
        let checker = OverlapChecker::new(store);
        let now = Utc::now();
        let range = candidate("2025-01-10", "2025-01-12");

        assert!(checker
            .has_blocking_overlap("flat-1", &range, None, now)
            .await
            .unwrap());
        assert!(!checker
            .has_blocking_overlap("flat-1", &range, Some("r-1"), now)
            .await
            .unwrap());
    }
}
