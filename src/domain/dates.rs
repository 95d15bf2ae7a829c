//! Stay date ranges
//!
//! A stay is a half-open interval `[checkin, checkout)` of calendar dates:
//! the checkout day is free for the next guest, so back-to-back stays
//! (one's checkout equals another's checkin) never collide.

use chrono::{DateTime, FixedOffset, NaiveDate};

use super::error::{DomainError, DomainResult};

/// Half-open `[checkin, checkout)` date range of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

impl StayRange {
    /// Build a range, rejecting `checkout <= checkin`.
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> DomainResult<Self> {
        if checkout <= checkin {
            return Err(DomainError::Validation(
                "checkout must be after checkin".to_string(),
            ));
        }
        Ok(Self { checkin, checkout })
    }

    /// Number of nights in the stay.
    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }

    /// Strict half-open interval overlap: touching boundaries do not count.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.checkin < other.checkout && self.checkout > other.checkin
    }

    /// The occupied window of the stay as local instants: check-in day at
    /// `checkin_hour`, check-out day at `checkout_hour`, both in `offset`.
    pub fn window(
        &self,
        checkin_hour: u32,
        checkout_hour: u32,
        offset: FixedOffset,
    ) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        let start = self
            .checkin
            .and_hms_opt(checkin_hour.min(23), 0, 0)
            .expect("wall-clock hour below 24");
        let end = self
            .checkout
            .and_hms_opt(checkout_hour.min(23), 0, 0)
            .expect("wall-clock hour below 24");
        let start = start
            .and_local_timezone(offset)
            .single()
            .expect("fixed offsets are unambiguous");
        let end = end
            .and_local_timezone(offset)
            .single()
            .expect("fixed offsets are unambiguous");
        (start, end)
    }
}

impl std::fmt::Display for StayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.checkin, self.checkout)
    }
}
