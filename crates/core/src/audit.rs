//! Creation / modification timestamps carried by persisted entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuditStamp {
    /// Stamp for a freshly created entity (`updated_at == created_at`).
    pub fn new(clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a stamp loaded from storage.
    pub fn restore(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            updated_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a modification. `updated_at` never moves backwards.
    pub fn mark_updated(&mut self, clock: &dyn Clock) {
        let now = clock.now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_stamp_has_equal_created_and_updated() {
        let stamp = AuditStamp::new(&FixedClock::at(t0()));
        assert_eq!(stamp.created_at(), t0());
        assert_eq!(stamp.updated_at(), t0());
    }

    #[test]
    fn mark_updated_moves_only_updated_at() {
        let mut stamp = AuditStamp::new(&FixedClock::at(t0()));
        let later = t0() + Duration::minutes(5);
        stamp.mark_updated(&FixedClock::at(later));
        assert_eq!(stamp.created_at(), t0());
        assert_eq!(stamp.updated_at(), later);
    }

    #[test]
    fn skewed_clock_does_not_rewind_updated_at() {
        let mut stamp = AuditStamp::new(&FixedClock::at(t0()));
        stamp.mark_updated(&FixedClock::at(t0() - Duration::hours(1)));
        assert_eq!(stamp.updated_at(), t0());
    }
}
