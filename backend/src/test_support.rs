//! Doubles shared by unit tests and the suites under `tests/`.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Local, TimeDelta, TimeZone as _, Utc};
use mockable::Clock;

/// [`Clock`] that only moves when told to, for crossing UTC day boundaries
/// deterministically.
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use mockable::Clock;
/// use seed_ledger::test_support::MutableClock;
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 1, 23, 30, 0).unwrap();
/// let clock = MutableClock::new(start);
/// clock.advance(TimeDelta::hours(1));
/// assert_eq!(clock.utc(), Utc.with_ymd_and_hms(2026, 1, 2, 0, 30, 0).unwrap());
/// ```
#[derive(Debug)]
pub struct MutableClock {
    now: RwLock<DateTime<Utc>>,
}

impl MutableClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Move the clock forward (or back, for a negative `by`).
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        Local.from_utc_datetime(&self.utc().naive_utc())
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
