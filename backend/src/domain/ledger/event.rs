//! Ledger events and their ordering.
//!
//! A [`SeedEvent`] is written exactly once and never changes. The balance of
//! an identity is the sum of its event deltas; nothing else is persisted.

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::values::{ClickRef, DailyRewardKind, EventType, SpendAmount, SpendReason};
use crate::domain::Identity;

/// Position of an event in the `(created_at, id)` total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPosition {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

/// Persisted ledger event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEvent {
    pub id: i64,
    pub identity: Identity,
    pub event_type: EventType,
    pub delta: i64,
    pub reference: Option<String>,
    pub meta: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl SeedEvent {
    pub fn position(&self) -> LedgerPosition {
        LedgerPosition {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Event awaiting insertion.
///
/// Constructors only produce non-zero deltas.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use seed_ledger::domain::{ClickRef, Identity, NewSeedEvent};
///
/// let event = NewSeedEvent::click_earn(
///     Identity::new("user@x.com").expect("identity"),
///     &ClickRef::new("linkA").expect("ref"),
///     Utc::now(),
/// );
/// assert_eq!(event.delta(), 1);
/// assert_eq!(event.event_type().as_ref(), "CLICK_EARN");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeedEvent {
    identity: Identity,
    event_type: EventType,
    delta: i64,
    reference: Option<String>,
    meta: Option<Value>,
    created_at: DateTime<Utc>,
}

impl NewSeedEvent {
    /// `+1 CLICK_EARN` correlated with `click_ref`.
    pub fn click_earn(identity: Identity, click_ref: &ClickRef, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            event_type: EventType::click_earn(),
            delta: 1,
            reference: Some(click_ref.as_ref().to_owned()),
            meta: None,
            created_at: now,
        }
    }

    /// `-amount SPEND_<REASON>`.
    pub fn spend(
        identity: Identity,
        amount: SpendAmount,
        reason: &SpendReason,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            event_type: EventType::spend(reason),
            delta: -amount.get(),
            reference: None,
            meta: None,
            created_at: now,
        }
    }

    /// `+amount` tagged with the reward's daily event type.
    pub fn daily_reward(
        identity: Identity,
        kind: DailyRewardKind,
        amount: NonZeroU32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            event_type: kind.event_type(),
            delta: i64::from(amount.get()),
            reference: None,
            meta: Some(kind.meta()),
            created_at: now,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Materialise the event once storage has assigned an id.
    pub fn into_event(self, id: i64) -> SeedEvent {
        SeedEvent {
            id,
            identity: self.identity,
            event_type: self.event_type,
            delta: self.delta,
            reference: self.reference,
            meta: self.meta,
            created_at: self.created_at,
        }
    }
}

/// Half-open UTC calendar day `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcDayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl UtcDayWindow {
    /// The UTC day containing `instant`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use seed_ledger::domain::UtcDayWindow;
    ///
    /// let instant = Utc.with_ymd_and_hms(2026, 3, 4, 23, 59, 59).unwrap();
    /// let window = UtcDayWindow::containing(instant);
    /// assert_eq!(window.start(), Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
    /// assert_eq!(window.end(), Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap());
    /// ```
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let start = instant.date_naive().and_time(NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + TimeDelta::days(1),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for event construction and day windows.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn identity() -> Identity {
        Identity::new("user@x.com").expect("identity")
    }

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 17, hour, minute, second)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn spend_event_debits_amount() {
        let amount = SpendAmount::new(7).expect("amount");
        let reason = SpendReason::new("game").expect("reason");
        let event = NewSeedEvent::spend(identity(), amount, &reason, at(9, 0, 0));

        assert_eq!(event.delta(), -7);
        assert_eq!(event.event_type().as_ref(), "SPEND_GAME");
        assert!(event.reference().is_none());
    }

    #[rstest]
    fn daily_reward_carries_source_meta() {
        let amount = NonZeroU32::new(5).expect("non-zero");
        let event =
            NewSeedEvent::daily_reward(identity(), DailyRewardKind::Journal, amount, at(9, 0, 0));

        assert_eq!(event.delta(), 5);
        assert_eq!(event.meta(), Some(&json!({ "source": "journal" })));
    }

    #[rstest]
    fn into_event_preserves_fields() {
        let click_ref = ClickRef::new("linkA").expect("ref");
        let created_at = at(10, 30, 0);
        let event = NewSeedEvent::click_earn(identity(), &click_ref, created_at).into_event(42);

        assert_eq!(event.id, 42);
        assert_eq!(event.reference.as_deref(), Some("linkA"));
        assert_eq!(
            event.position(),
            LedgerPosition {
                created_at,
                id: 42
            }
        );
    }

    #[rstest]
    #[case(at(0, 0, 0), true)]
    #[case(at(23, 59, 59), true)]
    fn window_includes_whole_day(#[case] instant: DateTime<Utc>, #[case] expected: bool) {
        let window = UtcDayWindow::containing(at(12, 0, 0));
        assert_eq!(window.contains(instant), expected);
    }

    #[rstest]
    fn window_excludes_next_midnight() {
        let window = UtcDayWindow::containing(at(12, 0, 0));
        assert!(!window.contains(window.end()));
        assert!(!window.contains(window.start() - TimeDelta::seconds(1)));
    }

    #[rstest]
    fn positions_order_by_time_then_id() {
        let earlier = LedgerPosition {
            created_at: at(8, 0, 0),
            id: 9,
        };
        let tie = LedgerPosition {
            created_at: at(8, 0, 0),
            id: 10,
        };
        let later = LedgerPosition {
            created_at: at(8, 0, 1),
            id: 1,
        };
        assert!(earlier < tie);
        assert!(tie < later);
    }
}
