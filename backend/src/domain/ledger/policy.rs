//! Earning and spending policy.
//!
//! Policy decisions are pure functions of [`GuardFacts`]. Repository adapters
//! load the facts under a per-identity lock and append only when the decision
//! allows it.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use super::event::{NewSeedEvent, SeedEvent, UtcDayWindow};
use super::values::{ClickRef, EventType};
use crate::domain::{Error, ErrorCode, Identity};

/// Default maximum of positive deltas per identity per UTC day.
pub const DEFAULT_DAILY_EARN_CAP: i64 = 30;
/// Default per-reference click cooldown in hours.
pub const DEFAULT_CLICK_COOLDOWN_HOURS: u32 = 24;
/// Default journal reward amount.
pub const DEFAULT_JOURNAL_REWARD: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Client-visible policy failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerPolicyViolation {
    AuthRequired,
    InvalidReference,
    DailyCapExceeded { daily_cap: i64 },
    CooldownActive { cooldown_hours: u32 },
    InsufficientBalance { balance: i64, requested: i64 },
}

impl LedgerPolicyViolation {
    /// Bounded label used by metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthRequired => "auth_required",
            Self::InvalidReference => "invalid_reference",
            Self::DailyCapExceeded { .. } => "daily_cap_exceeded",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::InsufficientBalance { .. } => "insufficient_balance",
        }
    }
}

impl fmt::Display for LedgerPolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "Login required"),
            Self::InvalidReference => write!(f, "Unknown link"),
            Self::DailyCapExceeded { .. } => write!(f, "Daily earn cap reached"),
            Self::CooldownActive { .. } => write!(f, "Already earned for this link recently"),
            Self::InsufficientBalance { .. } => write!(f, "Insufficient SEED"),
        }
    }
}

impl std::error::Error for LedgerPolicyViolation {}

impl From<LedgerPolicyViolation> for Error {
    fn from(value: LedgerPolicyViolation) -> Self {
        let message = value.to_string();
        match value {
            LedgerPolicyViolation::AuthRequired => Error::auth_required(message),
            LedgerPolicyViolation::InvalidReference => {
                Error::new(ErrorCode::InvalidReference, message)
            }
            LedgerPolicyViolation::DailyCapExceeded { daily_cap } => {
                Error::new(ErrorCode::DailyCapExceeded, message)
                    .with_details(json!({ "dailyCap": daily_cap }))
            }
            LedgerPolicyViolation::CooldownActive { cooldown_hours } => {
                Error::new(ErrorCode::CooldownActive, message)
                    .with_details(json!({ "cooldownHours": cooldown_hours }))
            }
            LedgerPolicyViolation::InsufficientBalance { balance, requested } => {
                Error::new(ErrorCode::InsufficientBalance, message)
                    .with_details(json!({ "balance": balance, "requested": requested }))
            }
        }
    }
}

/// Reject anonymous actors where an account is required.
pub fn require_account(identity: &Identity) -> Result<(), LedgerPolicyViolation> {
    if identity.is_anonymous() {
        return Err(LedgerPolicyViolation::AuthRequired);
    }
    Ok(())
}

/// Whether global views show real or masked identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityVisibility {
    Masked,
    Raw,
}

/// Tunable ledger policy.
///
/// # Examples
/// ```
/// use seed_ledger::domain::LedgerPolicy;
///
/// let policy = LedgerPolicy::default().with_daily_earn_cap(10);
/// assert_eq!(policy.daily_earn_cap(), 10);
/// assert_eq!(policy.click_cooldown_hours(), 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPolicy {
    daily_earn_cap: i64,
    click_cooldown_hours: u32,
    allowed_click_refs: Option<HashSet<String>>,
    admin_identities: HashSet<String>,
    journal_reward_amount: NonZeroU32,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            daily_earn_cap: DEFAULT_DAILY_EARN_CAP,
            click_cooldown_hours: DEFAULT_CLICK_COOLDOWN_HOURS,
            allowed_click_refs: None,
            admin_identities: HashSet::new(),
            journal_reward_amount: DEFAULT_JOURNAL_REWARD,
        }
    }
}

impl LedgerPolicy {
    #[must_use]
    pub fn with_daily_earn_cap(mut self, cap: i64) -> Self {
        self.daily_earn_cap = cap;
        self
    }

    #[must_use]
    pub fn with_click_cooldown_hours(mut self, hours: u32) -> Self {
        self.click_cooldown_hours = hours;
        self
    }

    /// Restrict click earns to the given references. `None` disables the check.
    #[must_use]
    pub fn with_allowed_click_refs<I, S>(mut self, refs: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_click_refs = refs.map(|refs| refs.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_admin_identities<I, S>(mut self, admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_identities = admins.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_journal_reward_amount(mut self, amount: NonZeroU32) -> Self {
        self.journal_reward_amount = amount;
        self
    }

    pub fn daily_earn_cap(&self) -> i64 {
        self.daily_earn_cap
    }

    pub fn click_cooldown_hours(&self) -> u32 {
        self.click_cooldown_hours
    }

    pub fn click_cooldown(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.click_cooldown_hours))
    }

    pub fn journal_reward_amount(&self) -> NonZeroU32 {
        self.journal_reward_amount
    }

    /// Check the configured allow-list, if any.
    pub fn check_reference(&self, click_ref: &ClickRef) -> Result<(), LedgerPolicyViolation> {
        match &self.allowed_click_refs {
            Some(allowed) if !allowed.contains(click_ref.as_ref()) => {
                Err(LedgerPolicyViolation::InvalidReference)
            }
            _ => Ok(()),
        }
    }

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.admin_identities.contains(identity.as_ref())
    }

    /// Raw identities require both an explicit request and an admin requester.
    pub fn identity_visibility(
        &self,
        requester: Option<&Identity>,
        want_raw: bool,
    ) -> IdentityVisibility {
        match requester {
            Some(identity) if want_raw && self.is_admin(identity) => IdentityVisibility::Raw,
            _ => IdentityVisibility::Masked,
        }
    }
}

/// Cooldown lookup: same identity, same event type, same reference since `since`.
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownProbe {
    pub event_type: EventType,
    pub reference: String,
    pub since: DateTime<Utc>,
}

/// Facts an adapter must read before a guarded append.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardQuery {
    pub identity: Identity,
    pub today: UtcDayWindow,
    pub cooldown: Option<CooldownProbe>,
    pub daily_event_type: Option<EventType>,
}

/// Facts read under the identity lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardFacts {
    pub balance: i64,
    pub positive_today: i64,
    pub cooldown_hit: bool,
    pub daily_event_hit: bool,
}

/// Rule evaluated against [`GuardFacts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendRule {
    /// Cap on today's positive deltas, then per-reference cooldown.
    ClickEarn { daily_cap: i64, cooldown_hours: u32 },
    /// Balance must cover the debit.
    Spend { amount: i64 },
    /// At most one event of the daily type per UTC day; repeats are no-ops.
    DailyReward,
}

/// Outcome of evaluating an [`AppendRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendDecision {
    Append,
    Skip,
    Reject(LedgerPolicyViolation),
}

/// Event plus the guard that must hold, atomically, for it to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardedAppend {
    pub query: GuardQuery,
    pub rule: AppendRule,
    pub event: NewSeedEvent,
}

impl GuardedAppend {
    /// Guard for a click earn at `now`.
    pub fn click_earn(policy: &LedgerPolicy, event: NewSeedEvent, now: DateTime<Utc>) -> Self {
        let cooldown = event.reference().map(|reference| CooldownProbe {
            event_type: event.event_type().clone(),
            reference: reference.to_owned(),
            since: now - policy.click_cooldown(),
        });
        Self {
            query: GuardQuery {
                identity: event.identity().clone(),
                today: UtcDayWindow::containing(now),
                cooldown,
                daily_event_type: None,
            },
            rule: AppendRule::ClickEarn {
                daily_cap: policy.daily_earn_cap(),
                cooldown_hours: policy.click_cooldown_hours(),
            },
            event,
        }
    }

    /// Guard for a spend at `now`.
    pub fn spend(event: NewSeedEvent, now: DateTime<Utc>) -> Self {
        Self {
            query: GuardQuery {
                identity: event.identity().clone(),
                today: UtcDayWindow::containing(now),
                cooldown: None,
                daily_event_type: None,
            },
            rule: AppendRule::Spend {
                amount: -event.delta(),
            },
            event,
        }
    }

    /// Guard for a once-per-day reward at `now`.
    pub fn daily_reward(event: NewSeedEvent, now: DateTime<Utc>) -> Self {
        Self {
            query: GuardQuery {
                identity: event.identity().clone(),
                today: UtcDayWindow::containing(now),
                cooldown: None,
                daily_event_type: Some(event.event_type().clone()),
            },
            rule: AppendRule::DailyReward,
            event,
        }
    }

    pub fn decide(&self, facts: &GuardFacts) -> AppendDecision {
        match self.rule {
            AppendRule::ClickEarn {
                daily_cap,
                cooldown_hours,
            } => {
                if facts.positive_today >= daily_cap {
                    AppendDecision::Reject(LedgerPolicyViolation::DailyCapExceeded { daily_cap })
                } else if facts.cooldown_hit {
                    AppendDecision::Reject(LedgerPolicyViolation::CooldownActive { cooldown_hours })
                } else {
                    AppendDecision::Append
                }
            }
            AppendRule::Spend { amount } => {
                if facts.balance < amount {
                    AppendDecision::Reject(LedgerPolicyViolation::InsufficientBalance {
                        balance: facts.balance,
                        requested: amount,
                    })
                } else {
                    AppendDecision::Append
                }
            }
            AppendRule::DailyReward => {
                if facts.daily_event_hit {
                    AppendDecision::Skip
                } else {
                    AppendDecision::Append
                }
            }
        }
    }
}

/// Result of a guarded append.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Appended { event: SeedEvent, balance: i64 },
    Skipped { balance: i64 },
    Rejected(LedgerPolicyViolation),
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
