//! SEED ledger: an append-only event log of signed deltas per identity.
//!
//! Balances are always the sum of an identity's deltas. Earning is limited by
//! a daily cap and a per-reference cooldown; spending never overdraws.

mod event;
mod policy;
mod values;
mod views;

pub use event::{LedgerPosition, NewSeedEvent, SeedEvent, UtcDayWindow};
pub use policy::{
    AppendDecision, AppendOutcome, AppendRule, CooldownProbe, DEFAULT_CLICK_COOLDOWN_HOURS,
    DEFAULT_DAILY_EARN_CAP, DEFAULT_JOURNAL_REWARD, GuardFacts, GuardQuery, GuardedAppend,
    IdentityVisibility, LedgerPolicy, LedgerPolicyViolation, require_account,
};
pub use values::{
    CLICK_REF_MAX, ClickRef, DailyRewardKind, EVENT_TYPE_MAX, EventType, LedgerValidationError,
    SPEND_REASON_MAX, SpendAmount, SpendCategory, SpendReason,
};
pub use views::{
    GlobalLedgerEntry, LedgerEntry, accumulate_balance_oldest_first, global_entries,
    mask_identity, walk_balance_newest_first,
};
