//! Read models derived from the event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::SeedEvent;
use super::policy::IdentityVisibility;
use crate::domain::ANONYMOUS_PREFIX;

/// Per-identity ledger row annotated with the balance after it applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub event_type: String,
    pub delta: i64,
    pub reference: Option<String>,
    pub meta: Option<Value>,
    pub balance_after: i64,
}

/// Cross-identity ledger row. Balances are never derived across identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLedgerEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub identity: String,
    pub event_type: String,
    pub delta: i64,
    pub reference: Option<String>,
    pub meta: Option<Value>,
}

/// Mask an identity for public views.
///
/// Anonymous tokens pass through. Email identities keep the first two
/// characters of the local part (one when it is shorter) and the domain.
/// Anything else keeps its first three characters.
///
/// # Examples
/// ```
/// use seed_ledger::domain::mask_identity;
///
/// assert_eq!(mask_identity("ab@example.com"), "ab***@example.com");
/// assert_eq!(mask_identity("a@example.com"), "a***@example.com");
/// assert_eq!(mask_identity("anon:xyz"), "anon:xyz");
/// assert_eq!(mask_identity("handle"), "han***");
/// ```
pub fn mask_identity(identity: &str) -> String {
    if identity.is_empty() {
        return String::new();
    }
    if identity.starts_with(ANONYMOUS_PREFIX) {
        return identity.to_owned();
    }
    if let Some((local, domain)) = identity.split_once('@') {
        let keep = if local.chars().count() >= 2 { 2 } else { 1 };
        let head: String = local.chars().take(keep).collect();
        return format!("{head}***@{domain}");
    }
    let head: String = identity.chars().take(3).collect();
    format!("{head}***")
}

/// Annotate newest-first events with `balance_after`.
///
/// `balance_at_first` is the balance immediately after the first (newest)
/// event; each later row subtracts the delta of the row before it.
pub fn walk_balance_newest_first(events: Vec<SeedEvent>, balance_at_first: i64) -> Vec<LedgerEntry> {
    let mut balance = balance_at_first;
    events
        .into_iter()
        .map(|event| {
            let balance_after = balance;
            balance -= event.delta;
            entry_from(event, balance_after)
        })
        .collect()
}

/// Annotate an identity's complete oldest-first history with running balances.
pub fn accumulate_balance_oldest_first(events: Vec<SeedEvent>) -> Vec<LedgerEntry> {
    let mut balance = 0_i64;
    events
        .into_iter()
        .map(|event| {
            balance += event.delta;
            entry_from(event, balance)
        })
        .collect()
}

/// Project events into global rows with the requested identity visibility.
pub fn global_entries(
    events: Vec<SeedEvent>,
    visibility: IdentityVisibility,
) -> Vec<GlobalLedgerEntry> {
    events
        .into_iter()
        .map(|event| {
            let identity = match visibility {
                IdentityVisibility::Raw => String::from(event.identity),
                IdentityVisibility::Masked => mask_identity(event.identity.as_ref()),
            };
            GlobalLedgerEntry {
                id: event.id,
                created_at: event.created_at,
                identity,
                event_type: event.event_type.into(),
                delta: event.delta,
                reference: event.reference,
                meta: event.meta,
            }
        })
        .collect()
}

fn entry_from(event: SeedEvent, balance_after: i64) -> LedgerEntry {
    LedgerEntry {
        id: event.id,
        created_at: event.created_at,
        event_type: event.event_type.into(),
        delta: event.delta,
        reference: event.reference,
        meta: event.meta,
        balance_after,
    }
}
