//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::domain::{EventType, Identity, NewSeedEvent, SeedEvent};

use super::schema::seed_events;

/// Row struct for reading from the seed_events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = seed_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SeedEventRow {
    pub id: i64,
    pub identity: String,
    pub event_type: String,
    pub delta: i64,
    pub reference: Option<String>,
    pub meta: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seed_events)]
pub(crate) struct NewSeedEventRow<'a> {
    pub identity: &'a str,
    pub event_type: &'a str,
    pub delta: i64,
    pub reference: Option<&'a str>,
    pub meta: Option<&'a Value>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a NewSeedEvent> for NewSeedEventRow<'a> {
    fn from(event: &'a NewSeedEvent) -> Self {
        Self {
            identity: event.identity().as_ref(),
            event_type: event.event_type().as_ref(),
            delta: event.delta(),
            reference: event.reference(),
            meta: event.meta(),
            created_at: event.created_at(),
        }
    }
}

impl TryFrom<SeedEventRow> for SeedEvent {
    type Error = String;

    fn try_from(row: SeedEventRow) -> Result<Self, Self::Error> {
        let identity = Identity::new(&row.identity)
            .map_err(|err| format!("stored identity for event {} is invalid: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            identity,
            event_type: EventType::from_stored(row.event_type),
            delta: row.delta,
            reference: row.reference,
            meta: row.meta,
            created_at: row.created_at,
        })
    }
}
