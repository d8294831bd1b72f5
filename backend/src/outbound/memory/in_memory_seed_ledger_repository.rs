//! In-memory SEED ledger.
//!
//! A single async mutex guards the whole log, so guarded appends are atomic
//! across every identity. State is lost on restart.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{LedgerPage, SeedLedgerRepository, SeedLedgerRepositoryError};
use crate::domain::{
    AppendDecision, AppendOutcome, EventType, GuardFacts, GuardQuery, GuardedAppend, Identity,
    LedgerPosition, SeedEvent, UtcDayWindow,
};

#[derive(Debug, Default)]
struct LedgerLog {
    events: Vec<SeedEvent>,
    next_id: i64,
}

impl LedgerLog {
    fn for_identity<'a>(&'a self, identity: &'a Identity) -> impl Iterator<Item = &'a SeedEvent> {
        self.events
            .iter()
            .filter(move |event| &event.identity == identity)
    }

    fn balance(&self, identity: &Identity) -> i64 {
        self.for_identity(identity).map(|event| event.delta).sum()
    }

    fn positive_between(&self, identity: &Identity, window: &UtcDayWindow) -> i64 {
        self.for_identity(identity)
            .filter(|event| event.delta > 0 && window.contains(event.created_at))
            .map(|event| event.delta)
            .sum()
    }

    fn has_event_between(
        &self,
        identity: &Identity,
        event_type: &EventType,
        window: &UtcDayWindow,
    ) -> bool {
        self.for_identity(identity)
            .any(|event| &event.event_type == event_type && window.contains(event.created_at))
    }

    fn facts(&self, query: &GuardQuery) -> GuardFacts {
        let identity = &query.identity;
        let cooldown_hit = query.cooldown.as_ref().is_some_and(|probe| {
            self.for_identity(identity).any(|event| {
                event.event_type == probe.event_type
                    && event.reference.as_deref() == Some(probe.reference.as_str())
                    && event.created_at >= probe.since
            })
        });
        let daily_event_hit = query
            .daily_event_type
            .as_ref()
            .is_some_and(|event_type| self.has_event_between(identity, event_type, &query.today));
        GuardFacts {
            balance: self.balance(identity),
            positive_today: self.positive_between(identity, &query.today),
            cooldown_hit,
            daily_event_hit,
        }
    }

    fn newest_first<'a>(events: impl Iterator<Item = &'a SeedEvent>) -> Vec<SeedEvent> {
        let mut sorted: Vec<SeedEvent> = events.cloned().collect();
        sorted.sort_by_key(|event| Reverse(event.position()));
        sorted
    }

    fn oldest_first<'a>(events: impl Iterator<Item = &'a SeedEvent>) -> Vec<SeedEvent> {
        let mut sorted: Vec<SeedEvent> = events.cloned().collect();
        sorted.sort_by_key(SeedEvent::position);
        sorted
    }
}

fn paginate(events: Vec<SeedEvent>, page: LedgerPage) -> Vec<SeedEvent> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    events.into_iter().skip(offset).take(limit).collect()
}

/// [`SeedLedgerRepository`] backed by a mutex-guarded vector.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeedLedgerRepository {
    log: Arc<Mutex<LedgerLog>>,
}

impl InMemorySeedLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedLedgerRepository for InMemorySeedLedgerRepository {
    async fn balance(&self, identity: &Identity) -> Result<i64, SeedLedgerRepositoryError> {
        Ok(self.log.lock().await.balance(identity))
    }

    async fn positive_total_between(
        &self,
        identity: &Identity,
        window: &UtcDayWindow,
    ) -> Result<i64, SeedLedgerRepositoryError> {
        Ok(self.log.lock().await.positive_between(identity, window))
    }

    async fn has_event_between(
        &self,
        identity: &Identity,
        event_type: &EventType,
        window: &UtcDayWindow,
    ) -> Result<bool, SeedLedgerRepositoryError> {
        Ok(self
            .log
            .lock()
            .await
            .has_event_between(identity, event_type, window))
    }

    async fn list_for_identity(
        &self,
        identity: &Identity,
        page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let log = self.log.lock().await;
        Ok(paginate(
            LedgerLog::newest_first(log.for_identity(identity)),
            page,
        ))
    }

    async fn list_after_position(
        &self,
        identity: &Identity,
        after: Option<LedgerPosition>,
        limit: u32,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let log = self.log.lock().await;
        let older = log
            .for_identity(identity)
            .filter(|event| after.is_none_or(|position| event.position() < position));
        Ok(paginate(
            LedgerLog::newest_first(older),
            LedgerPage { limit, offset: 0 },
        ))
    }

    async fn balance_through(
        &self,
        identity: &Identity,
        position: LedgerPosition,
    ) -> Result<i64, SeedLedgerRepositoryError> {
        let log = self.log.lock().await;
        Ok(log
            .for_identity(identity)
            .filter(|event| event.position() <= position)
            .map(|event| event.delta)
            .sum())
    }

    async fn list_all(
        &self,
        page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let log = self.log.lock().await;
        Ok(paginate(LedgerLog::newest_first(log.events.iter()), page))
    }

    async fn export_for_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let log = self.log.lock().await;
        Ok(LedgerLog::oldest_first(log.for_identity(identity)))
    }

    async fn export_all(&self) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let log = self.log.lock().await;
        Ok(LedgerLog::oldest_first(log.events.iter()))
    }

    async fn append_guarded(
        &self,
        request: GuardedAppend,
    ) -> Result<AppendOutcome, SeedLedgerRepositoryError> {
        let mut log = self.log.lock().await;
        let facts = log.facts(&request.query);
        match request.decide(&facts) {
            AppendDecision::Append => {
                log.next_id += 1;
                let event = request.event.into_event(log.next_id);
                log.events.push(event.clone());
                Ok(AppendOutcome::Appended {
                    balance: facts.balance.saturating_add(event.delta),
                    event,
                })
            }
            AppendDecision::Skip => Ok(AppendOutcome::Skipped {
                balance: facts.balance,
            }),
            AppendDecision::Reject(violation) => Ok(AppendOutcome::Rejected(violation)),
        }
    }
}
