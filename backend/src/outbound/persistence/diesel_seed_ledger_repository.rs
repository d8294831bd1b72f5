//! PostgreSQL-backed adapter for the SEED ledger.
//!
//! Guarded appends run in a transaction holding a transaction-scoped
//! advisory lock keyed on the identity, so concurrent writes for one identity
//! serialize while different identities proceed in parallel.

use async_trait::async_trait;
use diesel::dsl::{exists, sql};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{LedgerPage, SeedLedgerRepository, SeedLedgerRepositoryError};
use crate::domain::{
    AppendDecision, AppendOutcome, CooldownProbe, EventType, GuardFacts, GuardQuery,
    GuardedAppend, Identity, LedgerPosition, SeedEvent, UtcDayWindow,
};

use super::diesel_helpers::{bigint, from_diesel, from_pool};
use super::models::{NewSeedEventRow, SeedEventRow};
use super::pool::{DbPool, PoolError};
use super::schema::seed_events;

const SUM_DELTA_SQL: &str = "COALESCE(SUM(delta), 0)::BIGINT";
const IDENTITY_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

/// Diesel-backed implementation of [`SeedLedgerRepository`].
#[derive(Clone)]
pub struct DieselSeedLedgerRepository {
    pool: DbPool,
}

impl DieselSeedLedgerRepository {
    /// Create a repository backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SeedLedgerRepositoryError {
    from_pool(&error)
}

fn map_diesel_error(error: diesel::result::Error) -> SeedLedgerRepositoryError {
    from_diesel(&error)
}

fn into_events(rows: Vec<SeedEventRow>) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
    rows.into_iter()
        .map(SeedEvent::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(SeedLedgerRepositoryError::query)
}

fn page_bounds(page: LedgerPage) -> Result<(i64, i64), SeedLedgerRepositoryError> {
    Ok((bigint(page.limit, "limit")?, bigint(page.offset, "offset")?))
}

async fn sum_deltas(conn: &mut AsyncPgConnection, identity: &str) -> QueryResult<i64> {
    seed_events::table
        .filter(seed_events::identity.eq(identity))
        .select(sql::<BigInt>(SUM_DELTA_SQL))
        .get_result(conn)
        .await
}

async fn sum_positive_between(
    conn: &mut AsyncPgConnection,
    identity: &str,
    window: &UtcDayWindow,
) -> QueryResult<i64> {
    seed_events::table
        .filter(seed_events::identity.eq(identity))
        .filter(seed_events::delta.gt(0))
        .filter(seed_events::created_at.ge(window.start()))
        .filter(seed_events::created_at.lt(window.end()))
        .select(sql::<BigInt>(SUM_DELTA_SQL))
        .get_result(conn)
        .await
}

async fn event_exists_between(
    conn: &mut AsyncPgConnection,
    identity: &str,
    event_type: &str,
    window: &UtcDayWindow,
) -> QueryResult<bool> {
    diesel::select(exists(
        seed_events::table
            .filter(seed_events::identity.eq(identity))
            .filter(seed_events::event_type.eq(event_type))
            .filter(seed_events::created_at.ge(window.start()))
            .filter(seed_events::created_at.lt(window.end())),
    ))
    .get_result(conn)
    .await
}

async fn cooldown_active(
    conn: &mut AsyncPgConnection,
    identity: &str,
    probe: &CooldownProbe,
) -> QueryResult<bool> {
    diesel::select(exists(
        seed_events::table
            .filter(seed_events::identity.eq(identity))
            .filter(seed_events::event_type.eq(probe.event_type.as_ref()))
            .filter(seed_events::reference.eq(probe.reference.as_str()))
            .filter(seed_events::created_at.ge(probe.since)),
    ))
    .get_result(conn)
    .await
}

async fn load_guard_facts(
    conn: &mut AsyncPgConnection,
    query: &GuardQuery,
) -> QueryResult<GuardFacts> {
    let identity = query.identity.as_ref();
    let balance = sum_deltas(conn, identity).await?;
    let positive_today = sum_positive_between(conn, identity, &query.today).await?;
    let cooldown_hit = match &query.cooldown {
        Some(probe) => cooldown_active(conn, identity, probe).await?,
        None => false,
    };
    let daily_event_hit = match &query.daily_event_type {
        Some(event_type) => {
            event_exists_between(conn, identity, event_type.as_ref(), &query.today).await?
        }
        None => false,
    };
    Ok(GuardFacts {
        balance,
        positive_today,
        cooldown_hit,
        daily_event_hit,
    })
}

#[async_trait]
impl SeedLedgerRepository for DieselSeedLedgerRepository {
    async fn balance(&self, identity: &Identity) -> Result<i64, SeedLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sum_deltas(&mut conn, identity.as_ref())
            .await
            .map_err(map_diesel_error)
    }

    async fn positive_total_between(
        &self,
        identity: &Identity,
        window: &UtcDayWindow,
    ) -> Result<i64, SeedLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sum_positive_between(&mut conn, identity.as_ref(), window)
            .await
            .map_err(map_diesel_error)
    }

    async fn has_event_between(
        &self,
        identity: &Identity,
        event_type: &EventType,
        window: &UtcDayWindow,
    ) -> Result<bool, SeedLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        event_exists_between(&mut conn, identity.as_ref(), event_type.as_ref(), window)
            .await
            .map_err(map_diesel_error)
    }

    async fn list_for_identity(
        &self,
        identity: &Identity,
        page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = seed_events::table
            .filter(seed_events::identity.eq(identity.as_ref()))
            .select(SeedEventRow::as_select())
            .order((seed_events::created_at.desc(), seed_events::id.desc()))
            .limit(limit)
            .offset(offset)
            .load::<SeedEventRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_events(rows)
    }

    async fn list_after_position(
        &self,
        identity: &Identity,
        after: Option<LedgerPosition>,
        limit: u32,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let limit = bigint(limit, "limit")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = seed_events::table
            .filter(seed_events::identity.eq(identity.as_ref()))
            .select(SeedEventRow::as_select())
            .order((seed_events::created_at.desc(), seed_events::id.desc()))
            .limit(limit)
            .into_boxed();

        if let Some(after) = after {
            query = query.filter(
                seed_events::created_at.lt(after.created_at).or(seed_events::created_at
                    .eq(after.created_at)
                    .and(seed_events::id.lt(after.id))),
            );
        }

        let rows = query
            .load::<SeedEventRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_events(rows)
    }

    async fn balance_through(
        &self,
        identity: &Identity,
        position: LedgerPosition,
    ) -> Result<i64, SeedLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        seed_events::table
            .filter(seed_events::identity.eq(identity.as_ref()))
            .filter(
                seed_events::created_at.lt(position.created_at).or(seed_events::created_at
                    .eq(position.created_at)
                    .and(seed_events::id.le(position.id))),
            )
            .select(sql::<BigInt>(SUM_DELTA_SQL))
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn list_all(
        &self,
        page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = seed_events::table
            .select(SeedEventRow::as_select())
            .order((seed_events::created_at.desc(), seed_events::id.desc()))
            .limit(limit)
            .offset(offset)
            .load::<SeedEventRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_events(rows)
    }

    async fn export_for_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = seed_events::table
            .filter(seed_events::identity.eq(identity.as_ref()))
            .select(SeedEventRow::as_select())
            .order((seed_events::created_at.asc(), seed_events::id.asc()))
            .load::<SeedEventRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_events(rows)
    }

    async fn export_all(&self) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = seed_events::table
            .select(SeedEventRow::as_select())
            .order((seed_events::created_at.asc(), seed_events::id.asc()))
            .load::<SeedEventRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_events(rows)
    }

    async fn append_guarded(
        &self,
        request: GuardedAppend,
    ) -> Result<AppendOutcome, SeedLedgerRepositoryError> {
        let guarded = &request;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (facts, decision, inserted) = conn
            .transaction(|conn| {
                async move {
                    diesel::sql_query(IDENTITY_LOCK_SQL)
                        .bind::<Text, _>(guarded.query.identity.as_ref())
                        .execute(conn)
                        .await?;

                    let facts = load_guard_facts(conn, &guarded.query).await?;
                    let decision = guarded.decide(&facts);
                    let inserted = match decision {
                        AppendDecision::Append => Some(
                            diesel::insert_into(seed_events::table)
                                .values(NewSeedEventRow::from(&guarded.event))
                                .returning(SeedEventRow::as_returning())
                                .get_result::<SeedEventRow>(conn)
                                .await?,
                        ),
                        AppendDecision::Skip | AppendDecision::Reject(_) => None,
                    };
                    Ok((facts, decision, inserted))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match (decision, inserted) {
            (AppendDecision::Append, Some(row)) => {
                let event = SeedEvent::try_from(row).map_err(SeedLedgerRepositoryError::query)?;
                Ok(AppendOutcome::Appended {
                    balance: facts.balance.saturating_add(event.delta),
                    event,
                })
            }
            (AppendDecision::Append, None) => Err(SeedLedgerRepositoryError::query(
                "append returned no row",
            )),
            (AppendDecision::Skip, _) => Ok(AppendOutcome::Skipped {
                balance: facts.balance,
            }),
            (AppendDecision::Reject(violation), _) => Ok(AppendOutcome::Rejected(violation)),
        }
    }
}
