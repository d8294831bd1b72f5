//! Integration tests for `DieselSeedLedgerRepository` against embedded PostgreSQL.
//!
//! Each test boots its own cluster through `pg-embedded-setup-unpriv` and
//! skips when `SKIP_TEST_CLUSTER` is set and the cluster cannot start.

use std::num::NonZeroU32;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use futures::future::join_all;
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use seed_ledger::domain::ports::{LedgerPage, SeedLedgerRepository};
use seed_ledger::domain::{
    AppendOutcome, ClickRef, DailyRewardKind, EventType, GuardedAppend, Identity, LedgerPolicy,
    LedgerPolicyViolation, NewSeedEvent, SpendAmount, SpendReason, UtcDayWindow,
};
use seed_ledger::outbound::persistence::{DbPool, DieselSeedLedgerRepository, PoolConfig};
use tokio::runtime::Runtime;

mod support;

use support::pg_embed::test_cluster;
use support::{execute_raw, fresh_database, handle_cluster_setup_failure};

const TEST_DB: &str = "diesel_seed_ledger_repo_test";

struct TestContext {
    runtime: Runtime,
    repository: DieselSeedLedgerRepository,
    database_url: String,
    _cluster: TestCluster,
}

impl TestContext {
    fn run<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = fresh_database(&cluster, TEST_DB)?;

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselSeedLedgerRepository::new(pool),
        database_url,
        _cluster: cluster,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 17, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn alice() -> Identity {
    Identity::new("ab@example.com").expect("valid identity")
}

fn click(identity: Identity, reference: &str, at: DateTime<Utc>) -> GuardedAppend {
    let policy = LedgerPolicy::default().with_daily_earn_cap(3);
    let click_ref = ClickRef::new(reference).expect("valid ref");
    GuardedAppend::click_earn(&policy, NewSeedEvent::click_earn(identity, &click_ref, at), at)
}

fn spend(identity: Identity, amount: i64, at: DateTime<Utc>) -> GuardedAppend {
    let amount = SpendAmount::new(amount).expect("valid amount");
    let reason = SpendReason::new("game").expect("valid reason");
    GuardedAppend::spend(NewSeedEvent::spend(identity, amount, &reason, at), at)
}

fn reward(identity: Identity, at: DateTime<Utc>) -> GuardedAppend {
    let amount = NonZeroU32::new(5).expect("non-zero");
    GuardedAppend::daily_reward(
        NewSeedEvent::daily_reward(identity, DailyRewardKind::Journal, amount, at),
        at,
    )
}

fn expect_balance(outcome: AppendOutcome) -> i64 {
    match outcome {
        AppendOutcome::Appended { balance, .. } | AppendOutcome::Skipped { balance } => balance,
        AppendOutcome::Rejected(violation) => panic!("unexpected rejection: {violation}"),
    }
}

#[rstest]
fn appends_are_listed_newest_first_with_summed_balance(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: appends_are_listed_newest_first_with_summed_balance skipped");
        return;
    };
    let repo = &context.repository;
    let start = noon();

    for (offset, reference) in ["news-1", "news-2"].into_iter().enumerate() {
        let at = start + TimeDelta::minutes(i64::try_from(offset).expect("small offset"));
        context
            .run(repo.append_guarded(click(alice(), reference, at)))
            .expect("click appended");
    }
    let after_spend = context
        .run(repo.append_guarded(spend(alice(), 1, start + TimeDelta::minutes(5))))
        .expect("spend appended");

    assert_eq!(expect_balance(after_spend), 1);
    assert_eq!(context.run(repo.balance(&alice())).expect("balance"), 1);

    let listed = context
        .run(repo.list_for_identity(
            &alice(),
            LedgerPage {
                limit: 10,
                offset: 0,
            },
        ))
        .expect("listing");
    let types: Vec<&str> = listed.iter().map(|event| event.event_type.as_ref()).collect();
    assert_eq!(types, ["SPEND_GAME", "CLICK_EARN", "CLICK_EARN"]);
    assert_eq!(listed[1].reference.as_deref(), Some("news-2"));
}

#[rstest]
fn click_guards_apply_cap_before_cooldown(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: click_guards_apply_cap_before_cooldown skipped");
        return;
    };
    let repo = &context.repository;
    let at = noon();

    context
        .run(repo.append_guarded(click(alice(), "news-1", at)))
        .expect("first click");
    let repeat = context
        .run(repo.append_guarded(click(alice(), "news-1", at + TimeDelta::hours(1))))
        .expect("repeat evaluated");
    assert_eq!(
        repeat,
        AppendOutcome::Rejected(LedgerPolicyViolation::CooldownActive { cooldown_hours: 24 })
    );

    for reference in ["news-2", "news-3"] {
        context
            .run(repo.append_guarded(click(alice(), reference, at)))
            .expect("click under cap");
    }
    let capped = context
        .run(repo.append_guarded(click(alice(), "news-1", at + TimeDelta::hours(2))))
        .expect("capped evaluated");
    assert_eq!(
        capped,
        AppendOutcome::Rejected(LedgerPolicyViolation::DailyCapExceeded { daily_cap: 3 })
    );

    let window = UtcDayWindow::containing(at);
    assert_eq!(
        context
            .run(repo.positive_total_between(&alice(), &window))
            .expect("positive total"),
        3
    );
}

#[rstest]
fn daily_reward_is_written_once_per_utc_day(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: daily_reward_is_written_once_per_utc_day skipped");
        return;
    };
    let repo = &context.repository;
    let at = noon();

    let first = context
        .run(repo.append_guarded(reward(alice(), at)))
        .expect("first claim");
    assert!(matches!(first, AppendOutcome::Appended { balance: 5, .. }));

    let repeat = context
        .run(repo.append_guarded(reward(alice(), at + TimeDelta::hours(11))))
        .expect("repeat claim");
    assert_eq!(repeat, AppendOutcome::Skipped { balance: 5 });

    let next_day = context
        .run(repo.append_guarded(reward(alice(), at + TimeDelta::hours(12))))
        .expect("next-day claim");
    assert_eq!(expect_balance(next_day), 10);

    let journal = EventType::from_stored("JOURNAL_DAILY".to_owned());
    assert!(
        context
            .run(repo.has_event_between(&alice(), &journal, &UtcDayWindow::containing(at)))
            .expect("lookup")
    );
}

#[rstest]
fn keyset_pages_resume_after_the_cursor_row(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: keyset_pages_resume_after_the_cursor_row skipped");
        return;
    };
    let repo = &context.repository;
    let at = noon();

    // Same timestamp throughout; ids break the ties.
    for reference in ["news-1", "news-2", "news-3"] {
        context
            .run(repo.append_guarded(click(alice(), reference, at)))
            .expect("click");
    }

    let first = context
        .run(repo.list_after_position(&alice(), None, 2))
        .expect("first page");
    assert_eq!(first.len(), 2);
    let cursor = first[1].position();

    let second = context
        .run(repo.list_after_position(&alice(), Some(cursor), 2))
        .expect("second page");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].reference.as_deref(), Some("news-1"));

    assert_eq!(
        context
            .run(repo.balance_through(&alice(), cursor))
            .expect("balance through"),
        2
    );
}

#[rstest]
fn global_listing_and_exports_cover_every_identity(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: global_listing_and_exports_cover_every_identity skipped");
        return;
    };
    let repo = &context.repository;
    let bob = Identity::new("bob@example.com").expect("valid identity");
    let at = noon();

    context
        .run(repo.append_guarded(click(alice(), "news-1", at)))
        .expect("alice click");
    context
        .run(repo.append_guarded(click(bob.clone(), "news-1", at + TimeDelta::minutes(1))))
        .expect("bob click");

    let newest_first = context
        .run(repo.list_all(LedgerPage {
            limit: 10,
            offset: 0,
        }))
        .expect("global listing");
    assert_eq!(newest_first[0].identity, bob);

    let oldest_first = context.run(repo.export_all()).expect("global export");
    assert_eq!(oldest_first[0].identity, alice());

    let own = context
        .run(repo.export_for_identity(&bob))
        .expect("identity export");
    assert_eq!(own.len(), 1);
}

#[rstest]
fn stored_events_reject_updates_and_deletes(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: stored_events_reject_updates_and_deletes skipped");
        return;
    };
    context
        .run(context.repository.append_guarded(click(alice(), "news-1", noon())))
        .expect("click");

    let update = execute_raw(&context.database_url, "UPDATE seed_events SET delta = 100");
    let delete = execute_raw(&context.database_url, "DELETE FROM seed_events");

    assert!(update.is_err_and(|err| err.contains("append-only")));
    assert!(delete.is_err_and(|err| err.contains("append-only")));
    assert_eq!(
        context
            .run(context.repository.balance(&alice()))
            .expect("balance"),
        1
    );
}

#[rstest]
fn concurrent_spends_never_overdraw(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_spends_never_overdraw skipped");
        return;
    };
    let repo = &context.repository;
    let at = noon();
    for reference in ["news-1", "news-2", "news-3"] {
        context
            .run(repo.append_guarded(click(alice(), reference, at)))
            .expect("click");
    }

    let outcomes = context.run(join_all(
        (0..8).map(|_| repo.append_guarded(spend(alice(), 1, at + TimeDelta::minutes(1)))),
    ));

    let appended = outcomes
        .into_iter()
        .map(|outcome| outcome.expect("spend evaluated"))
        .filter(|outcome| matches!(outcome, AppendOutcome::Appended { .. }))
        .count();
    assert_eq!(appended, 3);
    assert_eq!(context.run(repo.balance(&alice())).expect("balance"), 0);
}

#[rstest]
fn concurrent_clicks_never_exceed_the_daily_cap(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_clicks_never_exceed_the_daily_cap skipped");
        return;
    };
    let repo = &context.repository;
    let at = noon();
    let references: Vec<String> = (0..8).map(|n| format!("news-{n}")).collect();

    let outcomes = context.run(join_all(
        references
            .iter()
            .map(|reference| repo.append_guarded(click(alice(), reference, at))),
    ));

    let outcomes: Vec<AppendOutcome> = outcomes
        .into_iter()
        .map(|outcome| outcome.expect("click evaluated"))
        .collect();
    let appended = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, AppendOutcome::Appended { .. }))
        .count();
    assert_eq!(appended, 3);
    assert!(outcomes.iter().all(|outcome| matches!(
        outcome,
        AppendOutcome::Appended { .. }
            | AppendOutcome::Rejected(LedgerPolicyViolation::DailyCapExceeded { daily_cap: 3 })
    )));

    let window = UtcDayWindow::containing(at);
    assert_eq!(
        context
            .run(repo.positive_total_between(&alice(), &window))
            .expect("positive total"),
        3
    );
    assert_eq!(context.run(repo.balance(&alice())).expect("balance"), 3);
}
