//! SEED ledger domain service.
//!
//! Implements the ledger driving ports on top of a [`SeedLedgerRepository`].
//! Every write goes through [`SeedLedgerRepository::append_guarded`] so the
//! policy read and the insert share one per-identity critical section.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    BalanceRequest, BalanceResponse, ClaimDailyRewardRequest, ClaimDailyRewardResponse,
    ClickEarnRequest, DailyStatusRequest, DailyStatusResponse, GlobalLedgerExportRequest,
    GlobalLedgerRequest, GlobalLedgerResponse, LedgerExportRequest, LedgerOperation,
    LedgerOutcome, LedgerPageRequest, LedgerRequest, LedgerResponse, LedgerWriteResponse,
    MintDepositRequest, MintDepositResponse, NoOpSeedLedgerMetrics, SeedLedgerCommand,
    SeedLedgerMetrics, SeedLedgerQuery, SeedLedgerRepository, SeedLedgerRepositoryError,
    SpendRequest,
};
use crate::domain::{
    AppendOutcome, ClickRef, DailyRewardKind, Error, GuardedAppend, Identity, LedgerPolicy,
    LedgerValidationError, NewSeedEvent, SeedEvent, SpendAmount, SpendCategory, SpendReason,
    UtcDayWindow, accumulate_balance_oldest_first, global_entries, mask_identity, require_account,
    walk_balance_newest_first,
};

fn map_repository_error(error: SeedLedgerRepositoryError) -> Error {
    match error {
        SeedLedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("seed ledger repository unavailable: {message}"))
        }
        SeedLedgerRepositoryError::Query { message } => {
            Error::internal(format!("seed ledger repository error: {message}"))
        }
    }
}

fn map_validation_error(error: LedgerValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

/// Ledger service implementing [`SeedLedgerCommand`] and [`SeedLedgerQuery`].
#[derive(Clone)]
pub struct SeedLedgerService<R> {
    repo: Arc<R>,
    metrics: Arc<dyn SeedLedgerMetrics>,
    clock: Arc<dyn Clock>,
    policy: LedgerPolicy,
}

impl<R> SeedLedgerService<R> {
    /// Create a service with no-op metrics.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use seed_ledger::domain::ports::FixtureSeedLedgerRepository;
    /// # use seed_ledger::domain::{LedgerPolicy, SeedLedgerService};
    /// let service = SeedLedgerService::new(
    ///     Arc::new(FixtureSeedLedgerRepository),
    ///     Arc::new(DefaultClock),
    ///     LedgerPolicy::default(),
    /// );
    /// assert_eq!(service.policy().daily_earn_cap(), 30);
    /// ```
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, policy: LedgerPolicy) -> Self {
        Self {
            repo,
            metrics: Arc::new(NoOpSeedLedgerMetrics),
            clock,
            policy,
        }
    }

    /// Replace the metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn SeedLedgerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    async fn record(&self, operation: LedgerOperation, outcome: LedgerOutcome) {
        if let Err(error) = self.metrics.record(operation, outcome).await {
            warn!(
                %error,
                operation = operation.as_str(),
                outcome = outcome.as_str(),
                "failed to record seed ledger metric"
            );
        }
    }

    async fn ensure_account(
        &self,
        identity: &Identity,
        operation: Option<LedgerOperation>,
    ) -> Result<(), Error> {
        if let Err(violation) = require_account(identity) {
            if let Some(operation) = operation {
                self.record(operation, LedgerOutcome::from(&violation)).await;
            }
            return Err(violation.into());
        }
        Ok(())
    }
}

impl<R> SeedLedgerService<R>
where
    R: SeedLedgerRepository,
{
    /// Run a guarded append and translate policy rejections into errors.
    async fn append(
        &self,
        operation: LedgerOperation,
        request: GuardedAppend,
    ) -> Result<AppendOutcome, Error> {
        let outcome = self
            .repo
            .append_guarded(request)
            .await
            .map_err(map_repository_error)?;

        match &outcome {
            AppendOutcome::Appended { event, balance } => {
                self.record(operation, LedgerOutcome::Accepted).await;
                info!(
                    identity = %mask_identity(event.identity.as_ref()),
                    event_type = %event.event_type,
                    delta = event.delta,
                    balance = *balance,
                    "seed event appended"
                );
                Ok(outcome)
            }
            AppendOutcome::Skipped { .. } => {
                self.record(operation, LedgerOutcome::AlreadyClaimed).await;
                Ok(outcome)
            }
            AppendOutcome::Rejected(violation) => {
                self.record(operation, LedgerOutcome::from(violation)).await;
                Err(violation.clone().into())
            }
        }
    }

    /// Exact balance immediately after `first`, the newest row of a page.
    async fn balance_at(&self, identity: &Identity, first: Option<&SeedEvent>) -> Result<i64, Error> {
        match first {
            Some(event) => self
                .repo
                .balance_through(identity, event.position())
                .await
                .map_err(map_repository_error),
            None => Ok(0),
        }
    }
}

fn written_balance(outcome: &AppendOutcome) -> Result<i64, Error> {
    match outcome {
        AppendOutcome::Appended { balance, .. } => Ok(*balance),
        AppendOutcome::Skipped { .. } | AppendOutcome::Rejected(_) => {
            Err(Error::internal("ledger write was not applied"))
        }
    }
}

#[async_trait]
impl<R> SeedLedgerCommand for SeedLedgerService<R>
where
    R: SeedLedgerRepository,
{
    async fn record_click_earn(
        &self,
        request: ClickEarnRequest,
    ) -> Result<LedgerWriteResponse, Error> {
        let operation = LedgerOperation::ClickEarn;
        self.ensure_account(&request.identity, Some(operation))
            .await?;
        let click_ref = ClickRef::new(&request.reference).map_err(map_validation_error)?;
        if let Err(violation) = self.policy.check_reference(&click_ref) {
            self.record(operation, LedgerOutcome::from(&violation)).await;
            return Err(violation.into());
        }

        let now = self.clock.utc();
        let event = NewSeedEvent::click_earn(request.identity, &click_ref, now);
        let outcome = self
            .append(operation, GuardedAppend::click_earn(&self.policy, event, now))
            .await?;
        Ok(LedgerWriteResponse {
            balance: written_balance(&outcome)?,
        })
    }

    async fn spend(&self, request: SpendRequest) -> Result<LedgerWriteResponse, Error> {
        let parsed_reason = SpendReason::new(&request.reason);
        let category = parsed_reason
            .as_ref()
            .map_or(SpendCategory::Other, SpendReason::category);
        let operation = LedgerOperation::Spend(category);
        self.ensure_account(&request.identity, Some(operation))
            .await?;
        let amount = SpendAmount::new(request.amount).map_err(map_validation_error)?;
        let reason = parsed_reason.map_err(map_validation_error)?;

        let now = self.clock.utc();
        let event = NewSeedEvent::spend(request.identity, amount, &reason, now);
        let outcome = self
            .append(operation, GuardedAppend::spend(event, now))
            .await?;
        Ok(LedgerWriteResponse {
            balance: written_balance(&outcome)?,
        })
    }

    async fn claim_daily_reward(
        &self,
        request: ClaimDailyRewardRequest,
    ) -> Result<ClaimDailyRewardResponse, Error> {
        let operation = LedgerOperation::DailyReward;
        self.ensure_account(&request.identity, Some(operation))
            .await?;

        let amount = match request.kind {
            DailyRewardKind::Journal => self.policy.journal_reward_amount(),
        };
        let now = self.clock.utc();
        let event = NewSeedEvent::daily_reward(request.identity, request.kind, amount, now);
        match self
            .append(operation, GuardedAppend::daily_reward(event, now))
            .await?
        {
            AppendOutcome::Appended { balance, .. } => Ok(ClaimDailyRewardResponse {
                claimed: true,
                balance,
            }),
            AppendOutcome::Skipped { balance } => Ok(ClaimDailyRewardResponse {
                claimed: false,
                balance,
            }),
            AppendOutcome::Rejected(violation) => Err(violation.into()),
        }
    }

    async fn mint_deposit(
        &self,
        request: MintDepositRequest,
    ) -> Result<MintDepositResponse, Error> {
        self.ensure_account(&request.identity, None).await?;
        SpendAmount::new(request.amount).map_err(map_validation_error)?;
        info!(
            identity = %mask_identity(request.identity.as_ref()),
            amount = request.amount,
            has_wallet = request.wallet_address.is_some(),
            "mint deposit acknowledged in mock mode"
        );
        Ok(MintDepositResponse::mock())
    }
}

#[async_trait]
impl<R> SeedLedgerQuery for SeedLedgerService<R>
where
    R: SeedLedgerRepository,
{
    async fn balance(&self, request: BalanceRequest) -> Result<BalanceResponse, Error> {
        self.ensure_account(&request.identity, None).await?;
        let balance = self
            .repo
            .balance(&request.identity)
            .await
            .map_err(map_repository_error)?;
        Ok(BalanceResponse { balance })
    }

    async fn ledger(&self, request: LedgerRequest) -> Result<LedgerResponse, Error> {
        self.ensure_account(&request.identity, None).await?;
        let events = self
            .repo
            .list_for_identity(&request.identity, request.page)
            .await
            .map_err(map_repository_error)?;
        let seed = self.balance_at(&request.identity, events.first()).await?;
        Ok(LedgerResponse {
            entries: walk_balance_newest_first(events, seed),
            next: None,
        })
    }

    async fn ledger_page(&self, request: LedgerPageRequest) -> Result<LedgerResponse, Error> {
        self.ensure_account(&request.identity, None).await?;
        let limit = usize::try_from(request.limit)
            .map_err(|_| Error::invalid_request("limit exceeds platform range"))?;
        let mut events = self
            .repo
            .list_after_position(&request.identity, request.after, request.limit.saturating_add(1))
            .await
            .map_err(map_repository_error)?;

        let has_more = events.len() > limit;
        events.truncate(limit);
        let next = if has_more {
            events.last().map(SeedEvent::position)
        } else {
            None
        };
        let seed = self.balance_at(&request.identity, events.first()).await?;
        Ok(LedgerResponse {
            entries: walk_balance_newest_first(events, seed),
            next,
        })
    }

    async fn global_ledger(
        &self,
        request: GlobalLedgerRequest,
    ) -> Result<GlobalLedgerResponse, Error> {
        let visibility = self
            .policy
            .identity_visibility(request.requester.as_ref(), request.want_raw);
        let events = self
            .repo
            .list_all(request.page)
            .await
            .map_err(map_repository_error)?;
        Ok(GlobalLedgerResponse {
            entries: global_entries(events, visibility),
        })
    }

    async fn export_ledger(&self, request: LedgerExportRequest) -> Result<LedgerResponse, Error> {
        self.ensure_account(&request.identity, None).await?;
        let events = self
            .repo
            .export_for_identity(&request.identity)
            .await
            .map_err(map_repository_error)?;
        Ok(LedgerResponse {
            entries: accumulate_balance_oldest_first(events),
            next: None,
        })
    }

    async fn export_global_ledger(
        &self,
        request: GlobalLedgerExportRequest,
    ) -> Result<GlobalLedgerResponse, Error> {
        let visibility = self
            .policy
            .identity_visibility(request.requester.as_ref(), request.want_raw);
        let events = self
            .repo
            .export_all()
            .await
            .map_err(map_repository_error)?;
        Ok(GlobalLedgerResponse {
            entries: global_entries(events, visibility),
        })
    }

    async fn daily_status(
        &self,
        request: DailyStatusRequest,
    ) -> Result<DailyStatusResponse, Error> {
        self.ensure_account(&request.identity, None).await?;
        let today = UtcDayWindow::containing(self.clock.utc());
        let reward_claimed_today = self
            .repo
            .has_event_between(
                &request.identity,
                &DailyRewardKind::Journal.event_type(),
                &today,
            )
            .await
            .map_err(map_repository_error)?;
        let earned_today = self
            .repo
            .positive_total_between(&request.identity, &today)
            .await
            .map_err(map_repository_error)?;
        Ok(DailyStatusResponse {
            reward_claimed_today,
            earned_today,
            daily_cap: self.policy.daily_earn_cap(),
        })
    }
}

#[cfg(test)]
#[path = "seed_ledger_service_tests.rs"]
mod tests;
