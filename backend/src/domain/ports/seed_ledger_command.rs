//! Driving port for SEED ledger writes.

use async_trait::async_trait;

use crate::domain::{DailyRewardKind, Error, Identity};

/// Mode reported by the mock deposit acknowledgement.
pub const MINT_DEPOSIT_MODE: &str = "mock";
/// Message reported by the mock deposit acknowledgement.
pub const MINT_DEPOSIT_MESSAGE: &str = "On-chain deposit coming soon. Connect wallet next.";

/// Request to earn one SEED for following a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEarnRequest {
    pub identity: Identity,
    pub reference: String,
}

/// Request to debit SEED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendRequest {
    pub identity: Identity,
    pub amount: i64,
    pub reason: String,
}

/// Balance after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerWriteResponse {
    pub balance: i64,
}

/// Request to claim a once-per-day reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimDailyRewardRequest {
    pub identity: Identity,
    pub kind: DailyRewardKind,
}

/// Result of a daily reward claim. `claimed == false` means it was already
/// claimed today; that is a success, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimDailyRewardResponse {
    pub claimed: bool,
    pub balance: i64,
}

/// Request to deposit SEED on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintDepositRequest {
    pub identity: Identity,
    pub amount: i64,
    pub wallet_address: Option<String>,
}

/// Acknowledgement of a deposit request. Deposits are not wired up yet, so
/// `ok` is always false and the ledger is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintDepositResponse {
    pub ok: bool,
    pub mode: String,
    pub message: String,
}

impl MintDepositResponse {
    pub fn mock() -> Self {
        Self {
            ok: false,
            mode: MINT_DEPOSIT_MODE.to_owned(),
            message: MINT_DEPOSIT_MESSAGE.to_owned(),
        }
    }
}

/// Driving port for ledger mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeedLedgerCommand: Send + Sync {
    async fn record_click_earn(&self, request: ClickEarnRequest)
    -> Result<LedgerWriteResponse, Error>;

    async fn spend(&self, request: SpendRequest) -> Result<LedgerWriteResponse, Error>;

    async fn claim_daily_reward(
        &self,
        request: ClaimDailyRewardRequest,
    ) -> Result<ClaimDailyRewardResponse, Error>;

    async fn mint_deposit(&self, request: MintDepositRequest)
    -> Result<MintDepositResponse, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSeedLedgerCommand;

#[async_trait]
impl SeedLedgerCommand for FixtureSeedLedgerCommand {
    async fn record_click_earn(
        &self,
        _request: ClickEarnRequest,
    ) -> Result<LedgerWriteResponse, Error> {
        Ok(LedgerWriteResponse { balance: 1 })
    }

    async fn spend(&self, _request: SpendRequest) -> Result<LedgerWriteResponse, Error> {
        Ok(LedgerWriteResponse { balance: 0 })
    }

    async fn claim_daily_reward(
        &self,
        _request: ClaimDailyRewardRequest,
    ) -> Result<ClaimDailyRewardResponse, Error> {
        Ok(ClaimDailyRewardResponse {
            claimed: false,
            balance: 0,
        })
    }

    async fn mint_deposit(
        &self,
        _request: MintDepositRequest,
    ) -> Result<MintDepositResponse, Error> {
        Ok(MintDepositResponse::mock())
    }
}
