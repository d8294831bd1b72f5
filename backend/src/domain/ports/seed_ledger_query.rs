//! Driving port for SEED ledger reads and exports.

use async_trait::async_trait;

use crate::domain::{Error, GlobalLedgerEntry, Identity, LedgerEntry, LedgerPosition};

use super::LedgerPage;

/// Request for an identity's balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRequest {
    pub identity: Identity,
}

/// Current balance of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceResponse {
    pub balance: i64,
}

/// Offset page of an identity's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRequest {
    pub identity: Identity,
    pub page: LedgerPage,
}

/// Keyset page of an identity's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPageRequest {
    pub identity: Identity,
    pub after: Option<LedgerPosition>,
    pub limit: u32,
}

/// Newest-first ledger rows with `balance_after`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerResponse {
    pub entries: Vec<LedgerEntry>,
    /// Position to resume from; only set for keyset pages with more rows.
    pub next: Option<LedgerPosition>,
}

/// Offset page of the global ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalLedgerRequest {
    pub requester: Option<Identity>,
    pub page: LedgerPage,
    pub want_raw: bool,
}

/// Global ledger rows with masked or raw identities.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalLedgerResponse {
    pub entries: Vec<GlobalLedgerEntry>,
}

/// Full export of an identity's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerExportRequest {
    pub identity: Identity,
}

/// Full export of the global ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalLedgerExportRequest {
    pub requester: Option<Identity>,
    pub want_raw: bool,
}

/// Request for today's earning status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStatusRequest {
    pub identity: Identity,
}

/// Today's earning status for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStatusResponse {
    pub reward_claimed_today: bool,
    /// Sum of today's positive deltas, the figure the daily cap checks.
    /// Spends are not netted out.
    pub earned_today: i64,
    pub daily_cap: i64,
}

/// Driving port for ledger reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeedLedgerQuery: Send + Sync {
    async fn balance(&self, request: BalanceRequest) -> Result<BalanceResponse, Error>;

    async fn ledger(&self, request: LedgerRequest) -> Result<LedgerResponse, Error>;

    async fn ledger_page(&self, request: LedgerPageRequest) -> Result<LedgerResponse, Error>;

    async fn global_ledger(
        &self,
        request: GlobalLedgerRequest,
    ) -> Result<GlobalLedgerResponse, Error>;

    /// Oldest-first complete history with running balances.
    async fn export_ledger(&self, request: LedgerExportRequest) -> Result<LedgerResponse, Error>;

    /// Oldest-first complete global history.
    async fn export_global_ledger(
        &self,
        request: GlobalLedgerExportRequest,
    ) -> Result<GlobalLedgerResponse, Error>;

    async fn daily_status(&self, request: DailyStatusRequest)
    -> Result<DailyStatusResponse, Error>;
}

/// Fixture query implementation reporting an empty ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSeedLedgerQuery;

#[async_trait]
impl SeedLedgerQuery for FixtureSeedLedgerQuery {
    async fn balance(&self, _request: BalanceRequest) -> Result<BalanceResponse, Error> {
        Ok(BalanceResponse { balance: 0 })
    }

    async fn ledger(&self, _request: LedgerRequest) -> Result<LedgerResponse, Error> {
        Ok(LedgerResponse {
            entries: Vec::new(),
            next: None,
        })
    }

    async fn ledger_page(&self, _request: LedgerPageRequest) -> Result<LedgerResponse, Error> {
        Ok(LedgerResponse {
            entries: Vec::new(),
            next: None,
        })
    }

    async fn global_ledger(
        &self,
        _request: GlobalLedgerRequest,
    ) -> Result<GlobalLedgerResponse, Error> {
        Ok(GlobalLedgerResponse {
            entries: Vec::new(),
        })
    }

    async fn export_ledger(&self, _request: LedgerExportRequest) -> Result<LedgerResponse, Error> {
        Ok(LedgerResponse {
            entries: Vec::new(),
            next: None,
        })
    }

    async fn export_global_ledger(
        &self,
        _request: GlobalLedgerExportRequest,
    ) -> Result<GlobalLedgerResponse, Error> {
        Ok(GlobalLedgerResponse {
            entries: Vec::new(),
        })
    }

    async fn daily_status(
        &self,
        _request: DailyStatusRequest,
    ) -> Result<DailyStatusResponse, Error> {
        Ok(DailyStatusResponse {
            reward_claimed_today: false,
            earned_today: 0,
            daily_cap: crate::domain::DEFAULT_DAILY_EARN_CAP,
        })
    }
}
