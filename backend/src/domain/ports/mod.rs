//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod seed_ledger_command;
mod seed_ledger_metrics;
mod seed_ledger_query;
mod seed_ledger_repository;

#[cfg(test)]
pub use seed_ledger_command::MockSeedLedgerCommand;
pub use seed_ledger_command::{
    ClaimDailyRewardRequest, ClaimDailyRewardResponse, ClickEarnRequest, FixtureSeedLedgerCommand,
    LedgerWriteResponse, MINT_DEPOSIT_MESSAGE, MINT_DEPOSIT_MODE, MintDepositRequest,
    MintDepositResponse, SeedLedgerCommand, SpendRequest,
};
#[cfg(test)]
pub use seed_ledger_metrics::MockSeedLedgerMetrics;
pub use seed_ledger_metrics::{
    LedgerOperation, LedgerOutcome, NoOpSeedLedgerMetrics, SeedLedgerMetrics,
    SeedLedgerMetricsError,
};
#[cfg(test)]
pub use seed_ledger_query::MockSeedLedgerQuery;
pub use seed_ledger_query::{
    BalanceRequest, BalanceResponse, DailyStatusRequest, DailyStatusResponse,
    FixtureSeedLedgerQuery, GlobalLedgerExportRequest, GlobalLedgerRequest, GlobalLedgerResponse,
    LedgerExportRequest, LedgerPageRequest, LedgerRequest, LedgerResponse, SeedLedgerQuery,
};
#[cfg(test)]
pub use seed_ledger_repository::MockSeedLedgerRepository;
pub use seed_ledger_repository::{
    FixtureSeedLedgerRepository, LedgerPage, SeedLedgerRepository, SeedLedgerRepositoryError,
};
