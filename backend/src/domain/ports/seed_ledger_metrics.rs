//! Domain port for recording ledger write outcomes.
//!
//! Labels are bounded enumerations so exporters never see free-form values
//! such as identities or references.

use async_trait::async_trait;

use crate::domain::{LedgerPolicyViolation, SpendCategory};

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording ledger metrics.
    pub enum SeedLedgerMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "seed ledger metrics exporter failed: {message}",
    }
}

/// Ledger write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOperation {
    ClickEarn,
    Spend(SpendCategory),
    DailyReward,
}

impl LedgerOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClickEarn => "click_earn",
            Self::Spend(_) => "spend",
            Self::DailyReward => "daily_reward",
        }
    }

    /// Spend category label; `none` for non-spend operations.
    pub fn category(self) -> &'static str {
        match self {
            Self::Spend(category) => category.as_str(),
            Self::ClickEarn | Self::DailyReward => "none",
        }
    }
}

/// Outcome of a ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOutcome {
    Accepted,
    AlreadyClaimed,
    Rejected(&'static str),
}

impl LedgerOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::AlreadyClaimed => "already_claimed",
            Self::Rejected(reason) => reason,
        }
    }
}

impl From<&LedgerPolicyViolation> for LedgerOutcome {
    fn from(value: &LedgerPolicyViolation) -> Self {
        Self::Rejected(value.as_str())
    }
}

/// Metrics recording port for ledger writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeedLedgerMetrics: Send + Sync {
    async fn record(
        &self,
        operation: LedgerOperation,
        outcome: LedgerOutcome,
    ) -> Result<(), SeedLedgerMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSeedLedgerMetrics;

#[async_trait]
impl SeedLedgerMetrics for NoOpSeedLedgerMetrics {
    async fn record(
        &self,
        _operation: LedgerOperation,
        _outcome: LedgerOutcome,
    ) -> Result<(), SeedLedgerMetricsError> {
        Ok(())
    }
}
