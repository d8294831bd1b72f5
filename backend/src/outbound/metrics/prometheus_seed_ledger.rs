//! Prometheus adapter for SEED ledger write outcomes.
//!
//! # Metrics
//!
//! - **Name**: `seed_ledger_writes_total`
//! - **Type**: Counter
//! - **Labels**:
//!   - `operation`: `click_earn`, `spend`, or `daily_reward`
//!   - `category`: spend category (`journal`, `ai`, `game`, `other`) or `none`
//!   - `outcome`: `accepted`, `already_claimed`, or the rejection code

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{
    LedgerOperation, LedgerOutcome, SeedLedgerMetrics, SeedLedgerMetricsError,
};

/// Prometheus-backed ledger metrics recorder.
pub struct PrometheusSeedLedgerMetrics {
    writes_total: CounterVec,
}

impl PrometheusSeedLedgerMetrics {
    /// Create and register the counter with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error when a metric with the same name is already
    /// registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let writes_total = CounterVec::new(
            Opts::new(
                "seed_ledger_writes_total",
                "SEED ledger writes by operation, category and outcome",
            ),
            &["operation", "category", "outcome"],
        )?;
        registry.register(Box::new(writes_total.clone()))?;
        Ok(Self { writes_total })
    }
}

#[async_trait]
impl SeedLedgerMetrics for PrometheusSeedLedgerMetrics {
    async fn record(
        &self,
        operation: LedgerOperation,
        outcome: LedgerOutcome,
    ) -> Result<(), SeedLedgerMetricsError> {
        self.writes_total
            .get_metric_with_label_values(&[
                operation.as_str(),
                operation.category(),
                outcome.as_str(),
            ])
            .map_err(|error| SeedLedgerMetricsError::export(error.to_string()))?
            .inc();
        Ok(())
    }
}
