//! Ledger policy configuration loaded via OrthoConfig.
//!
//! Values come from `SEED_*` environment variables, configuration files or
//! command-line flags and are validated into a [`LedgerPolicy`] at startup.

use std::num::NonZeroU32;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::domain::{DEFAULT_CLICK_COOLDOWN_HOURS, DEFAULT_JOURNAL_REWARD, LedgerPolicy};

/// Errors raised while turning settings into a ledger policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("daily earn cap must be positive, got {0}")]
    NonPositiveDailyCap(i64),
    #[error("journal reward amount must be positive, got {0}")]
    NonPositiveReward(u32),
}

/// Tunable ledger limits.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SEED")]
pub struct LedgerSettings {
    /// Maximum total of positive deltas per identity per UTC day.
    #[ortho_config(default = 30)]
    pub daily_earn_cap: i64,
    /// Hours before the same click reference can earn again.
    pub click_cooldown_hours: Option<u32>,
    /// Allow-list of click references. Unset accepts any.
    #[serde(default, deserialize_with = "one_or_many")]
    pub allowed_click_refs: Option<Vec<String>>,
    /// Identities permitted to see raw global ledger rows.
    #[serde(default, deserialize_with = "one_or_many")]
    pub admin_identities: Option<Vec<String>>,
    /// SEED credited by the daily journal reward.
    pub journal_reward_amount: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Comma-separated environment values arrive as sequences; a single item
/// arrives as a plain string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }),
    )
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| {
            let trimmed = item.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect()
}

impl LedgerSettings {
    /// Validate the settings and build the policy they describe.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the cap or reward is not positive.
    pub fn into_policy(self) -> Result<LedgerPolicy, SettingsError> {
        let daily_cap = self.daily_earn_cap;
        if daily_cap <= 0 {
            return Err(SettingsError::NonPositiveDailyCap(daily_cap));
        }
        let reward = match self.journal_reward_amount {
            Some(amount) => {
                NonZeroU32::new(amount).ok_or(SettingsError::NonPositiveReward(amount))?
            }
            None => DEFAULT_JOURNAL_REWARD,
        };
        let cooldown = self
            .click_cooldown_hours
            .unwrap_or(DEFAULT_CLICK_COOLDOWN_HOURS);
        let allowed = self.allowed_click_refs.map(clean_list);
        let admins = self.admin_identities.map(clean_list).unwrap_or_default();

        Ok(LedgerPolicy::default()
            .with_daily_earn_cap(daily_cap)
            .with_click_cooldown_hours(cooldown)
            .with_allowed_click_refs(allowed)
            .with_admin_identities(admins)
            .with_journal_reward_amount(reward))
    }
}
