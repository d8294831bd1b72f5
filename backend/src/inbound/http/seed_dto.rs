//! Request and response bodies for the SEED ledger endpoints.
//!
//! Field names are snake_case on the wire; `reference` travels as `ref`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    ClaimDailyRewardResponse, DailyStatusResponse, MintDepositResponse,
};
use crate::domain::{Error, GlobalLedgerEntry, LedgerEntry};

/// Message returned when the daily reward was already claimed.
pub const ALREADY_REWARDED_MESSAGE: &str = "Already rewarded today";

/// Body for `POST /seed/click`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClickRequestBody {
    /// Link identifier, not the raw URL.
    #[serde(rename = "ref")]
    #[schema(rename = "ref", example = "linkA")]
    pub reference: String,
}

/// Body for `POST /seed/spend`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SpendRequestBody {
    #[schema(example = 2)]
    pub amount: i64,
    #[schema(example = "game")]
    pub reason: String,
}

/// Body for `POST /seed/mint-deposit`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MintDepositRequestBody {
    pub amount: i64,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponseBody {
    pub balance: i64,
}

/// Acknowledgement of a successful ledger write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WriteResponseBody {
    pub ok: bool,
    pub balance: i64,
}

impl WriteResponseBody {
    pub fn ok(balance: i64) -> Self {
        Self { ok: true, balance }
    }
}

/// Outcome of a daily reward claim. `claimed: false` is not a failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RewardResponseBody {
    pub ok: bool,
    pub claimed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ClaimDailyRewardResponse> for RewardResponseBody {
    fn from(value: ClaimDailyRewardResponse) -> Self {
        Self {
            ok: true,
            claimed: value.claimed,
            balance: Some(value.balance),
            message: (!value.claimed).then(|| ALREADY_REWARDED_MESSAGE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyStatusResponseBody {
    pub reward_claimed_today: bool,
    /// SEED earned today; spends do not reduce it.
    pub earned_today: i64,
    pub daily_cap: i64,
}

impl From<DailyStatusResponse> for DailyStatusResponseBody {
    fn from(value: DailyStatusResponse) -> Self {
        Self {
            reward_claimed_today: value.reward_claimed_today,
            earned_today: value.earned_today,
            daily_cap: value.daily_cap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MintDepositResponseBody {
    pub ok: bool,
    pub mode: String,
    pub message: String,
}

impl From<MintDepositResponse> for MintDepositResponseBody {
    fn from(value: MintDepositResponse) -> Self {
        Self {
            ok: value.ok,
            mode: value.mode,
            message: value.message,
        }
    }
}

/// Per-identity ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryBody {
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(example = "CLICK_EARN")]
    pub event_type: String,
    pub delta: i64,
    #[serde(rename = "ref")]
    #[schema(rename = "ref")]
    pub reference: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Value>,
    pub balance_after: i64,
}

impl From<LedgerEntry> for LedgerEntryBody {
    fn from(value: LedgerEntry) -> Self {
        Self {
            created_at: value.created_at.to_rfc3339(),
            event_type: value.event_type,
            delta: value.delta,
            reference: value.reference,
            meta: value.meta,
            balance_after: value.balance_after,
        }
    }
}

/// Cross-identity ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GlobalLedgerEntryBody {
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(example = "ab***@example.com")]
    pub identity: String,
    pub event_type: String,
    pub delta: i64,
    #[serde(rename = "ref")]
    #[schema(rename = "ref")]
    pub reference: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Value>,
}

impl From<GlobalLedgerEntry> for GlobalLedgerEntryBody {
    fn from(value: GlobalLedgerEntry) -> Self {
        Self {
            created_at: value.created_at.to_rfc3339(),
            identity: value.identity,
            event_type: value.event_type,
            delta: value.delta,
            reference: value.reference,
            meta: value.meta,
        }
    }
}

pub const LEDGER_DEFAULT_LIMIT: u32 = 100;
pub const LEDGER_MAX_LIMIT: u32 = 1000;
pub const GLOBAL_DEFAULT_LIMIT: u32 = 200;
pub const GLOBAL_MAX_LIMIT: u32 = 2000;

/// Offset paging parameters for `GET /seed/ledger`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LedgerQuery {
    /// Rows to return, 1 to 1000, default 100.
    pub limit: Option<i64>,
    /// Rows to skip, default 0.
    pub offset: Option<i64>,
}

/// Keyset paging parameters for `GET /seed/ledger/pages`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LedgerPagesQuery {
    /// Rows to return, 1 to 1000, default 100.
    pub limit: Option<i64>,
    /// Opaque token from a previous page's `nextCursor`.
    pub cursor: Option<String>,
}

/// Parameters for the global ledger listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GlobalLedgerQuery {
    /// Rows to return, 1 to 2000, default 200.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// `1` asks for unmasked identities; only honoured for admins.
    pub raw: Option<i64>,
}

/// Parameters for the global ledger exports.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GlobalExportQuery {
    pub raw: Option<i64>,
}

fn out_of_range(field: &str, value: i64, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": format!("invalid_{field}"),
    }))
}

/// Validate a page size, applying `default` when absent.
pub fn parse_limit(limit: Option<i64>, default: u32, max: u32) -> Result<u32, Error> {
    let Some(value) = limit else {
        return Ok(default);
    };
    match u32::try_from(value) {
        Ok(parsed) if (1..=max).contains(&parsed) => Ok(parsed),
        _ => Err(out_of_range(
            "limit",
            value,
            format!("limit must be between 1 and {max}"),
        )),
    }
}

pub fn parse_offset(offset: Option<i64>) -> Result<u64, Error> {
    let value = offset.unwrap_or(0);
    u64::try_from(value)
        .map_err(|_| out_of_range("offset", value, "offset must not be negative".to_owned()))
}

/// Interpret the `raw` flag, which only accepts 0 or 1.
pub fn parse_raw(raw: Option<i64>) -> Result<bool, Error> {
    match raw.unwrap_or(0) {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(out_of_range("raw", other, "raw must be 0 or 1".to_owned())),
    }
}
