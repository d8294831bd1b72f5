//! SEED ledger HTTP handlers.
//!
//! ```text
//! GET  /api/v1/seed/balance
//! POST /api/v1/seed/click
//! POST /api/v1/seed/spend
//! GET  /api/v1/seed/ledger
//! GET  /api/v1/seed/ledger/pages
//! GET  /api/v1/seed/ledger.csv
//! GET  /api/v1/seed/ledger.json
//! GET  /api/v1/seed/ledger/global
//! GET  /api/v1/seed/ledger.global.csv
//! GET  /api/v1/seed/ledger.global.json
//! POST /api/v1/seed/reward/{kind}
//! GET  /api/v1/seed/daily
//! POST /api/v1/seed/mint-deposit
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use pagination::{Cursor, PageLimit, Paginated};
use serde_json::json;

use crate::domain::ports::{
    BalanceRequest, ClaimDailyRewardRequest, ClickEarnRequest, DailyStatusRequest,
    GlobalLedgerExportRequest, GlobalLedgerRequest, LedgerExportRequest, LedgerPage,
    LedgerPageRequest, LedgerRequest, MintDepositRequest, SpendRequest,
};
use crate::domain::{DailyRewardKind, Error, LedgerPosition};
use crate::inbound::http::ApiResult;
use crate::inbound::http::export::{
    GLOBAL_LEDGER_CSV_FILENAME, LEDGER_CSV_FILENAME, csv_download, render_global_ledger_csv,
    render_ledger_csv,
};
use crate::inbound::http::identity::RequestIdentity;
use crate::inbound::http::seed_dto::{
    BalanceResponseBody, ClickRequestBody, DailyStatusResponseBody, GLOBAL_DEFAULT_LIMIT,
    GLOBAL_MAX_LIMIT, GlobalExportQuery, GlobalLedgerEntryBody, GlobalLedgerQuery,
    LEDGER_DEFAULT_LIMIT, LEDGER_MAX_LIMIT, LedgerEntryBody, LedgerPagesQuery, LedgerQuery,
    MintDepositRequestBody, MintDepositResponseBody, RewardResponseBody, SpendRequestBody,
    WriteResponseBody, parse_limit, parse_offset, parse_raw,
};
use crate::inbound::http::state::HttpState;

/// Register every ledger handler along with JSON-error extractor configs.
///
/// Mount inside the `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
    )
    .service(get_balance)
    .service(click_earn)
    .service(spend)
    .service(ledger_pages)
    .service(global_ledger)
    .service(ledger)
    .service(ledger_csv)
    .service(ledger_json)
    .service(global_ledger_csv)
    .service(global_ledger_json)
    .service(claim_reward)
    .service(daily_status)
    .service(mint_deposit);
}

fn decode_cursor(token: Option<String>) -> Result<Option<LedgerPosition>, Error> {
    token
        .map(|token| {
            Cursor::<LedgerPosition>::decode(&token)
                .map(Cursor::into_key)
                .map_err(|err| {
                    Error::invalid_request("cursor is invalid").with_details(json!({
                        "field": "cursor",
                        "code": "invalid_cursor",
                        "reason": err.to_string(),
                    }))
                })
        })
        .transpose()
}

fn encode_cursor(position: LedgerPosition) -> Result<String, Error> {
    Cursor::new(position)
        .encode()
        .map_err(|err| Error::internal(format!("failed to encode ledger cursor: {err}")))
}

/// Current balance of the caller.
#[utoipa::path(
    get,
    path = "/api/v1/seed/balance",
    responses(
        (status = 200, description = "Current balance", body = BalanceResponseBody),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Ledger unavailable", body = Error)
    ),
    tags = ["seed"],
    operation_id = "getSeedBalance"
)]
#[get("/seed/balance")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<BalanceResponseBody>> {
    let identity = identity.require()?;
    let response = state
        .seed_ledger_query
        .balance(BalanceRequest { identity })
        .await?;
    Ok(web::Json(BalanceResponseBody {
        balance: response.balance,
    }))
}

/// Earn one SEED for following a link.
#[utoipa::path(
    post,
    path = "/api/v1/seed/click",
    request_body = ClickRequestBody,
    responses(
        (status = 200, description = "Click recorded", body = WriteResponseBody),
        (status = 400, description = "Invalid or unknown link", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Link earned too recently", body = Error),
        (status = 429, description = "Daily earn cap reached", body = Error)
    ),
    tags = ["seed"],
    operation_id = "clickEarn"
)]
#[post("/seed/click")]
pub async fn click_earn(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<ClickRequestBody>,
) -> ApiResult<web::Json<WriteResponseBody>> {
    let identity = identity.require()?;
    let response = state
        .seed_ledger
        .record_click_earn(ClickEarnRequest {
            identity,
            reference: payload.into_inner().reference,
        })
        .await?;
    Ok(web::Json(WriteResponseBody::ok(response.balance)))
}

/// Debit SEED for a named purpose.
#[utoipa::path(
    post,
    path = "/api/v1/seed/spend",
    request_body = SpendRequestBody,
    responses(
        (status = 200, description = "Spend recorded", body = WriteResponseBody),
        (status = 400, description = "Invalid amount or reason", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 402, description = "Insufficient SEED", body = Error)
    ),
    tags = ["seed"],
    operation_id = "spendSeed"
)]
#[post("/seed/spend")]
pub async fn spend(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<SpendRequestBody>,
) -> ApiResult<web::Json<WriteResponseBody>> {
    let identity = identity.require()?;
    let SpendRequestBody { amount, reason } = payload.into_inner();
    let response = state
        .seed_ledger
        .spend(SpendRequest {
            identity,
            amount,
            reason,
        })
        .await?;
    Ok(web::Json(WriteResponseBody::ok(response.balance)))
}

/// Newest-first ledger of the caller with running balances.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger",
    params(LedgerQuery),
    responses(
        (status = 200, description = "Ledger rows", body = [LedgerEntryBody]),
        (status = 400, description = "Invalid paging parameters", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "listSeedLedger"
)]
#[get("/seed/ledger")]
pub async fn ledger(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    query: web::Query<LedgerQuery>,
) -> ApiResult<web::Json<Vec<LedgerEntryBody>>> {
    let identity = identity.require()?;
    let LedgerQuery { limit, offset } = query.into_inner();
    let page = LedgerPage {
        limit: parse_limit(limit, LEDGER_DEFAULT_LIMIT, LEDGER_MAX_LIMIT)?,
        offset: parse_offset(offset)?,
    };
    let response = state
        .seed_ledger_query
        .ledger(LedgerRequest { identity, page })
        .await?;
    Ok(web::Json(
        response.entries.into_iter().map(LedgerEntryBody::from).collect(),
    ))
}

/// Cursor-paginated ledger of the caller.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger/pages",
    params(LedgerPagesQuery),
    responses(
        (status = 200, description = "Ledger page", body = crate::inbound::http::schemas::LedgerPageSchema),
        (status = 400, description = "Invalid limit or cursor", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "pageSeedLedger"
)]
#[get("/seed/ledger/pages")]
pub async fn ledger_pages(
    req: HttpRequest,
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    query: web::Query<LedgerPagesQuery>,
) -> ApiResult<HttpResponse> {
    let identity = identity.require()?;
    let LedgerPagesQuery { limit, cursor } = query.into_inner();
    let requested = parse_limit(limit, LEDGER_DEFAULT_LIMIT, LEDGER_MAX_LIMIT)?;
    let limit = PageLimit::new(Some(requested), LEDGER_DEFAULT_LIMIT, LEDGER_MAX_LIMIT)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let after = decode_cursor(cursor)?;

    let response = state
        .seed_ledger_query
        .ledger_page(LedgerPageRequest {
            identity,
            after,
            limit: limit.get(),
        })
        .await?;

    let next_cursor = response.next.map(encode_cursor).transpose()?;
    let data: Vec<LedgerEntryBody> = response
        .entries
        .into_iter()
        .map(LedgerEntryBody::from)
        .collect();
    Ok(HttpResponse::Ok().json(Paginated::new(data, limit, next_cursor, &req.full_url())))
}

/// Download the caller's full ledger as CSV, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger.csv",
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "exportSeedLedgerCsv"
)]
#[get("/seed/ledger.csv")]
pub async fn ledger_csv(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<HttpResponse> {
    let identity = identity.require()?;
    let response = state
        .seed_ledger_query
        .export_ledger(LedgerExportRequest { identity })
        .await?;
    let body = render_ledger_csv(&response.entries)?;
    Ok(csv_download(body, LEDGER_CSV_FILENAME))
}

/// Download the caller's full ledger as JSON, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger.json",
    responses(
        (status = 200, description = "JSON export", body = [LedgerEntryBody]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "exportSeedLedgerJson"
)]
#[get("/seed/ledger.json")]
pub async fn ledger_json(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<Vec<LedgerEntryBody>>> {
    let identity = identity.require()?;
    let response = state
        .seed_ledger_query
        .export_ledger(LedgerExportRequest { identity })
        .await?;
    Ok(web::Json(
        response.entries.into_iter().map(LedgerEntryBody::from).collect(),
    ))
}

/// Newest-first ledger across all identities. Identities are masked unless
/// an admin asks for `raw=1`.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger/global",
    params(GlobalLedgerQuery),
    responses(
        (status = 200, description = "Global ledger rows", body = [GlobalLedgerEntryBody]),
        (status = 400, description = "Invalid paging parameters", body = Error)
    ),
    tags = ["seed"],
    operation_id = "listGlobalSeedLedger"
)]
#[get("/seed/ledger/global")]
pub async fn global_ledger(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    query: web::Query<GlobalLedgerQuery>,
) -> ApiResult<web::Json<Vec<GlobalLedgerEntryBody>>> {
    let GlobalLedgerQuery { limit, offset, raw } = query.into_inner();
    let page = LedgerPage {
        limit: parse_limit(limit, GLOBAL_DEFAULT_LIMIT, GLOBAL_MAX_LIMIT)?,
        offset: parse_offset(offset)?,
    };
    let response = state
        .seed_ledger_query
        .global_ledger(GlobalLedgerRequest {
            requester: identity.into_inner(),
            page,
            want_raw: parse_raw(raw)?,
        })
        .await?;
    Ok(web::Json(
        response
            .entries
            .into_iter()
            .map(GlobalLedgerEntryBody::from)
            .collect(),
    ))
}

/// Download the global ledger as CSV, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger.global.csv",
    params(GlobalExportQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid raw flag", body = Error)
    ),
    tags = ["seed"],
    operation_id = "exportGlobalSeedLedgerCsv"
)]
#[get("/seed/ledger.global.csv")]
pub async fn global_ledger_csv(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    query: web::Query<GlobalExportQuery>,
) -> ApiResult<HttpResponse> {
    let response = state
        .seed_ledger_query
        .export_global_ledger(GlobalLedgerExportRequest {
            requester: identity.into_inner(),
            want_raw: parse_raw(query.into_inner().raw)?,
        })
        .await?;
    let body = render_global_ledger_csv(&response.entries)?;
    Ok(csv_download(body, GLOBAL_LEDGER_CSV_FILENAME))
}

/// Download the global ledger as JSON, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/seed/ledger.global.json",
    params(GlobalExportQuery),
    responses(
        (status = 200, description = "JSON export", body = [GlobalLedgerEntryBody]),
        (status = 400, description = "Invalid raw flag", body = Error)
    ),
    tags = ["seed"],
    operation_id = "exportGlobalSeedLedgerJson"
)]
#[get("/seed/ledger.global.json")]
pub async fn global_ledger_json(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    query: web::Query<GlobalExportQuery>,
) -> ApiResult<web::Json<Vec<GlobalLedgerEntryBody>>> {
    let response = state
        .seed_ledger_query
        .export_global_ledger(GlobalLedgerExportRequest {
            requester: identity.into_inner(),
            want_raw: parse_raw(query.into_inner().raw)?,
        })
        .await?;
    Ok(web::Json(
        response
            .entries
            .into_iter()
            .map(GlobalLedgerEntryBody::from)
            .collect(),
    ))
}

/// Claim a once-per-UTC-day reward.
#[utoipa::path(
    post,
    path = "/api/v1/seed/reward/{kind}",
    params(("kind" = String, Path, description = "Reward name, e.g. journal")),
    responses(
        (status = 200, description = "Claimed, or already claimed today", body = RewardResponseBody),
        (status = 400, description = "Unknown reward", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "claimDailyReward"
)]
#[post("/seed/reward/{kind}")]
pub async fn claim_reward(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<RewardResponseBody>> {
    let identity = identity.require()?;
    let kind = DailyRewardKind::parse(&path.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "kind", "code": "unknown_reward" }))
    })?;
    let response = state
        .seed_ledger
        .claim_daily_reward(ClaimDailyRewardRequest { identity, kind })
        .await?;
    Ok(web::Json(RewardResponseBody::from(response)))
}

/// Today's earnings and reward status for the caller.
#[utoipa::path(
    get,
    path = "/api/v1/seed/daily",
    responses(
        (status = 200, description = "Daily status", body = DailyStatusResponseBody),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "getDailyStatus"
)]
#[get("/seed/daily")]
pub async fn daily_status(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<DailyStatusResponseBody>> {
    let identity = identity.require()?;
    let response = state
        .seed_ledger_query
        .daily_status(DailyStatusRequest { identity })
        .await?;
    Ok(web::Json(DailyStatusResponseBody::from(response)))
}

/// Acknowledge an on-chain deposit request without touching the ledger.
#[utoipa::path(
    post,
    path = "/api/v1/seed/mint-deposit",
    request_body = MintDepositRequestBody,
    responses(
        (status = 200, description = "Deposit acknowledged in mock mode", body = MintDepositResponseBody),
        (status = 400, description = "Invalid amount", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["seed"],
    operation_id = "mintDeposit"
)]
#[post("/seed/mint-deposit")]
pub async fn mint_deposit(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<MintDepositRequestBody>,
) -> ApiResult<web::Json<MintDepositResponseBody>> {
    let identity = identity.require()?;
    let MintDepositRequestBody {
        amount,
        wallet_address,
    } = payload.into_inner();
    let response = state
        .seed_ledger
        .mint_deposit(MintDepositRequest {
            identity,
            amount,
            wallet_address,
        })
        .await?;
    Ok(web::Json(MintDepositResponseBody::from(response)))
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
