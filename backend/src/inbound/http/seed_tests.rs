//! Tests for SEED ledger HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{FixtureSeedLedgerCommand, MockSeedLedgerQuery};
use crate::domain::{LedgerPolicy, SeedLedgerService};
use crate::inbound::http::identity::IDENTITY_HEADER;
use crate::outbound::memory::InMemorySeedLedgerRepository;
use crate::test_support::MutableClock;

const USER: &str = "ab@example.com";
const ADMIN: &str = "admin@example.com";

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 17, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

struct Harness {
    state: HttpState,
    clock: Arc<MutableClock>,
}

#[fixture]
fn harness() -> Harness {
    let clock = Arc::new(MutableClock::new(noon()));
    let policy = LedgerPolicy::default()
        .with_daily_earn_cap(3)
        .with_admin_identities([ADMIN]);
    let service = Arc::new(SeedLedgerService::new(
        Arc::new(InMemorySeedLedgerRepository::new()),
        clock.clone(),
        policy,
    ));
    Harness {
        state: HttpState::from_service(service),
        clock,
    }
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api/v1").configure(configure))
}

fn post(uri: &str, identity: Option<&str>, body: Value) -> actix_http::Request {
    let mut request = actix_test::TestRequest::post().uri(uri).set_json(body);
    if let Some(identity) = identity {
        request = request.insert_header((IDENTITY_HEADER, identity));
    }
    request.to_request()
}

fn get(uri: &str, identity: Option<&str>) -> actix_http::Request {
    let mut request = actix_test::TestRequest::get().uri(uri);
    if let Some(identity) = identity {
        request = request.insert_header((IDENTITY_HEADER, identity));
    }
    request.to_request()
}

macro_rules! call_json {
    ($app:expr, $request:expr) => {{
        let response = actix_test::call_service(&$app, $request).await;
        let status = response.status();
        let body: Value = actix_test::read_body_json(response).await;
        (status, body)
    }};
}

#[rstest]
#[actix_web::test]
async fn click_earn_credits_one_seed(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "balance": 1}));
}

#[rstest]
#[case(None)]
#[case(Some("anon:abc"))]
#[actix_web::test]
async fn click_earn_requires_login(harness: Harness, #[case] identity: Option<&str>) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        post("/api/v1/seed/click", identity, json!({"ref": "linkA"}))
    );

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "auth_required");
}

#[rstest]
#[actix_web::test]
async fn repeated_click_hits_cooldown_and_cap(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (first, _) = call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );
    let (again, body) = call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );
    assert_eq!(first, StatusCode::OK);
    assert_eq!(again, StatusCode::CONFLICT);
    assert_eq!(body["code"], "cooldown_active");

    for reference in ["linkB", "linkC"] {
        let (status, _) = call_json!(
            app,
            post("/api/v1/seed/click", Some(USER), json!({"ref": reference}))
        );
        assert_eq!(status, StatusCode::OK);
    }
    let (capped, body) = call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkD"}))
    );
    assert_eq!(capped, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "daily_cap_exceeded");
}

#[rstest]
#[actix_web::test]
async fn spend_without_funds_is_payment_required(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        post("/api/v1/seed/spend", Some(USER), json!({"amount": 1, "reason": "game"}))
    );

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "insufficient_balance");
}

#[rstest]
#[case(json!({"amount": 0, "reason": "game"}))]
#[case(json!({"amount": 1, "reason": ""}))]
#[case(json!({"amount": "two", "reason": "game"}))]
#[actix_web::test]
async fn spend_rejects_invalid_payloads(harness: Harness, #[case] payload: Value) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(app, post("/api/v1/seed/spend", Some(USER), payload));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn daily_reward_is_idempotent_per_day(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, first) = call_json!(
        app,
        post("/api/v1/seed/reward/journal", Some(USER), json!({}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["claimed"], json!(true));
    assert_eq!(first["balance"], json!(5));

    let (status, second) = call_json!(
        app,
        post("/api/v1/seed/reward/journal", Some(USER), json!({}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["ok"], json!(true));
    assert_eq!(second["claimed"], json!(false));
    assert_eq!(second["message"], json!("Already rewarded today"));

    harness.clock.advance(TimeDelta::days(1));
    let (_, next_day) = call_json!(
        app,
        post("/api/v1/seed/reward/journal", Some(USER), json!({}))
    );
    assert_eq!(next_day["claimed"], json!(true));
    assert_eq!(next_day["balance"], json!(10));
}

#[rstest]
#[actix_web::test]
async fn unknown_reward_is_bad_request(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        post("/api/v1/seed/reward/meditation", Some(USER), json!({}))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "unknown_reward");
}

#[rstest]
#[actix_web::test]
async fn ledger_lists_newest_first_with_balance_after(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;
    call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );
    harness.clock.advance(TimeDelta::minutes(1));
    call_json!(
        app,
        post("/api/v1/seed/reward/journal", Some(USER), json!({}))
    );
    harness.clock.advance(TimeDelta::minutes(1));
    call_json!(
        app,
        post("/api/v1/seed/spend", Some(USER), json!({"amount": 2, "reason": "game"}))
    );

    let (status, body) = call_json!(app, get("/api/v1/seed/ledger", Some(USER)));

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array body");
    let summary: Vec<(String, i64, i64)> = rows
        .iter()
        .map(|row| {
            (
                row["event_type"].as_str().unwrap_or_default().to_owned(),
                row["delta"].as_i64().unwrap_or_default(),
                row["balance_after"].as_i64().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("SPEND_GAME".to_owned(), -2, 4),
            ("JOURNAL_DAILY".to_owned(), 5, 6),
            ("CLICK_EARN".to_owned(), 1, 1),
        ]
    );
    assert_eq!(rows[2]["ref"], "linkA");

    let (_, offset_page) = call_json!(
        app,
        get("/api/v1/seed/ledger?limit=1&offset=1", Some(USER))
    );
    assert_eq!(offset_page[0]["balance_after"], json!(6));
}

#[rstest]
#[case("limit=0")]
#[case("limit=1001")]
#[case("offset=-1")]
#[case("limit=abc")]
#[actix_web::test]
async fn ledger_rejects_bad_paging(harness: Harness, #[case] query: &str) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        get(&format!("/api/v1/seed/ledger?{query}"), Some(USER))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn cursor_pages_walk_the_whole_ledger(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;
    for reference in ["linkA", "linkB", "linkC"] {
        call_json!(
            app,
            post("/api/v1/seed/click", Some(USER), json!({"ref": reference}))
        );
        harness.clock.advance(TimeDelta::minutes(1));
    }

    let (status, first) = call_json!(app, get("/api/v1/seed/ledger/pages?limit=2", Some(USER)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["limit"], json!(2));
    assert_eq!(first["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(first["data"][0]["balance_after"], json!(3));
    let cursor = first["nextCursor"].as_str().expect("next cursor").to_owned();
    assert!(first["links"]["next"].is_string());

    let (_, second) = call_json!(
        app,
        get(&format!("/api/v1/seed/ledger/pages?limit=2&cursor={cursor}"), Some(USER))
    );
    assert_eq!(second["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(second["data"][0]["ref"], "linkA");
    assert_eq!(second["data"][0]["balance_after"], json!(1));
    assert!(second.get("nextCursor").is_none());
}

#[rstest]
#[actix_web::test]
async fn malformed_cursor_is_bad_request(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        get("/api/v1/seed/ledger/pages?cursor=not-a-cursor", Some(USER))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "invalid_cursor");
}

#[rstest]
#[case(None, "ab***@example.com")]
#[case(Some(USER), "ab***@example.com")]
#[case(Some(ADMIN), "ab@example.com")]
#[actix_web::test]
async fn global_ledger_masks_unless_admin_asks_raw(
    harness: Harness,
    #[case] requester: Option<&str>,
    #[case] expected: &str,
) {
    let app = actix_test::init_service(test_app(harness.state)).await;
    call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );

    let (status, body) = call_json!(app, get("/api/v1/seed/ledger/global?raw=1", requester));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["identity"], expected);
    assert!(body[0].get("balance_after").is_none());
}

#[rstest]
#[actix_web::test]
async fn global_ledger_rejects_unknown_raw_flag(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, _) = call_json!(app, get("/api/v1/seed/ledger/global?raw=2", None));

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn csv_export_is_an_attachment(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;
    call_json!(
        app,
        post("/api/v1/seed/reward/journal", Some(USER), json!({}))
    );

    let response = actix_test::call_service(&app, get("/api/v1/seed/ledger.csv", Some(USER))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(actix_web::http::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("content disposition");
    assert!(disposition.contains("seed_ledger.csv"));

    let body = actix_test::read_body(response).await;
    let text = String::from_utf8(body.to_vec()).expect("utf-8 body");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("created_at,event_type,delta,ref,balance_after,meta_json")
    );
    assert!(
        lines
            .next()
            .is_some_and(|line| line.contains("JOURNAL_DAILY,5,,5,"))
    );
}

#[rstest]
#[actix_web::test]
async fn global_json_export_is_oldest_first(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;
    call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );
    harness.clock.advance(TimeDelta::minutes(1));
    call_json!(
        app,
        post("/api/v1/seed/click", Some(ADMIN), json!({"ref": "linkA"}))
    );

    let (status, body) = call_json!(app, get("/api/v1/seed/ledger.global.json", Some(ADMIN)));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["identity"], "ab***@example.com");
    assert_eq!(body[1]["identity"], "ad***@example.com");
}

#[rstest]
#[actix_web::test]
async fn daily_status_reports_earnings_before_spends(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;
    call_json!(
        app,
        post("/api/v1/seed/click", Some(USER), json!({"ref": "linkA"}))
    );
    let (spent, _) = call_json!(
        app,
        post("/api/v1/seed/spend", Some(USER), json!({"amount": 1, "reason": "game"}))
    );
    assert_eq!(spent, StatusCode::OK);

    let (status, body) = call_json!(app, get("/api/v1/seed/daily", Some(USER)));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"reward_claimed_today": false, "earned_today": 1, "daily_cap": 3})
    );
}

#[rstest]
#[actix_web::test]
async fn mint_deposit_is_acknowledged_without_credit(harness: Harness) {
    let app = actix_test::init_service(test_app(harness.state)).await;

    let (status, body) = call_json!(
        app,
        post("/api/v1/seed/mint-deposit", Some(USER), json!({"amount": 3}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["mode"], "mock");

    let (_, balance) = call_json!(app, get("/api/v1/seed/balance", Some(USER)));
    assert_eq!(balance, json!({"balance": 0}));
}

#[rstest]
#[actix_web::test]
async fn repository_outage_maps_to_service_unavailable() {
    let mut query = MockSeedLedgerQuery::new();
    query
        .expect_balance()
        .times(1)
        .return_once(|_| Err(Error::service_unavailable("database down")));
    let state = HttpState::new(Arc::new(FixtureSeedLedgerCommand), Arc::new(query));
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = call_json!(app, get("/api/v1/seed/balance", Some(USER)));

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted() {
    let mut query = MockSeedLedgerQuery::new();
    query
        .expect_daily_status()
        .times(1)
        .return_once(|_| Err(Error::internal("relation seed_events does not exist")));
    let state = HttpState::new(Arc::new(FixtureSeedLedgerCommand), Arc::new(query));
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = call_json!(app, get("/api/v1/seed/daily", Some(USER)));

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}
