//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every ledger endpoint, the health probes and the
//! schemas they reference. Swagger UI serves it in debug builds and
//! `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::identity::IDENTITY_HEADER;
use crate::inbound::http::schemas::{LedgerPageSchema, PaginationLinksSchema};
use crate::inbound::http::seed_dto::{
    BalanceResponseBody, ClickRequestBody, DailyStatusResponseBody, GlobalLedgerEntryBody,
    LedgerEntryBody, MintDepositRequestBody, MintDepositResponseBody, RewardResponseBody,
    SpendRequestBody, WriteResponseBody,
};

/// Register the gateway-supplied identity header as the security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "IdentityHeader",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                IDENTITY_HEADER,
                "Verified email or anon: token forwarded by the gateway.",
            ))),
        );
    }
}

/// OpenAPI document for the SEED ledger API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "SEED ledger API",
        description = "Append-only SEED token ledger with daily earning limits.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("IdentityHeader" = [])),
    paths(
        crate::inbound::http::seed::get_balance,
        crate::inbound::http::seed::click_earn,
        crate::inbound::http::seed::spend,
        crate::inbound::http::seed::ledger,
        crate::inbound::http::seed::ledger_pages,
        crate::inbound::http::seed::ledger_csv,
        crate::inbound::http::seed::ledger_json,
        crate::inbound::http::seed::global_ledger,
        crate::inbound::http::seed::global_ledger_csv,
        crate::inbound::http::seed::global_ledger_json,
        crate::inbound::http::seed::claim_reward,
        crate::inbound::http::seed::daily_status,
        crate::inbound::http::seed::mint_deposit,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        BalanceResponseBody,
        ClickRequestBody,
        SpendRequestBody,
        WriteResponseBody,
        LedgerEntryBody,
        GlobalLedgerEntryBody,
        LedgerPageSchema,
        PaginationLinksSchema,
        RewardResponseBody,
        DailyStatusResponseBody,
        MintDepositRequestBody,
        MintDepositResponseBody,
    )),
    tags(
        (name = "seed", description = "SEED balance, earning, spending and exports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
