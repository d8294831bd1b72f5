//! CSV rendering for ledger exports.
//!
//! The `meta` column holds the event's JSON payload, `{}` when absent.

use actix_web::HttpResponse;
use actix_web::http::header::{
    ContentDisposition, DispositionParam, DispositionType, HeaderValue, CONTENT_TYPE,
};
use serde_json::Value;

use crate::domain::{Error, GlobalLedgerEntry, LedgerEntry};

/// Download name for an identity's ledger.
pub const LEDGER_CSV_FILENAME: &str = "seed_ledger.csv";
/// Download name for the global ledger.
pub const GLOBAL_LEDGER_CSV_FILENAME: &str = "seed_ledger_global.csv";

const LEDGER_HEADER: [&str; 6] = [
    "created_at",
    "event_type",
    "delta",
    "ref",
    "balance_after",
    "meta_json",
];
const GLOBAL_LEDGER_HEADER: [&str; 6] = [
    "created_at",
    "identity",
    "event_type",
    "delta",
    "ref",
    "meta_json",
];

fn meta_cell(meta: Option<&Value>) -> String {
    meta.map_or_else(|| "{}".to_owned(), Value::to_string)
}

fn csv_error(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to render ledger csv: {error}"))
}

fn write_rows<I>(header: [&str; 6], rows: I) -> Result<Vec<u8>, Error>
where
    I: IntoIterator<Item = [String; 6]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.into_inner().map_err(csv_error)
}

/// Render an identity's oldest-first ledger as CSV.
pub fn render_ledger_csv(entries: &[LedgerEntry]) -> Result<Vec<u8>, Error> {
    write_rows(
        LEDGER_HEADER,
        entries.iter().map(|entry| {
            [
                entry.created_at.to_rfc3339(),
                entry.event_type.clone(),
                entry.delta.to_string(),
                entry.reference.clone().unwrap_or_default(),
                entry.balance_after.to_string(),
                meta_cell(entry.meta.as_ref()),
            ]
        }),
    )
}

/// Render global rows as CSV. Identities arrive already masked or raw.
pub fn render_global_ledger_csv(entries: &[GlobalLedgerEntry]) -> Result<Vec<u8>, Error> {
    write_rows(
        GLOBAL_LEDGER_HEADER,
        entries.iter().map(|entry| {
            [
                entry.created_at.to_rfc3339(),
                entry.identity.clone(),
                entry.event_type.clone(),
                entry.delta.to_string(),
                entry.reference.clone().unwrap_or_default(),
                meta_cell(entry.meta.as_ref()),
            ]
        }),
    )
}

fn attachment(filename: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename.to_owned())],
    }
}

/// Wrap a CSV body in a download response.
pub fn csv_download(body: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")))
        .insert_header(attachment(filename))
        .body(body)
}
