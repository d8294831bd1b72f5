//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Append-only SEED ledger events.
    ///
    /// Rows are never updated or deleted; a trigger rejects both.
    seed_events (id) {
        /// Primary key; breaks ties between equal `created_at` values.
        id -> Int8,
        /// Account email or `anon:` session key.
        identity -> Varchar,
        /// `CLICK_EARN`, `SPEND_<REASON>`, `JOURNAL_DAILY`, ...
        event_type -> Varchar,
        /// Signed, non-zero amount.
        delta -> Int8,
        /// Optional link or context reference.
        #[sql_name = "ref"]
        reference -> Nullable<Varchar>,
        /// Optional free-form JSON metadata.
        meta -> Nullable<Jsonb>,
        /// UTC write time.
        created_at -> Timestamptz,
    }
}
