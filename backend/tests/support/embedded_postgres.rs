//! Database provisioning for suites running against embedded PostgreSQL.
//!
//! Databases are dropped and recreated with `postgres` rather than Diesel so
//! `DROP DATABASE` runs outside a transaction. The schema comes from the
//! migrations embedded in the library.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use seed_ledger::outbound::persistence::MIGRATIONS;

use super::format_postgres_error;

/// Drop and recreate `name`, apply migrations and return its URL.
pub fn fresh_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut admin = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    // Each statement on its own: neither may run inside a transaction block.
    for statement in [
        format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#),
        format!(r#"CREATE DATABASE "{name}""#),
    ] {
        admin
            .batch_execute(&statement)
            .map_err(|err| format_postgres_error(&err))?;
    }

    let url = cluster.connection().database_url(name);
    let mut conn = PgConnection::establish(&url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(url)
}

/// Run a raw statement against `url`, bypassing the repository.
pub fn execute_raw(url: &str, statement: &str) -> Result<u64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .execute(statement, &[])
        .map_err(|err| format_postgres_error(&err))
}
