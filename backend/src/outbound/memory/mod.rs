//! Process-local adapters used when no database is configured.

mod in_memory_seed_ledger_repository;

pub use in_memory_seed_ledger_repository::InMemorySeedLedgerRepository;
