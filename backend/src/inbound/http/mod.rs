//! HTTP inbound adapter exposing the SEED ledger REST endpoints.

pub mod error;
pub mod export;
pub mod health;
pub mod identity;
pub mod schemas;
pub mod seed;
pub mod seed_dto;
pub mod state;

pub use error::ApiResult;
