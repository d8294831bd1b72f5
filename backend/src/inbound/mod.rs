//! Inbound adapters translating external requests into ledger port calls.
//!
//! HTTP handlers live under [`http`]; framework details stay at this edge.

pub mod http;
