//! Carbon Performance Index ledger for tenanted buildings.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// CPI formulas, discount tiers and batch recomputation.
pub mod cpi;
pub mod error;
pub mod io;
pub mod ledger;
pub mod model;
pub mod observability;
pub mod seed;
/// Repository abstraction and the in-memory store.
pub mod store;
