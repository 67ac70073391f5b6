//! Storefront
//!
//! Cart and inventory reconciliation for a catalog backed by a remote,
//! spreadsheet-like inventory service.

pub mod engine;
pub mod inventory;
pub mod ledger;
pub mod prelude;
pub mod products;
pub mod receipt;
pub mod remote;
