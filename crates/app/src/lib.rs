//! Storefront application: configuration, logging, the HTTP inventory
//! client and the interactive shell.

pub mod config;
pub mod context;
pub mod observability;
pub mod remote;
pub mod shell;
