//! Session Config

use std::path::PathBuf;

use clap::Args;
use rusty_money::{Findable, iso::Currency};
use storefront::engine::ReconciliationPolicy;

/// Stock reconciliation policy.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PolicyArg {
    /// Local stock until checkout, then one batch commit.
    Optimistic,

    /// Every add is reserved on the inventory service.
    ServerAuthoritative,
}

impl From<PolicyArg> for ReconciliationPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Optimistic => Self::OptimisticLocal,
            PolicyArg::ServerAuthoritative => Self::ServerAuthoritative,
        }
    }
}

/// Cart session settings.
#[derive(Debug, Args)]
pub struct SessionConfig {
    /// Stock reconciliation policy (optimistic, server-authoritative)
    #[arg(long, env = "STOREFRONT_POLICY", value_enum, default_value_t = PolicyArg::Optimistic)]
    pub policy: PolicyArg,

    /// ISO currency code used to display prices
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "CLP", value_parser = parse_currency)]
    pub currency: &'static Currency,

    /// Directory receipts are written to after checkout
    #[arg(long, env = "STOREFRONT_RECEIPT_DIR", default_value = ".")]
    pub receipt_dir: PathBuf,
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    Currency::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| format!("unknown currency code: {code}"))
}
