//! Storefront configuration module

use clap::Parser;

use crate::config::{observability::LoggingConfig, service::ServiceConfig, session::SessionConfig};

pub mod observability;
pub mod service;
pub mod session;

pub use observability::LogFormat;
pub use session::PolicyArg;

/// Storefront configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront catalog and cart", long_about = None)]
pub struct AppConfig {
    /// Inventory service settings.
    #[command(flatten)]
    pub service: ServiceConfig,

    /// Cart session settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
