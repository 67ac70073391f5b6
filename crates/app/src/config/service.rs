//! Inventory Service Config

use std::time::Duration;

use clap::Args;

use crate::remote::HttpRemoteConfig;

/// Inventory service connection settings.
#[derive(Debug, Args)]
pub struct ServiceConfig {
    /// Inventory service web app URL
    #[arg(long, env = "STOREFRONT_SERVICE_URL")]
    pub service_url: String,

    /// Timeout for each request to the inventory service, in seconds
    #[arg(long, env = "STOREFRONT_REQUEST_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// HTTP client settings for the inventory service.
    #[must_use]
    pub fn remote(&self) -> HttpRemoteConfig {
        HttpRemoteConfig {
            url: self.service_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }
}
