//! App Context

use storefront::{engine::ReconciliationEngine, remote::RemoteError};
use thiserror::Error;
use tracing::info;

use crate::{
    config::AppConfig,
    remote::HttpInventoryRemote,
    shell::ShellSettings,
};

/// Errors raised while wiring the application together.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The HTTP client for the inventory service could not be built.
    #[error("failed to build inventory client")]
    Remote(#[source] RemoteError),
}

/// Everything a storefront session needs.
#[derive(Debug)]
pub struct AppContext {
    /// Engine bound to the configured inventory service.
    pub engine: ReconciliationEngine<HttpInventoryRemote>,

    /// Display and receipt settings for the shell.
    pub shell: ShellSettings,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let remote =
            HttpInventoryRemote::new(config.service.remote()).map_err(AppInitError::Remote)?;
        let policy = config.session.policy.into();

        info!(url = remote.url(), %policy, "inventory service configured");

        Ok(Self {
            engine: ReconciliationEngine::new(remote, policy),
            shell: ShellSettings {
                currency: config.session.currency,
                receipt_dir: config.session.receipt_dir.clone(),
            },
        })
    }
}
