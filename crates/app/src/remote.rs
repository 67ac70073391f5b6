//! HTTP client for the inventory service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use storefront::{
    products::Product,
    remote::{
        InventoryRemote, RemoteError, Reservation, StockAdjustment,
        wire::{decode_commit_ack, decode_listing, decode_reservation},
    },
};
use tracing::debug;

/// Configuration for connecting to the inventory service.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    /// Web app URL; listings are read with `GET` and adjustments sent with
    /// `POST` to the same address.
    pub url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// Inventory service reached over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpInventoryRemote {
    config: HttpRemoteConfig,
    http: Client,
}

impl HttpInventoryRemote {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpRemoteConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;

        Ok(Self { config, http })
    }

    /// The service URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn post<T: serde::Serialize + ?Sized>(&self, body: &T) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .http
            .post(&self.config.url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        body_bytes(response).await
    }
}

#[async_trait]
impl InventoryRemote for HttpInventoryRemote {
    async fn fetch_products(&self) -> Result<Vec<Product>, RemoteError> {
        let response = self
            .http
            .get(&self.config.url)
            .send()
            .await
            .map_err(transport)?;

        let products = decode_listing(&body_bytes(response).await?)?;

        debug!(products = products.len(), "fetched inventory listing");

        Ok(products)
    }

    async fn reserve(&self, adjustment: StockAdjustment) -> Result<Reservation, RemoteError> {
        let body = self.post(&adjustment).await?;

        decode_reservation(&body)
    }

    async fn commit(&self, adjustments: Vec<StockAdjustment>) -> Result<(), RemoteError> {
        let body = self.post(&adjustments).await?;

        decode_commit_ack(&body)
    }
}

fn transport(error: reqwest::Error) -> RemoteError {
    RemoteError::Transport(Box::new(error))
}

async fn body_bytes(response: Response) -> Result<Vec<u8>, RemoteError> {
    let status = response.status();

    if !status.is_success() {
        return Err(RemoteError::UnexpectedStatus(status.as_u16()));
    }

    Ok(response.bytes().await.map_err(transport)?.to_vec())
}
