//! Remote inventory service.
//!
//! The inventory service is the source of record for stock. The engine only
//! talks to it through [`InventoryRemote`], so transports (HTTP, mocks) are
//! interchangeable.

use std::error::Error as StdError;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::products::Product;

pub mod wire;

pub use wire::{Reservation, StockAdjustment};

/// Errors raised while talking to the inventory service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The service answered with a non-success status code.
    #[error("unexpected response status {0}")]
    UnexpectedStatus(u16),

    /// The response body was not the JSON we expected.
    #[error("malformed response")]
    Decode(#[from] serde_json::Error),

    /// A product record could not be normalized.
    #[error("invalid product record: {0}")]
    InvalidProduct(String),

    /// The service processed the request but refused it.
    #[error("request declined by the inventory service")]
    Declined,
}

impl RemoteError {
    /// Whether the failure came from the response payload rather than the
    /// network.
    pub fn is_payload_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::InvalidProduct(_))
    }
}

/// Inventory service operations used by the reconciliation engine.
#[automock]
#[async_trait]
pub trait InventoryRemote: Send + Sync {
    /// Fetch the full product listing.
    async fn fetch_products(&self) -> Result<Vec<Product>, RemoteError>;

    /// Reserve units of a single product, returning the service's verdict.
    async fn reserve(&self, adjustment: StockAdjustment) -> Result<Reservation, RemoteError>;

    /// Commit a batch of stock adjustments in one request.
    async fn commit(&self, adjustments: Vec<StockAdjustment>) -> Result<(), RemoteError>;
}
