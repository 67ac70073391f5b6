//! Inventory Snapshot

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    products::{Product, ProductId},
    remote::{InventoryRemote, RemoteError},
};

/// Errors raised while loading the snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The inventory service could not be reached or refused the request.
    #[error("inventory service unavailable")]
    Unavailable(#[source] RemoteError),

    /// The listing arrived but could not be normalized.
    #[error("inventory listing could not be parsed")]
    Malformed(#[source] RemoteError),

    /// Another reload or a checkout is already updating the snapshot.
    #[error("a catalog refresh or checkout is already in progress")]
    InFlight,
}

impl From<RemoteError> for LoadError {
    fn from(error: RemoteError) -> Self {
        if error.is_payload_error() {
            Self::Malformed(error)
        } else {
            Self::Unavailable(error)
        }
    }
}

/// Locally held copy of the remote inventory.
#[derive(Debug, Default, Clone)]
pub struct InventorySnapshot {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
}

impl InventorySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot holding the given products.
    pub fn with_products(products: impl Into<Vec<Product>>) -> Self {
        let mut snapshot = Self::new();

        snapshot.replace(products.into());

        snapshot
    }

    /// Fetch the listing from the inventory service and replace the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the fetch fails. The snapshot is left
    /// empty in that case, never partially populated.
    pub async fn load(&mut self, remote: &dyn InventoryRemote) -> Result<&[Product], LoadError> {
        let fetched = remote.fetch_products().await;

        self.apply_fetch(fetched)?;

        Ok(&self.products)
    }

    /// Apply the result of a listing fetch, returning the number of products
    /// now held.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when `fetched` is an error, after clearing the
    /// snapshot.
    pub fn apply_fetch(
        &mut self,
        fetched: Result<Vec<Product>, RemoteError>,
    ) -> Result<usize, LoadError> {
        match fetched {
            Ok(products) => {
                self.replace(products);

                info!(products = self.len(), "inventory snapshot loaded");

                Ok(self.len())
            }
            Err(fetch_error) => {
                self.clear();

                let load_error = LoadError::from(fetch_error);

                error!(error = %load_error, "failed to load inventory snapshot");

                Err(load_error)
            }
        }
    }

    /// Replace every product in the snapshot.
    ///
    /// Later duplicates of an id are dropped so ids stay unique.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.clear();

        for product in products {
            if self.index.contains_key(&product.id) {
                warn!(product_id = %product.id, "duplicate product id in listing, ignoring");
                continue;
            }

            self.index.insert(product.id.clone(), self.products.len());
            self.products.push(product);
        }
    }

    /// Remove every product.
    pub fn clear(&mut self) {
        self.products.clear();
        self.index.clear();
    }

    /// Look up a product by id.
    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get(position))
    }

    fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get_mut(position))
    }

    /// Take one unit from stock.
    ///
    /// Returns `false` when the product is unknown or already out of stock.
    pub fn decrement_stock(&mut self, id: &str) -> bool {
        let Some(product) = self.find_by_id_mut(id) else {
            return false;
        };

        match product.stock.checked_sub(1) {
            Some(stock) => {
                product.stock = stock;
                true
            }
            None => false,
        }
    }

    /// Return one unit to stock.
    pub fn increment_stock(&mut self, id: &str) {
        match self.find_by_id_mut(id) {
            Some(product) => product.stock = product.stock.saturating_add(1),
            None => warn!(product_id = id, "cannot restock unknown product"),
        }
    }

    /// Overwrite the stock of a product with an authoritative value.
    ///
    /// Returns `false` when the product is unknown.
    pub fn set_stock(&mut self, id: &str, stock: u64) -> bool {
        let Some(product) = self.find_by_id_mut(id) else {
            return false;
        };

        product.stock = stock;

        true
    }

    /// Take `units` from stock for reservations held outside the listing.
    ///
    /// Stock never goes below zero. Returns the units that could not be
    /// covered, which is all of them when the product is unknown.
    pub fn withhold(&mut self, id: &str, units: u64) -> u64 {
        let Some(product) = self.find_by_id_mut(id) else {
            return units;
        };

        let covered = units.min(product.stock);

        product.stock -= covered;

        units - covered
    }

    /// Products in listing order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the snapshot holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::remote::MockInventoryRemote;

    use super::*;

    fn product(id: &str, stock: u64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            image: String::new(),
            price: 1000,
            stock,
        }
    }

    #[test]
    fn find_by_id() {
        let snapshot = InventorySnapshot::with_products([product("1", 2), product("2", 0)]);

        assert_eq!(snapshot.find_by_id("2").map(|p| p.stock), Some(0));
        assert!(snapshot.find_by_id("3").is_none());
    }

    #[test]
    fn withhold_reports_shortfall() {
        let mut snapshot = InventorySnapshot::with_products([product("1", 3), product("2", 1)]);

        assert_eq!(snapshot.withhold("1", 2), 0);
        assert_eq!(snapshot.withhold("2", 3), 2);
        assert_eq!(snapshot.withhold("9", 1), 1);

        assert_eq!(snapshot.find_by_id("1").map(|p| p.stock), Some(1));
        assert_eq!(snapshot.find_by_id("2").map(|p| p.stock), Some(0));
    }

    #[test]
    fn decrement_stops_at_zero() {
        let mut snapshot = InventorySnapshot::with_products([product("1", 1)]);

        assert!(snapshot.decrement_stock("1"));
        assert!(!snapshot.decrement_stock("1"));
        assert!(!snapshot.decrement_stock("missing"));
        assert_eq!(snapshot.find_by_id("1").map(|p| p.stock), Some(0));
    }

    #[test]
    fn increment_and_set_stock() {
        let mut snapshot = InventorySnapshot::with_products([product("1", 0)]);

        snapshot.increment_stock("1");
        snapshot.increment_stock("missing");

        assert_eq!(snapshot.find_by_id("1").map(|p| p.stock), Some(1));
        assert!(snapshot.set_stock("1", 9));
        assert!(!snapshot.set_stock("missing", 9));
        assert_eq!(snapshot.find_by_id("1").map(|p| p.stock), Some(9));
    }

    #[test]
    fn replace_drops_duplicate_ids() {
        let snapshot =
            InventorySnapshot::with_products([product("1", 1), product("1", 5), product("2", 3)]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.find_by_id("1").map(|p| p.stock), Some(1));
    }

    #[tokio::test]
    async fn load_replaces_snapshot_wholesale() -> TestResult {
        let mut remote = MockInventoryRemote::new();

        remote
            .expect_fetch_products()
            .once()
            .return_once(|| Ok(vec![product("9", 4)]));

        let mut snapshot = InventorySnapshot::with_products([product("1", 1)]);
        let loaded = snapshot.load(&remote).await?;

        assert_eq!(loaded.len(), 1);
        assert!(snapshot.find_by_id("1").is_none());
        assert!(snapshot.find_by_id("9").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn failed_load_leaves_snapshot_empty() {
        let mut remote = MockInventoryRemote::new();

        remote
            .expect_fetch_products()
            .once()
            .return_once(|| Err(RemoteError::Transport("connection refused".into())));

        let mut snapshot = InventorySnapshot::with_products([product("1", 1)]);
        let result = snapshot.load(&remote).await;

        assert!(
            matches!(result, Err(LoadError::Unavailable(_))),
            "expected Unavailable, got {result:?}"
        );
        assert!(snapshot.is_empty());
    }

    #[test]
    fn payload_errors_map_to_malformed() {
        let mut snapshot = InventorySnapshot::new();

        let result = snapshot.apply_fetch(Err(RemoteError::InvalidProduct("bad".to_string())));

        assert!(matches!(result, Err(LoadError::Malformed(_))));
    }
}
