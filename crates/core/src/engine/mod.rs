//! Reconciliation Engine
//!
//! Owns the inventory snapshot and the cart ledger for one session and
//! applies every add, remove and checkout to both together. Operations take
//! `&self` so a caller may interleave them around an outstanding request;
//! state locks are never held across an await, and overlapping requests are
//! refused through [`InFlight`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::{
    inventory::{InventorySnapshot, LoadError},
    ledger::{CartEntry, CartLedger, EntryId},
    products::{Product, ProductId},
    receipt::Receipt,
    remote::{InventoryRemote, StockAdjustment},
};

pub mod errors;
pub mod in_flight;
pub mod policy;

pub use errors::{AddError, CheckoutError, RemoveError, ValidationError};
pub use in_flight::{InFlight, OperationKey, OperationState};
pub use policy::ReconciliationPolicy;

#[derive(Debug, Default)]
struct Session {
    snapshot: InventorySnapshot,
    ledger: CartLedger,
}

/// Outcome of a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    /// What was bought
    pub receipt: Receipt,

    /// Whether the snapshot was reloaded from the service afterwards
    pub snapshot_refreshed: bool,
}

/// Cart and inventory reconciliation for one browsing session.
#[derive(Debug)]
pub struct ReconciliationEngine<R> {
    remote: R,
    policy: ReconciliationPolicy,
    session: Mutex<Session>,
    in_flight: InFlight,
}

impl<R: InventoryRemote> ReconciliationEngine<R> {
    /// Create an engine with an empty snapshot.
    pub fn new(remote: R, policy: ReconciliationPolicy) -> Self {
        Self::with_snapshot(remote, policy, InventorySnapshot::new())
    }

    /// Create an engine around an already populated snapshot.
    pub fn with_snapshot(
        remote: R,
        policy: ReconciliationPolicy,
        snapshot: InventorySnapshot,
    ) -> Self {
        Self {
            remote,
            policy,
            session: Mutex::new(Session {
                snapshot,
                ledger: CartLedger::new(),
            }),
            in_flight: InFlight::new(),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The policy this engine was built with.
    pub fn policy(&self) -> ReconciliationPolicy {
        self.policy
    }

    /// Load the snapshot from the inventory service, returning the number of
    /// products.
    ///
    /// Under [`ReconciliationPolicy::OptimisticLocal`] units held by the cart
    /// are not committed yet, so they are taken from the fresh listing again.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InFlight`] while a checkout or another load is
    /// running, leaving the snapshot untouched. Any other [`LoadError`]
    /// leaves the snapshot empty.
    pub async fn load(&self) -> Result<usize, LoadError> {
        let Some(_pending) = self.in_flight.try_begin(OperationKey::Refresh) else {
            return Err(LoadError::InFlight);
        };

        self.reload().await
    }

    async fn reload(&self) -> Result<usize, LoadError> {
        let fetched = self.remote.fetch_products().await;

        let mut session = self.session();
        let Session { snapshot, ledger } = &mut *session;

        let loaded = snapshot.apply_fetch(fetched)?;

        if self.policy.commits_on_checkout() {
            for held in ledger.quantities() {
                let shortfall = snapshot.withhold(held.id.as_str(), held.quantity);

                if shortfall > 0 {
                    warn!(
                        product_id = %held.id,
                        held = held.quantity,
                        shortfall,
                        "listing has less stock than the cart holds"
                    );
                }
            }
        }

        Ok(loaded)
    }

    /// Products in listing order.
    pub fn products(&self) -> Vec<Product> {
        self.session().snapshot.products().to_vec()
    }

    /// Look up a product by id.
    pub fn product(&self, id: &str) -> Option<Product> {
        self.session().snapshot.find_by_id(id).cloned()
    }

    /// Cart entries in the order they were added.
    pub fn cart_entries(&self) -> Vec<CartEntry> {
        self.session().ledger.entries().to_vec()
    }

    /// Loyalty points for the current cart.
    pub fn points_total(&self) -> f64 {
        self.session().ledger.points_total()
    }

    /// Sum of the current cart's prices.
    pub fn cart_total(&self) -> u64 {
        self.session().ledger.total()
    }

    /// Whether a reservation for `id` is waiting on the service.
    pub fn operation_state(&self, id: &str) -> OperationState {
        self.in_flight
            .state(&OperationKey::Product(ProductId::from(id)))
    }

    /// Whether a checkout is in progress.
    pub fn checkout_state(&self) -> OperationState {
        self.in_flight.state(&OperationKey::Checkout)
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an [`AddError`] when the unit cannot be added. The snapshot
    /// and the cart are unchanged in that case.
    pub async fn add_to_cart(&self, product_id: &str) -> Result<CartEntry, AddError> {
        if self.checkout_state() == OperationState::Pending {
            return Err(AddError::CheckoutInFlight);
        }

        let added = match self.policy {
            ReconciliationPolicy::OptimisticLocal => self.reserve_locally(product_id),
            ReconciliationPolicy::ServerAuthoritative => self.reserve_remotely(product_id).await,
        };

        match &added {
            Ok(entry) => debug!(product_id, entry = %entry.id(), "added to cart"),
            Err(refusal) => debug!(product_id, reason = %refusal, "add refused"),
        }

        added
    }

    fn reserve_locally(&self, product_id: &str) -> Result<CartEntry, AddError> {
        let mut session = self.session();
        let Session { snapshot, ledger } = &mut *session;

        let entry = ledger.push(available(snapshot, product_id)?);

        snapshot.decrement_stock(product_id);

        Ok(entry)
    }

    async fn reserve_remotely(&self, product_id: &str) -> Result<CartEntry, AddError> {
        let product = available(&self.session().snapshot, product_id)?.clone();
        let id = product.id.clone();

        let Some(_pending) = self.in_flight.try_begin(OperationKey::Product(id.clone())) else {
            return Err(AddError::InFlight(id));
        };

        let reservation = self
            .remote
            .reserve(StockAdjustment::single(id.clone()))
            .await
            .map_err(|error| {
                warn!(product_id, %error, "reservation request failed");
                AddError::Remote(error)
            })?;

        if !reservation.success {
            return Err(AddError::Declined(id));
        }

        let mut session = self.session();
        let Session { snapshot, ledger } = &mut *session;

        if snapshot.find_by_id(product_id).is_none() {
            warn!(product_id, "reserved product is no longer listed");
        } else if let Some(stock) = reservation.new_stock {
            snapshot.set_stock(product_id, stock);
        } else {
            snapshot.decrement_stock(product_id);
        }

        Ok(ledger.push(&product))
    }

    /// Remove an entry from the cart.
    ///
    /// Under [`ReconciliationPolicy::OptimisticLocal`] the unit goes back to
    /// local stock; under [`ReconciliationPolicy::ServerAuthoritative`] the
    /// service already committed it and stock is left alone.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoveError`] when the entry is not in the cart or a
    /// checkout is in progress. Nothing changes in that case.
    pub fn remove_from_cart(&self, entry_id: EntryId) -> Result<CartEntry, RemoveError> {
        if self.checkout_state() == OperationState::Pending {
            return Err(RemoveError::CheckoutInFlight);
        }

        let mut session = self.session();
        let Session { snapshot, ledger } = &mut *session;

        let entry = ledger
            .remove(entry_id)
            .ok_or(RemoveError::NotInCart(entry_id))?;

        if self.policy.restocks_on_remove() {
            snapshot.increment_stock(entry.product_id().as_str());
        }

        debug!(product_id = %entry.product_id(), entry = %entry.id(), "removed from cart");

        Ok(entry)
    }

    /// Check the cart out for `buyer_name`.
    ///
    /// Under [`ReconciliationPolicy::OptimisticLocal`] the cart is sent as one
    /// batch of stock adjustments and the snapshot is reloaded afterwards.
    /// Under [`ReconciliationPolicy::ServerAuthoritative`] every unit is
    /// already committed, so nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] when validation fails, another checkout is
    /// running or the service rejects the commit. The cart is left intact.
    pub async fn checkout(&self, buyer_name: &str) -> Result<CheckoutSummary, CheckoutError> {
        let buyer = buyer_name.trim();

        if buyer.is_empty() {
            return Err(ValidationError::MissingBuyerName.into());
        }

        let Some(_pending) = self.in_flight.try_begin(OperationKey::Checkout) else {
            return Err(CheckoutError::InFlight);
        };

        let Some(_refreshing) = self.in_flight.try_begin(OperationKey::Refresh) else {
            return Err(CheckoutError::InFlight);
        };

        let (entries, adjustments) = {
            let session = self.session();
            (session.ledger.entries().to_vec(), session.ledger.quantities())
        };

        if entries.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        if self.policy.commits_on_checkout() {
            self.remote.commit(adjustments).await.map_err(|error| {
                warn!(%error, entries = entries.len(), "checkout commit failed");
                CheckoutError::RemoteCommit(error)
            })?;
        }

        let committed: Vec<EntryId> = entries.iter().map(CartEntry::id).collect();

        self.session().ledger.remove_all(&committed);

        info!(buyer, entries = entries.len(), "checkout committed");

        let snapshot_refreshed = self.policy.commits_on_checkout() && self.reload().await.is_ok();

        Ok(CheckoutSummary {
            receipt: Receipt::new(buyer, &entries),
            snapshot_refreshed,
        })
    }
}

fn available<'a>(
    snapshot: &'a InventorySnapshot,
    product_id: &str,
) -> Result<&'a Product, AddError> {
    match snapshot.find_by_id(product_id) {
        None => Err(AddError::UnknownProduct(ProductId::from(product_id))),
        Some(product) if product.is_out_of_stock() => Err(AddError::OutOfStock(product.id.clone())),
        Some(product) => Ok(product),
    }
}
