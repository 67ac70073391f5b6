//! Reconciliation engine errors.

use thiserror::Error;

use crate::{ledger::EntryId, products::ProductId, remote::RemoteError};

/// Why a unit could not be added to the cart.
///
/// None of these leave a trace in the snapshot or the ledger.
#[derive(Debug, Error)]
pub enum AddError {
    /// The product is not in the snapshot.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    /// The product has no stock left.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// A reservation for the same product is still waiting on the service.
    #[error("a reservation for product {0} is already in progress")]
    InFlight(ProductId),

    /// A checkout is in progress.
    #[error("checkout in progress")]
    CheckoutInFlight,

    /// The service refused the reservation.
    #[error("reservation for product {0} was declined")]
    Declined(ProductId),

    /// The reservation request failed.
    #[error("reservation failed")]
    Remote(#[source] RemoteError),
}

/// Why an entry could not be removed from the cart.
#[derive(Debug, Error)]
pub enum RemoveError {
    /// No entry with this id is in the cart.
    #[error("entry {0} is not in the cart")]
    NotInCart(EntryId),

    /// A checkout is in progress.
    #[error("checkout in progress")]
    CheckoutInFlight,
}

/// Checkout input that fails validation before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The buyer name is missing or blank.
    #[error("a buyer name is required")]
    MissingBuyerName,

    /// The cart has no entries.
    #[error("the cart is empty")]
    EmptyCart,
}

/// Why a checkout did not complete.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Input was rejected; no request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another checkout or a catalog refresh is still in progress.
    #[error("checkout or catalog refresh already in progress")]
    InFlight,

    /// The service did not accept the stock adjustments. The cart is intact.
    #[error("failed to commit the cart")]
    RemoteCommit(#[source] RemoteError),
}
