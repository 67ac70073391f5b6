//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    engine::{
        AddError, CheckoutError, CheckoutSummary, OperationState, ReconciliationEngine,
        ReconciliationPolicy, RemoveError, ValidationError,
    },
    inventory::{InventorySnapshot, LoadError},
    ledger::{CartEntry, CartLedger, EntryId},
    products::{Product, ProductId, display_points, loyalty_points},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    remote::{InventoryRemote, RemoteError, Reservation, StockAdjustment},
};
