//! Cart Ledger

use std::fmt::{Display, Formatter, Result as FmtResult};

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::{
    products::{Product, ProductId, loyalty_points},
    remote::StockAdjustment,
};

/// Cart entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh, time-ordered entry id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// One unit of a product held in the cart.
///
/// Name and price are copied when the unit is added; stock stays on the
/// snapshot's product and is only reached through `product_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry {
    id: EntryId,
    product_id: ProductId,
    name: String,
    price: u64,
}

impl CartEntry {
    /// Create an entry for one unit of `product`.
    pub fn for_product(product: &Product) -> Self {
        Self {
            id: EntryId::new(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        }
    }

    /// Entry id
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Id of the product this unit belongs to
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Product name at the time the unit was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product price at the time the unit was added
    pub fn price(&self) -> u64 {
        self.price
    }

    /// Loyalty points earned by this unit
    pub fn points(&self) -> f64 {
        loyalty_points(self.price)
    }
}

/// Ordered record of the cart's contents.
#[derive(Debug, Default, Clone)]
pub struct CartLedger {
    entries: Vec<CartEntry>,
}

impl CartLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one unit of `product`, returning the new entry.
    pub fn push(&mut self, product: &Product) -> CartEntry {
        let entry = CartEntry::for_product(product);

        self.entries.push(entry.clone());

        entry
    }

    /// Remove an entry, returning it if it was present.
    pub fn remove(&mut self, id: EntryId) -> Option<CartEntry> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;

        Some(self.entries.remove(position))
    }

    /// Remove every entry whose id is in `ids`.
    pub fn remove_all(&mut self, ids: &[EntryId]) {
        self.entries.retain(|entry| !ids.contains(&entry.id));
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up an entry by id.
    pub fn get(&self, id: EntryId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries in the order they were added.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of units in the cart.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of units held for a product.
    pub fn count_for(&self, product_id: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.product_id.as_str() == product_id)
            .count()
    }

    /// Loyalty points for the whole cart, recomputed from the entries.
    pub fn points_total(&self) -> f64 {
        self.entries.iter().map(CartEntry::points).sum()
    }

    /// Sum of entry prices.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .map(CartEntry::price)
            .fold(0, u64::saturating_add)
    }

    /// Per-product quantities, ordered by each product's first appearance.
    pub fn quantities(&self) -> Vec<StockAdjustment> {
        let mut positions: FxHashMap<&ProductId, usize> = FxHashMap::default();
        let mut adjustments: Vec<StockAdjustment> = Vec::new();

        for entry in &self.entries {
            if let Some(adjustment) = positions
                .get(&entry.product_id)
                .and_then(|&position| adjustments.get_mut(position))
            {
                adjustment.quantity += 1;
                continue;
            }

            positions.insert(&entry.product_id, adjustments.len());
            adjustments.push(StockAdjustment::single(entry.product_id.clone()));
        }

        adjustments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: u64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            image: String::new(),
            price,
            stock: 10,
        }
    }

    #[test]
    fn push_keeps_addition_order() {
        let mut ledger = CartLedger::new();

        let first = ledger.push(&product("1", 5000));
        let second = ledger.push(&product("2", 1500));

        let ids: Vec<EntryId> = ledger.entries().iter().map(CartEntry::id).collect();

        assert_eq!(ids, vec![first.id(), second.id()]);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn entries_copy_name_and_price() {
        let mut ledger = CartLedger::new();
        let mut widget = product("1", 5000);

        let entry = ledger.push(&widget);

        widget.price = 9000;
        widget.name = "Renamed".to_string();

        assert_eq!(entry.price(), 5000);
        assert_eq!(entry.name(), "Product 1");
        assert_eq!(entry.product_id().as_str(), "1");
    }

    #[test]
    fn points_and_total_follow_entries() {
        let mut ledger = CartLedger::new();

        let first = ledger.push(&product("1", 5000));
        ledger.push(&product("2", 1500));

        assert!((ledger.points_total() - 6.5).abs() < 1e-9);
        assert_eq!(ledger.total(), 6500);

        ledger.remove(first.id());

        assert!((ledger.points_total() - 1.5).abs() < 1e-9);
        assert_eq!(ledger.total(), 1500);
    }

    #[test]
    fn remove_unknown_entry_is_noop() {
        let mut ledger = CartLedger::new();
        ledger.push(&product("1", 5000));

        assert!(ledger.remove(EntryId::new()).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn quantities_group_by_product_in_first_seen_order() {
        let mut ledger = CartLedger::new();

        ledger.push(&product("2", 100));
        ledger.push(&product("1", 100));
        ledger.push(&product("2", 100));
        ledger.push(&product("2", 100));

        let quantities = ledger.quantities();

        assert_eq!(
            quantities,
            vec![
                StockAdjustment {
                    id: ProductId::from("2"),
                    quantity: 3,
                },
                StockAdjustment {
                    id: ProductId::from("1"),
                    quantity: 1,
                },
            ]
        );
        assert_eq!(ledger.count_for("2"), 3);
    }

    #[test]
    fn remove_all_only_drops_listed_entries() {
        let mut ledger = CartLedger::new();

        let first = ledger.push(&product("1", 100));
        let second = ledger.push(&product("1", 100));
        let third = ledger.push(&product("2", 100));

        ledger.remove_all(&[first.id(), third.id()]);

        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(second.id()).is_some());
    }
}
