//! Products

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result as FmtResult},
};

use serde::{Deserialize, Serialize};

/// Product identifier.
///
/// The inventory service may hand out numeric or string ids; both are
/// normalized to their string form when a listing is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product id, unique within a snapshot
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Image reference (usually a URL)
    pub image: String,

    /// Price in whole currency units
    pub price: u64,

    /// Units available
    pub stock: u64,
}

impl Product {
    /// Whether no units are left.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Loyalty points earned by buying one unit.
    pub fn points(&self) -> f64 {
        loyalty_points(self.price)
    }
}

/// Loyalty points earned for a single unit at the given price.
///
/// One point per thousand currency units, accumulated as floating point and
/// only rounded for display.
#[expect(
    clippy::cast_precision_loss,
    reason = "prices are far below the 2^53 precision limit"
)]
pub fn loyalty_points(price: u64) -> f64 {
    price as f64 / 1000.0
}

/// Points rounded to a whole number for display, halves rounding up.
pub fn display_points(points: f64) -> String {
    format!("{:.0}", points.round())
}
