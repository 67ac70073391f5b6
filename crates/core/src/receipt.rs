//! Receipt

use std::{io, num::TryFromIntError};

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{ledger::CartEntry, products::display_points};

/// Errors that can occur while rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An amount does not fit the money type.
    #[error("amount out of range")]
    Amount(#[from] TryFromIntError),

    /// Writing the receipt failed.
    #[error("failed to write receipt")]
    Io(#[from] io::Error),
}

/// One purchased unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    /// Product name
    pub name: String,

    /// Price paid
    pub price: u64,
}

/// Record of a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    buyer: String,
    lines: SmallVec<[ReceiptLine; 8]>,
    total: u64,
    points: f64,
}

impl Receipt {
    /// Build a receipt for the committed entries.
    pub fn new(buyer: impl Into<String>, entries: &[CartEntry]) -> Self {
        let lines = entries
            .iter()
            .map(|entry| ReceiptLine {
                name: entry.name().to_string(),
                price: entry.price(),
            })
            .collect();

        Self {
            buyer: buyer.into(),
            lines,
            total: entries
                .iter()
                .map(CartEntry::price)
                .fold(0, u64::saturating_add),
            points: entries.iter().map(CartEntry::points).sum(),
        }
    }

    /// Buyer name
    pub fn buyer(&self) -> &str {
        &self.buyer
    }

    /// Purchased units in cart order
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Sum of prices
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Loyalty points earned, unrounded
    pub fn points(&self) -> f64 {
        self.points
    }

    /// Loyalty points rounded for display.
    pub fn points_display(&self) -> String {
        display_points(self.points)
    }

    /// Suggested file name, safe to use on any filesystem.
    pub fn file_name(&self) -> String {
        let buyer: String = self
            .buyer
            .trim()
            .chars()
            .filter_map(|c| match c {
                c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
                c if c.is_whitespace() => Some('_'),
                _ => None,
            })
            .collect();

        if buyer.is_empty() {
            "purchase.txt".to_string()
        } else {
            format!("purchase_{buyer}.txt")
        }
    }

    /// Write the receipt as plain text.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if an amount cannot be formatted or the
    /// writer fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), ReceiptError> {
        writeln!(out, "Name: {}", self.buyer)?;
        writeln!(out, "Products:")?;

        for line in &self.lines {
            writeln!(out, "- {}, {}", line.name, money(line.price, currency)?)?;
        }

        writeln!(out, "Total: {}", money(self.total, currency)?)?;
        writeln!(out, "Points: {}", self.points_display())?;

        Ok(())
    }

    /// Render the receipt to a string.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if an amount cannot be formatted.
    pub fn render(&self, currency: &'static Currency) -> Result<String, ReceiptError> {
        let mut out = Vec::new();

        self.write_to(&mut out, currency)?;

        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Format a whole-unit amount in the given currency.
///
/// # Errors
///
/// Returns [`ReceiptError::Amount`] when the amount exceeds `i64::MAX`.
pub fn money(
    amount: u64,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, ReceiptError> {
    Ok(Money::from_major(i64::try_from(amount)?, currency))
}
