//! Catalog and cart tables.

use rusty_money::iso::Currency;
use storefront::{
    ledger::CartEntry,
    products::{Product, display_points},
    receipt::{ReceiptError, money},
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

/// Products whose name contains `term`, ignoring case and surrounding
/// whitespace. A blank term matches nothing.
pub fn search<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();

    if term.is_empty() {
        return Vec::new();
    }

    products
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&term))
        .collect()
}

/// Render products as a table.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a price cannot be formatted.
pub fn catalog_table<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    currency: &'static Currency,
) -> Result<String, ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Product", "Price", "Stock"]);

    for product in products {
        let stock = if product.is_out_of_stock() {
            "out of stock".to_string()
        } else {
            product.stock.to_string()
        };

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            money(product.price, currency)?.to_string(),
            stock,
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..4), Alignment::right());

    Ok(table.to_string())
}

/// Render cart entries with their 1-based positions, followed by the
/// total and points lines.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a price cannot be formatted.
pub fn cart_table(
    entries: &[CartEntry],
    total: u64,
    points: f64,
    currency: &'static Currency,
) -> Result<String, ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["#", "Product", "Price", "Points"]);

    for (position, entry) in (1_usize..).zip(entries) {
        builder.push_record([
            position.to_string(),
            entry.name().to_string(),
            money(entry.price(), currency)?.to_string(),
            display_points(entry.points()),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..4), Alignment::right());

    Ok(format!(
        "{table}\nTotal: {}\nPoints: {}",
        money(total, currency)?,
        display_points(points)
    ))
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::CLP};
    use storefront::{ledger::CartLedger, products::ProductId};
    use testresult::TestResult;

    use super::*;

    fn product(id: &str, name: &str, price: u64, stock: u64) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            image: String::new(),
            price,
            stock,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Red Shoes", 25_000, 3),
            product("2", "Blue Shirt", 12_000, 0),
            product("3", "red hat", 8_000, 1),
        ]
    }

    #[test]
    fn search_ignores_case_and_padding() {
        let products = catalog();

        let names: Vec<_> = search(&products, "  RED ")
            .into_iter()
            .map(|product| product.name.as_str())
            .collect();

        assert_eq!(names, ["Red Shoes", "red hat"]);
    }

    #[test]
    fn blank_search_matches_nothing() {
        let products = catalog();

        assert!(search(&products, "   ").is_empty());
        assert!(search(&products, "green").is_empty());
    }

    #[test]
    fn catalog_marks_out_of_stock_products() -> TestResult {
        let table = catalog_table(&catalog(), CLP)?;

        let shirt = table
            .lines()
            .find(|line| line.contains("Blue Shirt"))
            .ok_or("missing row")?;

        assert!(shirt.contains("out of stock"));
        assert!(table.contains(&Money::from_major(25_000, CLP).to_string()));

        Ok(())
    }

    #[test]
    fn cart_lists_positions_total_and_points() -> TestResult {
        let mut ledger = CartLedger::new();

        ledger.push(&product("1", "Red Shoes", 25_000, 3));
        ledger.push(&product("3", "red hat", 8_000, 1));

        let table = cart_table(ledger.entries(), ledger.total(), ledger.points_total(), CLP)?;

        assert!(table.contains("Red Shoes"));
        assert!(table.contains("red hat"));
        assert!(table.contains(&format!("Total: {}", Money::from_major(33_000, CLP))));
        assert!(table.ends_with("Points: 33"));

        Ok(())
    }

    #[test]
    fn cart_points_round_halves_up() -> TestResult {
        let mut ledger = CartLedger::new();

        ledger.push(&product("4", "Scarf", 2_500, 1));

        let table = cart_table(ledger.entries(), ledger.total(), ledger.points_total(), CLP)?;

        let scarf = table
            .lines()
            .find(|line| line.contains("Scarf"))
            .ok_or("missing row")?;

        assert!(scarf.contains(" 3 "), "row was {scarf}");
        assert!(table.ends_with("Points: 3"));

        Ok(())
    }
}
