//! Inventory service wire format.
//!
//! Listings come from a spreadsheet-backed service, so ids, prices and stock
//! counts may arrive as numbers or as numeric strings. Everything is
//! normalized here before it reaches the snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::warn;

use crate::{
    products::{Product, ProductId},
    remote::RemoteError,
};

/// A stock adjustment for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment {
    /// Product being adjusted
    pub id: ProductId,

    /// Units to take from stock
    #[serde(rename = "cantidad")]
    pub quantity: u64,
}

impl StockAdjustment {
    /// A single-unit adjustment.
    pub fn single(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            quantity: 1,
        }
    }
}

/// Reply to a single-product reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// Whether the service committed the decrement
    pub success: bool,

    /// Authoritative stock after the decrement, when reported
    pub new_stock: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(Number),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Number(number) => {
                integral(&number).map_or_else(|| number.to_string(), |value| value.to_string())
            }
            Self::Text(text) => text.trim().to_string(),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(number) => integral(number),
            Self::Text(text) => {
                let text = text.trim();

                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(integral_float))
            }
        }
    }
}

fn integral(number: &Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_f64().and_then(integral_float))
}

#[expect(
    clippy::float_cmp,
    reason = "exact integrality check, not an approximate comparison"
)]
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is integral and bounded before the cast"
)]
fn integral_float(value: f64) -> Option<i64> {
    let bounded = value.is_finite() && value.abs() < 9.0e15;

    (bounded && value.trunc() == value).then_some(value as i64)
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: Scalar,
    nombre: Scalar,
    #[serde(default)]
    imagen: Option<String>,
    precio: Scalar,
    stock: Scalar,
}

impl TryFrom<ProductRecord> for Product {
    type Error = RemoteError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let id = record.id.into_text();

        if id.is_empty() {
            return Err(RemoteError::InvalidProduct("empty product id".to_string()));
        }

        let price = record
            .precio
            .as_integer()
            .and_then(|price| u64::try_from(price).ok())
            .ok_or_else(|| RemoteError::InvalidProduct(format!("product {id} has invalid price")))?;

        let stock = record
            .stock
            .as_integer()
            .ok_or_else(|| RemoteError::InvalidProduct(format!("product {id} has invalid stock")))?;

        let stock = u64::try_from(stock).unwrap_or_else(|_| {
            warn!(product_id = %id, stock, "negative stock reported, clamping to zero");
            0
        });

        Ok(Product {
            id: ProductId::from(id),
            name: record.nombre.into_text(),
            image: record.imagen.unwrap_or_default(),
            price,
            stock,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Bare(Vec<ProductRecord>),
    Wrapped(WrappedListing),
}

#[derive(Debug, Deserialize)]
struct WrappedListing {
    #[serde(alias = "products", alias = "data", alias = "items")]
    productos: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct ReservationReply {
    success: bool,
    #[serde(default, rename = "nuevoStock")]
    nuevo_stock: Option<Scalar>,
}

/// Decode a product listing: either a bare array or an object wrapping one.
///
/// # Errors
///
/// - [`RemoteError::Decode`]: the body is not a recognised listing.
/// - [`RemoteError::InvalidProduct`]: a record has an unusable id, price or stock.
pub fn decode_listing(body: &[u8]) -> Result<Vec<Product>, RemoteError> {
    let records = match serde_json::from_slice::<Listing>(body)? {
        Listing::Bare(records) => records,
        Listing::Wrapped(wrapped) => wrapped.productos,
    };

    records.into_iter().map(Product::try_from).collect()
}

/// Decode the reply to a single-product reservation.
///
/// # Errors
///
/// Returns [`RemoteError::Decode`] when the body lacks a boolean `success`.
pub fn decode_reservation(body: &[u8]) -> Result<Reservation, RemoteError> {
    let reply: ReservationReply = serde_json::from_slice(body)?;

    let new_stock = reply
        .nuevo_stock
        .as_ref()
        .and_then(Scalar::as_integer)
        .map(|stock| u64::try_from(stock).unwrap_or(0));

    Ok(Reservation {
        success: reply.success,
        new_stock,
    })
}

/// Decode the reply to a batch commit.
///
/// Any body is accepted except a JSON object whose `success` flag is false.
///
/// # Errors
///
/// Returns [`RemoteError::Declined`] when the service reports `success: false`.
pub fn decode_commit_ack(body: &[u8]) -> Result<(), RemoteError> {
    let Ok(Value::Object(reply)) = serde_json::from_slice::<Value>(body) else {
        return Ok(());
    };

    match reply.get("success") {
        Some(Value::Bool(false)) => Err(RemoteError::Declined),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn listing_accepts_bare_array_with_mixed_scalars() -> TestResult {
        let body = json!([
            { "id": 1, "nombre": "Widget", "imagen": "w.png", "precio": 5000, "stock": 2 },
            { "id": "b-2", "nombre": "Gadget", "imagen": "g.png", "precio": "1200", "stock": "7" },
            { "id": 3.0, "nombre": "Doohickey", "precio": 800.0, "stock": 0 },
        ]);

        let products = decode_listing(&serde_json::to_vec(&body)?)?;

        let [widget, gadget, doohickey] = products.as_slice() else {
            panic!("expected three products, got {products:?}");
        };

        assert_eq!(widget.id.as_str(), "1");
        assert_eq!(widget.price, 5000);
        assert_eq!(gadget.id.as_str(), "b-2");
        assert_eq!(gadget.price, 1200);
        assert_eq!(gadget.stock, 7);
        assert_eq!(doohickey.id.as_str(), "3");
        assert_eq!(doohickey.price, 800);
        assert_eq!(doohickey.image, "");

        Ok(())
    }

    #[test]
    fn listing_accepts_wrapped_array() -> TestResult {
        let body = json!({
            "productos": [{ "id": "1", "nombre": "Widget", "imagen": "", "precio": 10, "stock": 1 }]
        });

        let products = decode_listing(&serde_json::to_vec(&body)?)?;

        assert_eq!(products.len(), 1);

        let body = json!({
            "data": [{ "id": "1", "nombre": "Widget", "imagen": "", "precio": 10, "stock": 1 }]
        });

        assert_eq!(decode_listing(&serde_json::to_vec(&body)?)?.len(), 1);

        Ok(())
    }

    #[test]
    fn listing_clamps_negative_stock() -> TestResult {
        let body = json!([{ "id": "1", "nombre": "Widget", "precio": 10, "stock": -3 }]);

        let products = decode_listing(&serde_json::to_vec(&body)?)?;

        assert_eq!(products.first().map(|product| product.stock), Some(0));

        Ok(())
    }

    #[test]
    fn listing_rejects_fractional_or_negative_price() -> TestResult {
        for price in [json!(10.5), json!(-1), json!("ten")] {
            let body = json!([{ "id": "1", "nombre": "Widget", "precio": price, "stock": 1 }]);
            let result = decode_listing(&serde_json::to_vec(&body)?);

            assert!(
                matches!(result, Err(RemoteError::InvalidProduct(_))),
                "expected InvalidProduct for price {price}, got {result:?}"
            );
        }

        Ok(())
    }

    #[test]
    fn listing_rejects_garbage() {
        let result = decode_listing(b"<html>oops</html>");

        assert!(matches!(result, Err(RemoteError::Decode(_))));
    }

    #[test]
    fn reservation_reads_new_stock() -> TestResult {
        let reservation = decode_reservation(br#"{"success": true, "nuevoStock": 4}"#)?;

        assert_eq!(
            reservation,
            Reservation {
                success: true,
                new_stock: Some(4)
            }
        );

        let declined = decode_reservation(br#"{"success": false}"#)?;

        assert!(!declined.success);
        assert_eq!(declined.new_stock, None);

        Ok(())
    }

    #[test]
    fn commit_ack_only_fails_on_explicit_false() {
        assert!(decode_commit_ack(b"").is_ok());
        assert!(decode_commit_ack(b"ok").is_ok());
        assert!(decode_commit_ack(br#"{"success": true}"#).is_ok());
        assert!(matches!(
            decode_commit_ack(br#"{"success": false}"#),
            Err(RemoteError::Declined)
        ));
    }

    #[test]
    fn adjustment_serializes_with_wire_names() -> TestResult {
        let value = serde_json::to_value(StockAdjustment {
            id: ProductId::from("7"),
            quantity: 2,
        })?;

        assert_eq!(value, json!({ "id": "7", "cantidad": 2 }));

        Ok(())
    }
}
