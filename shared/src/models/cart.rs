//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// A product snapshot in the cart plus a quantity
///
/// Persisted as the product's fields flattened alongside `quantity`, so the
/// stored JSON is `{ ..product fields, quantity }`. Merge identity is the
/// product's `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Snapshot a product into the cart with quantity 1
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// Line total (unit price times quantity)
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}
