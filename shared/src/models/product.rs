//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// Read-only from the client's perspective; created and destroyed only by
/// the remote service. `category_name`/`brand_name` are denormalized display
/// strings sent alongside the foreign ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Non-negative price, serialized as a JSON number
    pub price: Decimal,
    pub image_url: String,
    /// Category reference
    pub category_id: i64,
    /// Brand reference
    pub brand_id: i64,
    pub category_name: String,
    pub brand_name: String,
}
