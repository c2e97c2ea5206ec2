//! Catalog filtering
//!
//! Pure derivation of the visible product list from the loaded catalog and
//! the active filter criteria, plus the tri-state the UI renders from.

use serde::{Deserialize, Serialize};
use shared::client::Catalog;
use shared::models::Product;

/// Active filter parameters
///
/// Transient UI state; never persisted. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring match against the product name
    #[serde(default)]
    pub search: String,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

impl FilterCriteria {
    /// Whether a product passes all active criteria (conjunctive)
    pub fn matches(&self, product: &Product) -> bool {
        self.category_id.is_none_or(|id| product.category_id == id)
            && self.brand_id.is_none_or(|id| product.brand_id == id)
            && (self.search.is_empty()
                || product
                    .name
                    .to_lowercase()
                    .contains(&self.search.to_lowercase()))
    }
}

/// The visible subset of `products` under `criteria`, input order preserved
pub fn visible_products(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products
        .iter()
        .filter(|product| criteria.matches(product))
        .cloned()
        .collect()
}

/// Catalog load state as seen by the UI
///
/// Keeps "no matches" (Loaded with an empty visible list), "still loading"
/// and "load failed" distinguishable.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Loaded(Catalog),
    Failed(String),
}

impl CatalogState {
    /// Visible products under `criteria`, or `None` unless loaded
    pub fn visible(&self, criteria: &FilterCriteria) -> Option<Vec<Product>> {
        match self {
            Self::Loaded(catalog) => Some(visible_products(&catalog.products, criteria)),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
