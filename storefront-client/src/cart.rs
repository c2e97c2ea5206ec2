//! Cart engine
//!
//! Owns all cart mutation logic on top of the local key-value store. The cart
//! is an ordered list of product snapshots with quantities, unique by product
//! id; merge-on-add keeps it that way. The whole cart is persisted on every
//! mutation.
//!
//! Every mutation is a read-modify-write cycle executed inside one store
//! write transaction. redb admits a single writer, so two rapid add-to-cart
//! calls serialize and neither can observe a stale read.

use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::models::{CartItem, Product};

use crate::storage::{CART_KEY, LocalStore, StorageResult};

/// Cart engine over the local key-value store
#[derive(Clone)]
pub struct CartEngine {
    store: LocalStore,
}

impl CartEngine {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Add one unit of a product
    ///
    /// Merges by product id: an existing line's quantity is incremented,
    /// otherwise a new line with quantity 1 is appended. Storage failure
    /// surfaces as an error; the cart on disk is never partially written.
    pub fn add_item(&self, product: &Product) -> StorageResult<()> {
        let txn = self.store.begin_write()?;
        let mut items = self.read_items_txn(&txn)?;

        match items.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity += 1,
            None => items.push(CartItem::new(product.clone())),
        }

        self.write_items_txn(&txn, &items)?;
        txn.commit()?;
        tracing::debug!(product_id = product.id, "Added to cart");
        Ok(())
    }

    /// Current cart contents
    ///
    /// A missing or malformed persisted cart yields an empty one; corruption
    /// is reported, not propagated.
    pub fn get_cart(&self) -> StorageResult<Vec<CartItem>> {
        Ok(Self::parse_items(self.store.get_raw(CART_KEY)?))
    }

    /// Remove a product's line entirely
    pub fn remove_item(&self, product_id: i64) -> StorageResult<()> {
        let txn = self.store.begin_write()?;
        let mut items = self.read_items_txn(&txn)?;
        items.retain(|item| item.product.id != product_id);
        self.write_items_txn(&txn, &items)?;
        txn.commit()?;
        Ok(())
    }

    /// Set a line's quantity; zero removes the line
    pub fn set_quantity(&self, product_id: i64, quantity: u32) -> StorageResult<()> {
        let txn = self.store.begin_write()?;
        let mut items = self.read_items_txn(&txn)?;

        if quantity == 0 {
            items.retain(|item| item.product.id != product_id);
        } else if let Some(item) = items.iter_mut().find(|item| item.product.id == product_id) {
            item.quantity = quantity;
        }

        self.write_items_txn(&txn, &items)?;
        txn.commit()?;
        Ok(())
    }

    /// Empty the cart
    pub fn clear(&self) -> StorageResult<()> {
        self.store.delete(CART_KEY)?;
        tracing::debug!("Cart cleared");
        Ok(())
    }

    /// Sum of line totals
    pub fn total(&self) -> StorageResult<Decimal> {
        Ok(self
            .get_cart()?
            .iter()
            .map(CartItem::line_total)
            .sum())
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> StorageResult<u32> {
        Ok(self.get_cart()?.iter().map(|item| item.quantity).sum())
    }

    fn read_items_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<CartItem>> {
        Ok(Self::parse_items(self.store.get_raw_txn(txn, CART_KEY)?))
    }

    fn write_items_txn(&self, txn: &WriteTransaction, items: &[CartItem]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(items)?;
        self.store.put_raw_txn(txn, CART_KEY, &bytes)
    }

    fn parse_items(bytes: Option<Vec<u8>>) -> Vec<CartItem> {
        let Some(bytes) = bytes else {
            return Vec::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(error = %err, "Persisted cart is malformed, starting empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: format!("{name} description"),
            price: Decimal::from(price),
            image_url: format!("/images/{id}.jpg"),
            category_id: 1,
            brand_id: 1,
            category_name: "Laptops".to_string(),
            brand_name: "Acme".to_string(),
        }
    }

    fn engine() -> (LocalStore, CartEngine) {
        let store = LocalStore::open_in_memory().unwrap();
        let cart = CartEngine::new(store.clone());
        (store, cart)
    }

    #[test]
    fn test_add_item_merges_by_product_id() {
        let (_, cart) = engine();

        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        let items = cart.get_cart().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);

        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        let items = cart.get_cart().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_quantity_equals_add_count_per_id() {
        let (_, cart) = engine();

        for _ in 0..3 {
            cart.add_item(&product(1, "Laptop", 999)).unwrap();
        }
        for _ in 0..2 {
            cart.add_item(&product(2, "Phone", 499)).unwrap();
        }

        let items = cart.get_cart().unwrap();
        assert_eq!(items.len(), 2);
        // Insertion order preserved
        assert_eq!(items[0].product.id, 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[1].product.id, 2);
        assert_eq!(items[1].quantity, 2);
        assert_eq!(cart.item_count().unwrap(), 5);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let (_, cart) = engine();
        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        cart.add_item(&product(2, "Phone", 499)).unwrap();

        cart.set_quantity(1, 0).unwrap();
        let items = cart.get_cart().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, 2);
    }

    #[test]
    fn test_set_quantity_updates_existing_line() {
        let (_, cart) = engine();
        cart.add_item(&product(1, "Laptop", 999)).unwrap();

        cart.set_quantity(1, 7).unwrap();
        assert_eq!(cart.get_cart().unwrap()[0].quantity, 7);

        // Unknown product id is a no-op
        cart.set_quantity(42, 3).unwrap();
        assert_eq!(cart.get_cart().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_item_and_clear() {
        let (_, cart) = engine();
        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        cart.add_item(&product(2, "Phone", 499)).unwrap();

        cart.remove_item(1).unwrap();
        assert_eq!(cart.get_cart().unwrap().len(), 1);

        cart.clear().unwrap();
        assert!(cart.get_cart().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_cart_recovers_empty() {
        let (store, cart) = engine();
        store.put_raw(CART_KEY, b"[{broken").unwrap();

        assert!(cart.get_cart().unwrap().is_empty());

        // And the next mutation overwrites the corrupt record
        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        assert_eq!(cart.get_cart().unwrap().len(), 1);
    }

    #[test]
    fn test_total() {
        let (_, cart) = engine();
        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        cart.add_item(&product(1, "Laptop", 999)).unwrap();
        cart.add_item(&product(2, "Phone", 499)).unwrap();

        assert_eq!(cart.total().unwrap(), Decimal::from(999 * 2 + 499));
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.redb");

        let before = {
            let store = LocalStore::open(&path).unwrap();
            let cart = CartEngine::new(store);
            cart.add_item(&product(1, "Laptop", 999)).unwrap();
            cart.add_item(&product(1, "Laptop", 999)).unwrap();
            cart.add_item(&product(2, "Phone", 499)).unwrap();
            cart.get_cart().unwrap()
        };

        let store = LocalStore::open(&path).unwrap();
        let cart = CartEngine::new(store);
        assert_eq!(cart.get_cart().unwrap(), before);
    }
}
