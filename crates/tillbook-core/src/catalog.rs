//! # Catalog Snapshot
//!
//! A read-only, indexed view of a shop's products as last fetched from
//! storage.
//!
//! ## Snapshot Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Lifecycle                                  │
//! │                                                                         │
//! │  store.list_products(shop_id) ──► Catalog::new(products)               │
//! │        │                               │                                │
//! │        │                               ├── draft validation reads it   │
//! │        │                               └── commit re-validation reads  │
//! │        │                                   the freshest one available  │
//! │        ▼                                                                │
//! │  after every commit attempt: re-fetch ──► new Catalog                  │
//! │                                                                         │
//! │  The snapshot carries NO freshness or locking guarantee. Another       │
//! │  client can mutate stock between fetch and commit; the commit          │
//! │  engine re-validates against the snapshot it is handed and refuses     │
//! │  to compute a negative stock, nothing more.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::draft::Reservations;
use crate::types::Product;

/// Indexed snapshot of a shop's products.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_id: HashMap<String, Product>,
}

impl Catalog {
    /// Builds a catalog from a fetched product list.
    ///
    /// Later duplicates of the same product id win, matching
    /// last-write-wins fetch semantics.
    pub fn new(products: Vec<Product>) -> Self {
        let by_id = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        Catalog { by_id }
    }

    /// Looks up a product by id.
    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.by_id.get(product_id)
    }

    /// Current stock for a product, if it exists in the snapshot.
    pub fn stock(&self, product_id: &str) -> Option<i64> {
        self.by_id.get(product_id).map(|p| p.stock)
    }

    /// Effective available stock for a product given a set of prior
    /// reservations being returned (the invoice-edit path).
    ///
    /// `available = stock + reservation`: the edit conceptually gives
    /// back what the original invoice took before re-checking.
    pub fn available(&self, product_id: &str, reserved: &Reservations) -> Option<i64> {
        self.by_id
            .get(product_id)
            .map(|p| p.stock + reserved.get(product_id).copied().unwrap_or(0))
    }

    /// Number of products in the snapshot.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Checks if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterates over the products in the snapshot (unordered).
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.by_id.values()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            shop_id: "shop-1".to_string(),
            sku: format!("SKU-{id}"),
            name: format!("Product {id}"),
            price_cents: 500,
            cost_cents: None,
            stock,
            min_stock: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_lookup_and_stock() {
        let catalog = Catalog::new(vec![product("p1", 10), product("p2", 0)]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.stock("p1"), Some(10));
        assert_eq!(catalog.stock("p2"), Some(0));
        assert_eq!(catalog.stock("missing"), None);
        assert!(catalog.get("p1").is_some());
    }

    #[test]
    fn test_available_adds_reservation() {
        let catalog = Catalog::new(vec![product("p1", 10)]);

        let mut reserved = Reservations::new();
        reserved.insert("p1".to_string(), 5);

        // 10 in stock + 5 previously reserved by the invoice being edited
        assert_eq!(catalog.available("p1", &reserved), Some(15));
        // No reservation recorded: plain stock
        assert_eq!(catalog.available("p1", &Reservations::new()), Some(10));
        assert_eq!(catalog.available("missing", &reserved), None);
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let catalog = Catalog::new(vec![product("p1", 10), product("p1", 3)]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.stock("p1"), Some(3));
    }
}
