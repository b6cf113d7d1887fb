//! # In-Memory Store
//!
//! A [`TransactionStore`] backed by plain maps, for tests and demos.
//!
//! ## Thread Safety
//! State lives behind a single `Mutex`: trait methods lock, mutate, and
//! release before returning: no lock is held across an await point.
//!
//! ## Test Hooks
//! - [`MemoryStore::stock_writes`] records every stock write in order,
//!   so tests can assert exactly which products were written and with
//!   what values (and that nothing was written at all).
//! - [`MemoryStore::fail_stock_write_for`] makes writes to one product
//!   fail, exercising the partial-commit paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::store::{StoreError, StoreResult, TransactionStore};
use tillbook_core::{Invoice, InvoiceStatus, Product, Sale, Supply, SupplyStatus};

#[derive(Default)]
struct Inner {
    products: HashMap<String, Product>,
    invoices: HashMap<String, Invoice>,
    sales: HashMap<String, Sale>,
    supplies: HashMap<String, Supply>,
    stock_writes: Vec<(String, i64)>,
    fail_stock_writes: HashSet<String>,
}

/// In-memory [`TransactionStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    /// Inserts or replaces a product.
    pub fn insert_product(&self, product: Product) {
        self.lock().products.insert(product.id.clone(), product);
    }

    /// Inserts or replaces a supply order.
    pub fn insert_supply(&self, supply: Supply) {
        self.lock().supplies.insert(supply.id.clone(), supply);
    }

    /// Every stock write seen so far, in order: (product id, new value).
    pub fn stock_writes(&self) -> Vec<(String, i64)> {
        self.lock().stock_writes.clone()
    }

    /// Number of invoices currently stored.
    pub fn invoice_count(&self) -> usize {
        self.lock().invoices.len()
    }

    /// Number of sales currently stored.
    pub fn sale_count(&self) -> usize {
        self.lock().sales.len()
    }

    /// Makes every subsequent stock write for `product_id` fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_stock_write_for(&self, product_id: &str) {
        self.lock().fail_stock_writes.insert(product_id.to_string());
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn list_products(&self, shop_id: &str) -> StoreResult<Vec<Product>> {
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| p.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: &str) -> StoreResult<Product> {
        self.lock()
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn update_product_stock(&self, id: &str, new_stock: i64) -> StoreResult<Product> {
        let mut inner = self.lock();
        if inner.fail_stock_writes.contains(id) {
            return Err(StoreError::Unavailable(format!(
                "injected failure writing stock for {id}"
            )));
        }
        let product = inner
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.stock = new_stock;
        product.updated_at = Utc::now();
        let updated = product.clone();
        inner.stock_writes.push((id.to_string(), new_stock));
        Ok(updated)
    }

    async fn create_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.invoices.contains_key(&invoice.id) {
            return Err(StoreError::Conflict(format!(
                "invoice {} already exists",
                invoice.id
            )));
        }
        inner.invoices.insert(invoice.id.clone(), invoice.clone());
        Ok(())
    }

    async fn get_invoice(&self, id: &str) -> StoreResult<Invoice> {
        self.lock()
            .invoices
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Invoice", id))
    }

    async fn update_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut inner = self.lock();
        if !inner.invoices.contains_key(&invoice.id) {
            return Err(StoreError::not_found("Invoice", &invoice.id));
        }
        inner.invoices.insert(invoice.id.clone(), invoice.clone());
        Ok(())
    }

    async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Invoice> {
        let mut inner = self.lock();
        let invoice = inner
            .invoices
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Invoice", id))?;
        invoice.status = status;
        invoice.paid_at = paid_at;
        Ok(invoice.clone())
    }

    async fn delete_invoice(&self, id: &str) -> StoreResult<()> {
        self.lock()
            .invoices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Invoice", id))
    }

    async fn create_sale(&self, sale: &Sale) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.sales.contains_key(&sale.id) {
            return Err(StoreError::Conflict(format!(
                "sale {} already exists",
                sale.id
            )));
        }
        inner.sales.insert(sale.id.clone(), sale.clone());
        Ok(())
    }

    async fn get_sale(&self, id: &str) -> StoreResult<Sale> {
        self.lock()
            .sales
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Sale", id))
    }

    async fn set_sale_invoice(&self, sale_id: &str, invoice_id: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        let sale = inner
            .sales
            .get_mut(sale_id)
            .ok_or_else(|| StoreError::not_found("Sale", sale_id))?;
        // One-way link: never overwritten
        if let Some(existing) = &sale.invoice_id {
            return Err(StoreError::Conflict(format!(
                "sale {sale_id} already linked to invoice {existing}"
            )));
        }
        sale.invoice_id = Some(invoice_id.to_string());
        Ok(())
    }

    async fn get_supply(&self, id: &str) -> StoreResult<Supply> {
        self.lock()
            .supplies
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Supply", id))
    }

    async fn set_supply_received(&self, id: &str, received_at: DateTime<Utc>) -> StoreResult<()> {
        let mut inner = self.lock();
        let supply = inner
            .supplies
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Supply", id))?;
        if supply.status != SupplyStatus::Ordered {
            return Err(StoreError::Conflict(format!(
                "supply {id} is not in the ordered state"
            )));
        }
        supply.status = SupplyStatus::Received;
        supply.received_at = Some(received_at);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_stock_write_log() {
        let store = MemoryStore::new();
        store.insert_product(product("p1", 10));

        store.update_product_stock("p1", 7).await.unwrap();
        store.update_product_stock("p1", 4).await.unwrap();

        assert_eq!(
            store.stock_writes(),
            vec![("p1".to_string(), 7), ("p1".to_string(), 4)]
        );
        assert_eq!(store.get_product("p1").await.unwrap().stock, 4);
    }

    #[tokio::test]
    async fn test_injected_stock_failure() {
        let store = MemoryStore::new();
        store.insert_product(product("p1", 10));
        store.fail_stock_write_for("p1");

        let err = store.update_product_stock("p1", 7).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        // Failed write leaves state and log untouched
        assert_eq!(store.get_product("p1").await.unwrap().stock, 10);
        assert!(store.stock_writes().is_empty());
    }

    #[tokio::test]
    async fn test_missing_entities_report_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_product("ghost").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store.get_invoice("ghost").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store.get_sale("ghost").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
