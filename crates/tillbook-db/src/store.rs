//! # SQLite Store Adapter
//!
//! Implements the commit engine's [`TransactionStore`] contract on top of
//! the repository layer, and maps [`DbError`] into the engine's
//! [`StoreError`] taxonomy in one place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::pool::Database;
use tillbook_core::{Invoice, InvoiceStatus, Product, Sale, Supply};
use tillbook_engine::{StoreError, StoreResult, TransactionStore};

/// [`TransactionStore`] backed by the SQLite repositories.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wraps a database handle.
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// Access to the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// DbError → StoreError mapping.
///
/// ```text
/// NotFound                              → NotFound
/// UniqueViolation / ForeignKeyViolation → Conflict
/// ConnectionFailed / PoolExhausted      → Unavailable
/// everything else                       → Internal
/// ```
fn map_err(err: DbError) -> StoreError {
    match err {
        DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
        DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
            StoreError::Conflict(err.to_string())
        }
        DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Internal(other.to_string()),
    }
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn list_products(&self, shop_id: &str) -> StoreResult<Vec<Product>> {
        self.db
            .products()
            .list_by_shop(shop_id)
            .await
            .map_err(map_err)
    }

    async fn get_product(&self, id: &str) -> StoreResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await
            .map_err(map_err)?
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn update_product_stock(&self, id: &str, new_stock: i64) -> StoreResult<Product> {
        self.db
            .products()
            .set_stock(id, new_stock)
            .await
            .map_err(map_err)
    }

    async fn create_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        self.db.invoices().insert(invoice).await.map_err(map_err)
    }

    async fn get_invoice(&self, id: &str) -> StoreResult<Invoice> {
        self.db
            .invoices()
            .get_by_id(id)
            .await
            .map_err(map_err)?
            .ok_or_else(|| StoreError::not_found("Invoice", id))
    }

    async fn update_invoice(&self, invoice: &Invoice) -> StoreResult<()> {
        self.db.invoices().update(invoice).await.map_err(map_err)
    }

    async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Invoice> {
        self.db
            .invoices()
            .set_status(id, status, paid_at)
            .await
            .map_err(map_err)?;

        self.get_invoice(id).await
    }

    async fn delete_invoice(&self, id: &str) -> StoreResult<()> {
        self.db.invoices().delete(id).await.map_err(map_err)
    }

    async fn create_sale(&self, sale: &Sale) -> StoreResult<()> {
        self.db.sales().insert(sale).await.map_err(map_err)
    }

    async fn get_sale(&self, id: &str) -> StoreResult<Sale> {
        self.db
            .sales()
            .get_by_id(id)
            .await
            .map_err(map_err)?
            .ok_or_else(|| StoreError::not_found("Sale", id))
    }

    async fn set_sale_invoice(&self, sale_id: &str, invoice_id: &str) -> StoreResult<()> {
        self.db
            .sales()
            .set_invoice_id(sale_id, invoice_id)
            .await
            .map_err(map_err)
    }

    async fn get_supply(&self, id: &str) -> StoreResult<Supply> {
        self.db
            .supplies()
            .get_by_id(id)
            .await
            .map_err(map_err)?
            .ok_or_else(|| StoreError::not_found("Supply", id))
    }

    async fn set_supply_received(&self, id: &str, received_at: DateTime<Utc>) -> StoreResult<()> {
        self.db
            .supplies()
            .mark_received(id, received_at)
            .await
            .map_err(map_err)
    }
}
