//! # Persistence Contract
//!
//! The async store interface the committer drives. The engine never names
//! a concrete database; `tillbook-db` provides the SQLite implementation
//! and [`crate::MemoryStore`] provides the in-memory test double.
//!
//! ## Contract Notes
//! - `update_product_stock` takes the **absolute** new value. The
//!   committer validates and computes stock; the store only persists it.
//! - `get_*` methods resolve to [`StoreError::NotFound`] rather than an
//!   Option, so commit flows read as straight-line `?` chains.
//! - `set_sale_invoice` must refuse to overwrite an existing link: the
//!   sale → invoice conversion is one-way and one-time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use tillbook_core::{Invoice, InvoiceStatus, Product, Sale, Supply};

// =============================================================================
// Store Error
// =============================================================================

/// Failures surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity does not exist (or no longer exists).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The operation conflicts with persisted state (duplicate key,
    /// already-converted sale, foreign key violation).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing service could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other store-side failure.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Transaction Store
// =============================================================================

/// Persistence operations the commit engine depends on.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Latest known products for a shop. Callers build a
    /// [`tillbook_core::Catalog`] snapshot from the result.
    async fn list_products(&self, shop_id: &str) -> StoreResult<Vec<Product>>;

    /// Fetches one product by id.
    async fn get_product(&self, id: &str) -> StoreResult<Product>;

    /// Persists an absolute new stock value and returns the updated
    /// product.
    async fn update_product_stock(&self, id: &str, new_stock: i64) -> StoreResult<Product>;

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    /// Persists a new invoice with its items.
    async fn create_invoice(&self, invoice: &Invoice) -> StoreResult<()>;

    /// Fetches an invoice (with items) by id.
    async fn get_invoice(&self, id: &str) -> StoreResult<Invoice>;

    /// Replaces an existing invoice record and its items.
    async fn update_invoice(&self, invoice: &Invoice) -> StoreResult<()>;

    /// Patches only status (and paid_at) and returns the updated invoice.
    /// Items, totals and stock are untouched.
    async fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Invoice>;

    /// Removes an invoice and its items.
    async fn delete_invoice(&self, id: &str) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Sales
    // ------------------------------------------------------------------

    /// Persists a new sale with its items.
    async fn create_sale(&self, sale: &Sale) -> StoreResult<()>;

    /// Fetches a sale (with items) by id.
    async fn get_sale(&self, id: &str) -> StoreResult<Sale>;

    /// Sets the one-way sale → invoice link. Implementations must fail
    /// with [`StoreError::Conflict`] if the sale already carries one.
    async fn set_sale_invoice(&self, sale_id: &str, invoice_id: &str) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Supplies
    // ------------------------------------------------------------------

    /// Fetches a supply order (with items) by id.
    async fn get_supply(&self, id: &str) -> StoreResult<Supply>;

    /// Marks an ordered supply as received. Implementations must fail
    /// with [`StoreError::Conflict`] if the supply is not in the
    /// `Ordered` state.
    async fn set_supply_received(&self, id: &str, received_at: DateTime<Utc>) -> StoreResult<()>;
}
