//! # tillbook-db: Database Layer for Tillbook
//!
//! SQLite persistence for shops, products, invoices, sales and supplies,
//! using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillbook Data Flow                               │
//! │                                                                         │
//! │  tillbook-engine::Committer                                            │
//! │       │ TransactionStore trait                                         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tillbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FKs     │    │ InvoiceRepo   │    │              │  │   │
//! │  │   └───────────────┘    │ SaleRepo ...  │    └──────────────┘  │   │
//! │  │                        └───────────────┘                       │   │
//! │  │   SqliteStore (store.rs) adapts repositories to the engine's   │   │
//! │  │   TransactionStore contract                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: for tests)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillbook_db::{Database, DbConfig, SqliteStore};
//! use tillbook_engine::Committer;
//!
//! let db = Database::new(DbConfig::new("path/to/tillbook.db")).await?;
//! let committer = Committer::new(SqliteStore::new(db.clone()));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use store::SqliteStore;

// Repository re-exports for convenience
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::shop::ShopRepository;
pub use repository::supply::SupplyRepository;
