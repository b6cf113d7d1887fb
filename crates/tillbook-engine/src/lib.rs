//! # tillbook-engine: Transaction Committer
//!
//! Persists validated transaction drafts and reconciles product stock, in
//! a defined order with defined failure semantics.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Commit Data Flow                                  │
//! │                                                                         │
//! │  Caller (UI / API layer)                                               │
//! │       │  draft + catalog snapshot + VAT rate                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tillbook-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Committer   │    │ TransactionStore   │ MemoryStore  │  │   │
//! │  │   │ (committer.rs)│───►│   (store.rs)  │◄───│ (memory.rs)  │  │   │
//! │  │   │               │    │  async trait  │    │ test double  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  └────────────────────────────────┼───────────────────────────────┘   │
//! │                                   ▼                                    │
//! │                      tillbook-db::SqliteStore                          │
//! │                                                                         │
//! │  Commit order (creation):                                              │
//! │    1. re-validate against the snapshot  → abort before any write       │
//! │    2. persist the transaction record    → awaited, nothing optimistic  │
//! │    3. per-line stock writes, SEQUENTIAL → deterministic attribution    │
//! │    4. caller re-fetches catalog         → UI converges                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Limitation: No Rollback
//!
//! A stock write that fails after the transaction record persisted (or
//! after earlier lines already wrote) is NOT compensated: the record
//! stays, prior decrements stay. [`CommitError::StockWriteFailed`] and
//! [`CommitError::StockUnderflow`] report exactly which products were
//! already written so the operator can reconcile. Likewise, deleting an
//! invoice does not restore stock. Both behaviors are deliberate and
//! logged at `warn!` level.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod committer;
pub mod error;
pub mod memory;
pub mod numbers;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use committer::{CommitMode, Committer};
pub use error::CommitError;
pub use memory::MemoryStore;
pub use store::{StoreError, StoreResult, TransactionStore};
