//! # Commit Error Types
//!
//! Failure taxonomy of the commit flow, ordered by where in the flow each
//! can occur:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Commit Errors Arise                            │
//! │                                                                         │
//! │  1. re-validate draft        → Validation        (nothing persisted)   │
//! │  2. persist record           → Store             (nothing persisted*)  │
//! │  3. per-line stock writes    → StockUnderflow /                         │
//! │                                StockWriteFailed  (record persisted,    │
//! │                                                   earlier lines stand) │
//! │                                                                         │
//! │  Lifecycle refusals (any step before writes):                          │
//! │    AlreadyConverted, SaleNotEditable, SupplyNotReceivable              │
//! │                                                                         │
//! │  * for creation; an edit has already adjusted stock by this point      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `StockUnderflow` and `StockWriteFailed` carry the product ids whose
//! stock was already written in the same commit. No rollback is
//! attempted; the caller reconciles from the error and a catalog
//! re-fetch.

use thiserror::Error;

use crate::store::StoreError;
use tillbook_core::{CoreError, SupplyStatus};

// =============================================================================
// Commit Error
// =============================================================================

/// Errors surfaced by the transaction committer.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Commit-time re-validation failed: the draft is invalid against the
    /// freshest catalog snapshot (possibly because another client changed
    /// stock since the form opened). Nothing was persisted.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// A store operation failed before any stock was touched. Safe to
    /// retry the whole commit.
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),

    /// A per-line stock write failed after the transaction record (and
    /// possibly earlier lines) already persisted. `applied` lists the
    /// product ids whose stock was written before the failure; none of
    /// them are rolled back.
    #[error("stock write for {product_id} failed after {} prior update(s): {source}", .applied.len())]
    StockWriteFailed {
        product_id: String,
        applied: Vec<String>,
        source: StoreError,
    },

    /// A computed stock value would be negative. The offending line's
    /// write is refused and the stock-adjustment loop stops; earlier
    /// lines' writes stand.
    #[error("stock for {name} would go negative: available {available}, requested {requested}")]
    StockUnderflow {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
        applied: Vec<String>,
    },

    /// The sale already carries an invoice link; conversion is one-way
    /// and one-time.
    #[error("sale {sale_id} was already converted to invoice {invoice_id}")]
    AlreadyConverted {
        sale_id: String,
        invoice_id: String,
    },

    /// Sales are created and optionally converted, never edited.
    #[error("sales cannot be edited once created")]
    SaleNotEditable,

    /// Only an `Ordered` supply can be received.
    #[error("supply {supply_id} is {status:?}, cannot be received")]
    SupplyNotReceivable {
        supply_id: String,
        status: SupplyStatus,
    },
}

/// Convenience type alias for Results with CommitError.
pub type CommitResult<T> = Result<T, CommitError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_write_failed_message_counts_applied() {
        let err = CommitError::StockWriteFailed {
            product_id: "p2".to_string(),
            applied: vec!["p1".to_string()],
            source: StoreError::Unavailable("connection reset".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "stock write for p2 failed after 1 prior update(s): store unavailable: connection reset"
        );
    }

    #[test]
    fn test_underflow_message_names_product() {
        let err = CommitError::StockUnderflow {
            product_id: "p1".to_string(),
            name: "Widget".to_string(),
            available: 2,
            requested: 5,
            applied: vec![],
        };
        assert_eq!(
            err.to_string(),
            "stock for Widget would go negative: available 2, requested 5"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: CommitError = CoreError::UnknownProduct { line: 0 }.into();
        assert_eq!(
            err.to_string(),
            "line 0: product is not selected or no longer exists"
        );
    }
}
