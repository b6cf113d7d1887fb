//! # Error Types
//!
//! Domain-specific error types for tillbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillbook-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations (per-line checks)     │
//! │  └── ValidationError  - Field-level validation failures                │
//! │                                                                         │
//! │  tillbook-engine errors (separate crate)                               │
//! │  ├── CommitError      - Commit flow failures (incl. partial commits)   │
//! │  └── StoreError       - Persistence contract failures                  │
//! │                                                                         │
//! │  tillbook-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CommitError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities, ids)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by draft validation.
///
/// Draft validation is re-run at commit time against the freshest catalog
/// snapshot, so these also surface when the catalog changed between
/// opening the form and submitting it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line has no product selected, or references a product missing
    /// from the catalog snapshot.
    #[error("line {line}: product is not selected or no longer exists")]
    UnknownProduct { line: usize },

    /// The line's product has zero stock.
    #[error("line {line}: {name} is out of stock")]
    OutOfStock { line: usize, name: String },

    /// Line quantity is below one.
    #[error("line {line}: quantity must be at least 1 (got {quantity})")]
    InvalidQuantity { line: usize, quantity: i64 },

    /// The requested quantity exceeds available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Submit draft (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Widget", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "only 3 of Widget available, requested 5"
    /// ```
    #[error("line {line}: only {available} of {name} available, requested {requested}")]
    InsufficientStock {
        line: usize,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Field-level validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation errors.
///
/// These occur when input doesn't meet basic requirements, before any
/// business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            line: 0,
            name: "Widget".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "line 0: only 3 of Widget available, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        assert_eq!(err.to_string(), "customer_name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "due_date".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
