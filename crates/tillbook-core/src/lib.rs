//! # tillbook-core: Pure Business Logic for Tillbook
//!
//! This crate is the **heart** of Tillbook, a small-business management
//! backend covering catalog, invoicing and point-of-sale quick sales. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tillbook Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller (UI / API layer)                      │   │
//! │  │    edit draft ──► validate ──► submit ──► re-fetch catalog     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tillbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   draft   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   lines   │  │   rules   │  │   │
//! │  │   │  Invoice  │  │  VatRate  │  │   totals  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              tillbook-engine (Transaction Committer)            │   │
//! │  │        ordered persistence + stock reconciliation               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Shop, Product, Invoice, Sale, Supply)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - Indexed read-only snapshot of a shop's products
//! - [`draft`] - Editable transaction draft: lines, totals, validity
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//! - [`report`] - Low-stock and revenue reporting helpers
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network and file system access are FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tillbook_core::money::Money;
//! use tillbook_core::types::VatRate;
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(1500); // $15.00
//!
//! // 10% VAT on $15.00 = $1.50
//! let vat = VatRate::from_bps(1000);
//! assert_eq!(subtotal.calculate_vat(vat).cents(), 150);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod draft;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tillbook_core::Money` instead of
// `use tillbook_core::money::Money`

pub use catalog::Catalog;
pub use draft::{DraftKind, DraftLine, Reservations, Totals, TransactionDraft};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default VAT rate in basis points, applied when a shop has no explicit
/// rate configured (1000 bps = 10%).
pub const DEFAULT_VAT_RATE_BPS: u32 = 1000;

/// Customer name recorded on quick sales when none is supplied.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Maximum lines allowed in a single transaction draft.
///
/// ## Business Reason
/// Prevents runaway drafts and keeps transaction sizes reasonable.
/// Can be made configurable per-shop in future versions.
pub const MAX_DRAFT_LINES: usize = 100;

/// Maximum quantity of a single line in a draft.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
