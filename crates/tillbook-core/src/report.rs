//! # Reporting Helpers
//!
//! Pure aggregation over committed transactions and catalog state: revenue
//! summaries, low-stock listings, and cost-based margin estimates. All
//! functions here fold over slices the caller already fetched; nothing
//! reaches for storage.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::money::Money;
use crate::types::{Product, Transaction, TransactionItem};

// =============================================================================
// Revenue Summary
// =============================================================================

/// Aggregated revenue over a set of committed transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    /// Number of transactions folded in.
    pub transactions: usize,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl RevenueSummary {
    /// Grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Sums subtotal, tax and total over invoices and sales alike.
pub fn summarize(transactions: &[Transaction]) -> RevenueSummary {
    let mut summary = RevenueSummary::default();
    for tx in transactions {
        summary.transactions += 1;
        match tx {
            Transaction::Invoice(inv) => {
                summary.subtotal_cents += inv.subtotal_cents;
                summary.tax_cents += inv.tax_cents;
                summary.total_cents += inv.total_cents;
            }
            Transaction::Sale(sale) => {
                summary.subtotal_cents += sale.subtotal_cents;
                summary.tax_cents += sale.tax_cents;
                summary.total_cents += sale.total_cents;
            }
        }
    }
    summary
}

// =============================================================================
// Stock Reports
// =============================================================================

/// Products at or below their advisory low-stock threshold.
///
/// Products without a threshold never appear; the signal is advisory and
/// opt-in per product.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}

/// Estimated margin in cents for a set of committed line items: revenue
/// (frozen line totals) minus unit cost × quantity, looked up in the
/// current catalog.
///
/// Items whose product is gone from the catalog, or whose product has no
/// recorded cost, contribute their revenue with zero cost, so the estimate
/// is an upper bound in that case.
pub fn margin_cents(items: &[TransactionItem], catalog: &Catalog) -> i64 {
    items
        .iter()
        .map(|item| {
            let cost = catalog
                .get(&item.product_id)
                .and_then(|p| p.cost_cents)
                .unwrap_or(0);
            item.line_total_cents - cost * item.quantity
        })
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
