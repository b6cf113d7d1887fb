//! # Transaction Committer
//!
//! Drives the persistence of validated drafts and their compensating
//! stock adjustments against a [`TransactionStore`].
//!
//! ## Commit Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Creation Commit                                    │
//! │                                                                         │
//! │  1. RE-VALIDATE against the caller's catalog snapshot                  │
//! │     └── any failing line aborts BEFORE any persistence call            │
//! │                                                                         │
//! │  2. PERSIST the invoice/sale record (with items, computed totals)      │
//! │     └── awaited; no optimistic local commit                            │
//! │                                                                         │
//! │  3. STOCK WRITES, one per line, STRICTLY SEQUENTIAL                    │
//! │     └── new value computed from the snapshot + prior lines             │
//! │     └── negative result → refuse that write, stop the loop             │
//! │     └── failed write   → stop the loop                                 │
//! │     └── NO rollback of the record or of earlier lines                  │
//! │                                                                         │
//! │  4. caller re-fetches the catalog to converge                          │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                      Invoice Edit                                       │
//! │                                                                         │
//! │  1. RESTORE: stock += original quantity, per original item             │
//! │  2. REAPPLY: stock -= new quantity, against the restored values        │
//! │  3. PERSIST the updated invoice record                                 │
//! │                                                                         │
//! │  Restore-then-reapply avoids diffing old vs new item sets, at the      │
//! │  cost of redundant writes for unchanged products.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The per-line writes are serialized on purpose: latency is traded for
//! deterministic per-product error attribution. Do not parallelize them
//! without first moving the whole adjustment into one atomic multi-row
//! store operation.
//!
//! ## Concurrency Caveat
//!
//! No cross-client lock or version token protects `Product.stock`. Two
//! commits racing on the same product can both validate against stock=5
//! and both decrement; the committer only guarantees it never *computes*
//! a negative value from the snapshot it was handed.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CommitError, CommitResult};
use crate::numbers;
use crate::store::TransactionStore;
use tillbook_core::{
    Catalog, CoreError, DraftKind, Invoice, InvoiceStatus, Reservations, Sale, Supply,
    SupplyStatus, Transaction, TransactionDraft, TransactionItem, ValidationError, VatRate,
    WALK_IN_CUSTOMER,
};

// =============================================================================
// Commit Mode
// =============================================================================

/// Whether a commit creates a new transaction or replaces an existing
/// invoice's lines.
#[derive(Debug, Clone)]
pub enum CommitMode {
    /// Create a new invoice or sale.
    Create,
    /// Replace the items of an existing invoice. The original (with its
    /// items as persisted) feeds both the reservation-aware validation
    /// and the stock restoration phase.
    Edit { original: Invoice },
}

// =============================================================================
// Committer
// =============================================================================

/// The transaction committer.
///
/// Holds a store implementation and exposes the commit flows. The
/// committer never fetches catalog state on its own: callers pass the
/// snapshot they validated the form against, and re-fetch afterwards.
pub struct Committer<S> {
    store: S,
}

impl<S: TransactionStore> Committer<S> {
    /// Creates a committer over the given store.
    pub fn new(store: S) -> Self {
        Committer { store }
    }

    /// Access to the underlying store (for callers that also read).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commits a draft: creates an invoice or sale, or applies an edit to
    /// an existing invoice.
    pub async fn commit(
        &self,
        draft: &TransactionDraft,
        catalog: &Catalog,
        vat: VatRate,
        mode: CommitMode,
    ) -> CommitResult<Transaction> {
        match mode {
            CommitMode::Create => self.create(draft, catalog, vat).await,
            CommitMode::Edit { original } => match draft.kind {
                DraftKind::Invoice => self
                    .edit(draft, catalog, vat, original)
                    .await
                    .map(Transaction::Invoice),
                DraftKind::Sale => Err(CommitError::SaleNotEditable),
            },
        }
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    async fn create(
        &self,
        draft: &TransactionDraft,
        catalog: &Catalog,
        vat: VatRate,
    ) -> CommitResult<Transaction> {
        // Step 1: re-validate against the freshest snapshot the caller
        // holds. Nothing is persisted past a failing line.
        draft.validate(catalog, &Reservations::new())?;

        let totals = draft.totals(vat);
        let now = Utc::now();
        let items = snapshot_items(draft, catalog);

        match draft.kind {
            DraftKind::Invoice => {
                let Some(due_date) = draft.due_date else {
                    return Err(CoreError::from(ValidationError::Required {
                        field: "due_date".to_string(),
                    })
                    .into());
                };

                let invoice = Invoice {
                    id: Uuid::new_v4().to_string(),
                    shop_id: draft.shop_id.clone(),
                    invoice_number: numbers::invoice_number(),
                    customer_name: draft.customer_name.trim().to_string(),
                    customer_email: draft.customer_email.clone(),
                    status: InvoiceStatus::Pending,
                    subtotal_cents: totals.subtotal_cents,
                    tax_cents: totals.tax_cents,
                    total_cents: totals.total_cents,
                    due_date,
                    created_at: now,
                    paid_at: None,
                    items,
                };

                // Step 2: the record write is awaited before any stock
                // moves.
                debug!(invoice_id = %invoice.id, lines = invoice.items.len(), "Persisting invoice");
                self.store.create_invoice(&invoice).await?;

                // Step 3: sequential per-line decrements.
                self.apply_stock_writes(catalog, decrements(&invoice.items))
                    .await?;

                info!(
                    invoice_id = %invoice.id,
                    number = %invoice.invoice_number,
                    total_cents = invoice.total_cents,
                    "Invoice committed"
                );
                Ok(Transaction::Invoice(invoice))
            }
            DraftKind::Sale => {
                let trimmed = draft.customer_name.trim();
                let customer_name = if trimmed.is_empty() {
                    WALK_IN_CUSTOMER.to_string()
                } else {
                    trimmed.to_string()
                };

                let sale = Sale {
                    id: Uuid::new_v4().to_string(),
                    shop_id: draft.shop_id.clone(),
                    sale_number: numbers::sale_number(),
                    customer_name,
                    payment_method: draft.payment_method,
                    subtotal_cents: totals.subtotal_cents,
                    tax_cents: totals.tax_cents,
                    total_cents: totals.total_cents,
                    created_at: now,
                    invoice_id: None,
                    items,
                };

                debug!(sale_id = %sale.id, lines = sale.items.len(), "Persisting sale");
                self.store.create_sale(&sale).await?;

                self.apply_stock_writes(catalog, decrements(&sale.items))
                    .await?;

                info!(
                    sale_id = %sale.id,
                    number = %sale.sale_number,
                    total_cents = sale.total_cents,
                    "Sale committed"
                );
                Ok(Transaction::Sale(sale))
            }
        }
    }

    // ------------------------------------------------------------------
    // Invoice Edit
    // ------------------------------------------------------------------

    async fn edit(
        &self,
        draft: &TransactionDraft,
        catalog: &Catalog,
        vat: VatRate,
        original: Invoice,
    ) -> CommitResult<Invoice> {
        // Available stock for the edit counts the original reservation
        // as returned.
        let reserved = original.reservations();
        draft.validate(catalog, &reserved)?;

        let Some(due_date) = draft.due_date else {
            return Err(CoreError::from(ValidationError::Required {
                field: "due_date".to_string(),
            })
            .into());
        };

        let totals = draft.totals(vat);
        let items = snapshot_items(draft, catalog);

        // Phase 1 restores the original reservation, phase 2 takes the
        // new one against the restored values. Both run through the same
        // sequential writer so attribution stays per-product.
        let mut writes: Vec<(String, i64)> = original
            .items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();
        writes.extend(items.iter().map(|item| (item.product_id.clone(), -item.quantity)));
        self.apply_stock_writes(catalog, writes).await?;

        let updated = Invoice {
            id: original.id.clone(),
            shop_id: original.shop_id.clone(),
            invoice_number: original.invoice_number.clone(),
            customer_name: draft.customer_name.trim().to_string(),
            customer_email: draft.customer_email.clone(),
            status: original.status,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
            due_date,
            created_at: original.created_at,
            paid_at: original.paid_at,
            items,
        };
        self.store.update_invoice(&updated).await?;

        info!(
            invoice_id = %updated.id,
            total_cents = updated.total_cents,
            "Invoice edit committed"
        );
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Sale → Invoice Conversion
    // ------------------------------------------------------------------

    /// Converts a quick sale into a paid invoice, once.
    ///
    /// The sale already decremented stock at its own creation, so the
    /// conversion moves no stock in either direction. The freshest sale
    /// record is read from the store so a stale caller cannot convert
    /// twice.
    pub async fn convert_sale_to_invoice(&self, sale_id: &str) -> CommitResult<Invoice> {
        let sale = self.store.get_sale(sale_id).await?;

        if let Some(invoice_id) = &sale.invoice_id {
            return Err(CommitError::AlreadyConverted {
                sale_id: sale.id.clone(),
                invoice_id: invoice_id.clone(),
            });
        }

        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            shop_id: sale.shop_id.clone(),
            invoice_number: numbers::invoice_number(),
            customer_name: sale.customer_name.clone(),
            customer_email: None,
            status: InvoiceStatus::Paid,
            subtotal_cents: sale.subtotal_cents,
            tax_cents: sale.tax_cents,
            total_cents: sale.total_cents,
            due_date: now,
            created_at: now,
            paid_at: Some(now),
            items: sale
                .items
                .iter()
                .map(|item| TransactionItem {
                    id: Uuid::new_v4().to_string(),
                    ..item.clone()
                })
                .collect(),
        };

        self.store.create_invoice(&invoice).await?;
        self.store.set_sale_invoice(&sale.id, &invoice.id).await?;

        info!(
            sale_id = %sale.id,
            invoice_id = %invoice.id,
            "Sale converted to invoice"
        );
        Ok(invoice)
    }

    // ------------------------------------------------------------------
    // Status Transition
    // ------------------------------------------------------------------

    /// Patches an invoice's status. A pure metadata transition: items,
    /// totals and stock are untouched, and no line re-validation runs.
    ///
    /// `paid_at` is set exactly when the status transitions into `Paid`
    /// and kept as-is otherwise.
    pub async fn set_invoice_status(
        &self,
        invoice_id: &str,
        status: InvoiceStatus,
    ) -> CommitResult<Invoice> {
        let current = self.store.get_invoice(invoice_id).await?;

        let paid_at = if status == InvoiceStatus::Paid && current.status != InvoiceStatus::Paid {
            Some(Utc::now())
        } else {
            current.paid_at
        };

        let updated = self
            .store
            .set_invoice_status(invoice_id, status, paid_at)
            .await?;

        info!(invoice_id = %invoice_id, status = ?status, "Invoice status updated");
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Removes an invoice record.
    ///
    /// Stock reserved by the invoice is NOT restored; deletion is a pure
    /// record removal, kept separate from the reconciliation flows.
    pub async fn delete_invoice(&self, invoice_id: &str) -> CommitResult<()> {
        warn!(invoice_id = %invoice_id, "Deleting invoice; its reserved stock is not restored");
        self.store.delete_invoice(invoice_id).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Supply Receipt
    // ------------------------------------------------------------------

    /// Receives an ordered supply: adds each item's quantity to the
    /// product's stock (sequentially), then marks the supply received.
    ///
    /// Only an `Ordered` supply can be received, exactly once, so stock
    /// is never double-incremented.
    pub async fn receive_supply(&self, supply_id: &str) -> CommitResult<Supply> {
        let supply = self.store.get_supply(supply_id).await?;

        if supply.status != SupplyStatus::Ordered {
            return Err(CommitError::SupplyNotReceivable {
                supply_id: supply.id.clone(),
                status: supply.status,
            });
        }

        let mut applied: Vec<String> = Vec::new();
        for item in &supply.items {
            let product = match self.store.get_product(&item.product_id).await {
                Ok(product) => product,
                Err(source) => {
                    warn!(product_id = %item.product_id, "Supply stock read failed; prior increments stand");
                    return Err(CommitError::StockWriteFailed {
                        product_id: item.product_id.clone(),
                        applied,
                        source,
                    });
                }
            };

            match self
                .store
                .update_product_stock(&item.product_id, product.stock + item.quantity)
                .await
            {
                Ok(_) => applied.push(item.product_id.clone()),
                Err(source) => {
                    warn!(product_id = %item.product_id, "Supply stock write failed; prior increments stand");
                    return Err(CommitError::StockWriteFailed {
                        product_id: item.product_id.clone(),
                        applied,
                        source,
                    });
                }
            }
        }

        let received_at = Utc::now();
        self.store.set_supply_received(&supply.id, received_at).await?;

        info!(supply_id = %supply.id, lines = supply.items.len(), "Supply received");
        Ok(Supply {
            status: SupplyStatus::Received,
            received_at: Some(received_at),
            ..supply
        })
    }

    // ------------------------------------------------------------------
    // Sequential Stock Writer
    // ------------------------------------------------------------------

    /// Applies signed stock deltas one at a time, in order.
    ///
    /// Each write persists the absolute new value, computed from the
    /// catalog snapshot plus whatever this commit already wrote for the
    /// same product. A negative result or a failed write stops the loop;
    /// earlier writes stand and are reported in `applied`.
    async fn apply_stock_writes(
        &self,
        catalog: &Catalog,
        writes: Vec<(String, i64)>,
    ) -> CommitResult<()> {
        let mut running: HashMap<String, i64> = HashMap::new();
        let mut applied: Vec<String> = Vec::new();

        for (product_id, delta) in writes {
            let current = match running.get(&product_id) {
                Some(value) => *value,
                None => catalog.stock(&product_id).unwrap_or(0),
            };
            let new_stock = current + delta;

            if new_stock < 0 {
                let name = catalog
                    .get(&product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| product_id.clone());
                warn!(
                    product_id = %product_id,
                    available = current,
                    requested = -delta,
                    applied = applied.len(),
                    "Stock would go negative; stopping stock writes without rollback"
                );
                return Err(CommitError::StockUnderflow {
                    product_id,
                    name,
                    available: current,
                    requested: -delta,
                    applied,
                });
            }

            match self.store.update_product_stock(&product_id, new_stock).await {
                Ok(_) => {
                    running.insert(product_id.clone(), new_stock);
                    applied.push(product_id);
                }
                Err(source) => {
                    warn!(
                        product_id = %product_id,
                        applied = applied.len(),
                        "Stock write failed; prior writes are not rolled back"
                    );
                    return Err(CommitError::StockWriteFailed {
                        product_id,
                        applied,
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Freezes product data into persisted line items.
///
/// Runs after validation, so every line's product resolves in the
/// catalog; lines that do not (impossible past validation) are skipped
/// rather than invented.
fn snapshot_items(draft: &TransactionDraft, catalog: &Catalog) -> Vec<TransactionItem> {
    draft
        .lines
        .iter()
        .filter_map(|line| {
            let product = catalog.get(&line.product_id)?;
            Some(TransactionItem {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                sku_snapshot: product.sku.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line.line_total_cents(),
            })
        })
        .collect()
}

/// One negative delta per line, in line order.
fn decrements(items: &[TransactionItem]) -> Vec<(String, i64)> {
    items
        .iter()
        .map(|item| (item.product_id.clone(), -item.quantity))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
