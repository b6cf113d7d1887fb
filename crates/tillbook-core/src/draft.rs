//! # Transaction Draft
//!
//! The editable, in-memory draft of an invoice or quick sale: an ordered
//! list of lines plus header fields, with derived totals and validity.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Draft Operations Flow                                │
//! │                                                                         │
//! │  User Action              Draft Method            State Change          │
//! │  ───────────              ────────────            ────────────          │
//! │                                                                         │
//! │  Open form ──────────────► invoice()/sale() ────► one empty line       │
//! │                                                                         │
//! │  Click "add line" ───────► add_line() ──────────► lines.push(empty)    │
//! │                                                                         │
//! │  Pick product ───────────► set_line_product() ──► price re-synced      │
//! │                                                    from catalog         │
//! │  Change quantity ────────► set_line_quantity() ─► lines[i].qty = n     │
//! │                                                                         │
//! │  Click remove ───────────► remove_line() ───────► refused if it would  │
//! │                                                    leave zero lines     │
//! │  Every change ───────────► totals() / validate()  recomputed, never    │
//! │                                                    cached               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validity is a pure function of (lines, catalog snapshot, reservations).
//! An invalid draft is simply not submittable; nothing in this module
//! performs I/O or fails in any other way.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, VatRate};
use crate::validation::require_non_blank;
use crate::MAX_DRAFT_LINES;

// =============================================================================
// Reservations
// =============================================================================

/// Stock quantities already held by the transaction being edited, keyed
/// by product id.
///
/// When editing an invoice, the effective available stock of a product is
/// its current stock *plus* what the original invoice reserved: the edit
/// conceptually returns the old reservation before taking the new one.
/// For a brand-new draft this map is empty.
pub type Reservations = HashMap<String, i64>;

// =============================================================================
// Draft Line
// =============================================================================

/// One editable line of a draft.
///
/// `unit_price_cents` is snapshotted from the product when the line's
/// product is chosen and re-synced whenever the product changes, so a
/// later catalog price change does not silently reprice an open form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    /// Selected product id. Empty until the user picks one.
    pub product_id: String,

    /// Requested quantity.
    pub quantity: i64,

    /// Unit price in cents at selection time.
    pub unit_price_cents: i64,
}

impl DraftLine {
    /// A fresh, unselected line.
    fn empty() -> Self {
        DraftLine {
            product_id: String::new(),
            quantity: 1,
            unit_price_cents: 0,
        }
    }

    /// Line total before tax (quantity × unit price).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Derived totals of a draft. Always recomputed from the current lines;
/// never edited independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl Totals {
    /// Subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Tax as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Draft
// =============================================================================

/// Which transaction the draft will become on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    Invoice,
    Sale,
}

/// An in-progress invoice or quick sale.
///
/// ## Invariants
/// - At least one line at all times (removal refuses to empty the list)
/// - At most [`MAX_DRAFT_LINES`] lines
/// - Totals and validity are derived, never stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Shop the transaction belongs to.
    pub shop_id: String,

    /// Invoice or quick sale.
    pub kind: DraftKind,

    /// Editable lines, in form order.
    pub lines: Vec<DraftLine>,

    /// Required for invoices. For sales a blank name commits as the
    /// walk-in customer.
    pub customer_name: String,

    /// Optional contact email (invoices).
    pub customer_email: Option<String>,

    /// Required for invoices; unused by sales.
    pub due_date: Option<DateTime<Utc>>,

    /// How a quick sale is paid; unused by invoices.
    pub payment_method: PaymentMethod,
}

impl TransactionDraft {
    /// Opens a new invoice draft with one empty line.
    pub fn invoice(shop_id: impl Into<String>) -> Self {
        TransactionDraft {
            shop_id: shop_id.into(),
            kind: DraftKind::Invoice,
            lines: vec![DraftLine::empty()],
            customer_name: String::new(),
            customer_email: None,
            due_date: None,
            payment_method: PaymentMethod::default(),
        }
    }

    /// Opens a new quick-sale draft with one empty line.
    pub fn sale(shop_id: impl Into<String>) -> Self {
        TransactionDraft {
            shop_id: shop_id.into(),
            kind: DraftKind::Sale,
            lines: vec![DraftLine::empty()],
            customer_name: String::new(),
            customer_email: None,
            due_date: None,
            payment_method: PaymentMethod::default(),
        }
    }

    /// Appends an empty line.
    ///
    /// Returns `false` (without growing) once the draft holds
    /// [`MAX_DRAFT_LINES`] lines.
    pub fn add_line(&mut self) -> bool {
        if self.lines.len() >= MAX_DRAFT_LINES {
            return false;
        }
        self.lines.push(DraftLine::empty());
        true
    }

    /// Removes the line at `index`.
    ///
    /// Refuses (returns `false`) when the index is out of range or when
    /// removal would leave zero lines; a draft always keeps at least one.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() || self.lines.len() == 1 {
            return false;
        }
        self.lines.remove(index);
        true
    }

    /// Sets the product of a line and re-syncs its unit price from the
    /// catalog's current price.
    ///
    /// Selecting a product with zero stock is allowed; the UI marks such
    /// options as out of stock but does not hard-block the selection; the
    /// invalidity surfaces through validation instead. An id that does
    /// not resolve leaves the price at zero.
    pub fn set_line_product(&mut self, index: usize, product_id: impl Into<String>, catalog: &Catalog) {
        if let Some(line) = self.lines.get_mut(index) {
            let product_id = product_id.into();
            line.unit_price_cents = catalog
                .get(&product_id)
                .map(|p| p.price_cents)
                .unwrap_or(0);
            line.product_id = product_id;
        }
    }

    /// Sets the quantity of a line. Any value is accepted here; validity
    /// surfaces through validation.
    pub fn set_line_quantity(&mut self, index: usize, quantity: i64) {
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity;
        }
    }

    /// Checks a single line against the catalog snapshot.
    ///
    /// Returns `false` for an out-of-range index.
    pub fn is_line_valid(&self, index: usize, catalog: &Catalog, reserved: &Reservations) -> bool {
        self.lines
            .get(index)
            .map_or(false, |line| line_check(index, line, catalog, reserved).is_none())
    }

    /// Validates the whole draft: header fields (invoices require a
    /// customer name and a due date), then every line in order.
    ///
    /// The first failure is returned; callers surface exactly one message
    /// at a time.
    pub fn validate(&self, catalog: &Catalog, reserved: &Reservations) -> CoreResult<()> {
        if self.kind == DraftKind::Invoice {
            require_non_blank("customer_name", &self.customer_name)?;
            if self.due_date.is_none() {
                return Err(crate::error::ValidationError::Required {
                    field: "due_date".to_string(),
                }
                .into());
            }
        }

        for (index, line) in self.lines.iter().enumerate() {
            if let Some(err) = line_check(index, line, catalog, reserved) {
                return Err(err);
            }
        }

        Ok(())
    }

    /// Checks whether the draft is submittable.
    pub fn is_valid(&self, catalog: &Catalog, reserved: &Reservations) -> bool {
        self.validate(catalog, reserved).is_ok()
    }

    /// Computes subtotal, tax and total at the given VAT rate.
    ///
    /// Pure and recomputed on every call from the current lines, with no
    /// caching across list mutations.
    pub fn totals(&self, vat: VatRate) -> Totals {
        let subtotal_cents: i64 = self.lines.iter().map(DraftLine::line_total_cents).sum();
        let tax_cents = Money::from_cents(subtotal_cents).calculate_vat(vat).cents();
        Totals {
            subtotal_cents,
            tax_cents,
            total_cents: subtotal_cents + tax_cents,
        }
    }
}

/// Single-line business rule check.
///
/// Rule order: product resolves → any stock available → quantity ≥ 1 →
/// quantity within available stock. `reserved` feeds the invoice-edit
/// path where the original reservation counts as available again.
fn line_check(
    index: usize,
    line: &DraftLine,
    catalog: &Catalog,
    reserved: &Reservations,
) -> Option<CoreError> {
    let product = match catalog.get(&line.product_id) {
        Some(p) => p,
        None => return Some(CoreError::UnknownProduct { line: index }),
    };

    let available = product.stock + reserved.get(&line.product_id).copied().unwrap_or(0);

    if available <= 0 {
        return Some(CoreError::OutOfStock {
            line: index,
            name: product.name.clone(),
        });
    }

    if line.quantity < 1 {
        return Some(CoreError::InvalidQuantity {
            line: index,
            quantity: line.quantity,
        });
    }

    if line.quantity > available {
        return Some(CoreError::InsufficientStock {
            line: index,
            name: product.name.clone(),
            available,
            requested: line.quantity,
        });
    }

    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            shop_id: "shop-1".to_string(),
            sku: format!("SKU-{id}"),
            name: format!("Product {id}"),
            price_cents,
            cost_cents: None,
            stock,
            min_stock: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("widget", 500, 10),
            product("gadget", 1250, 4),
            product("empty", 300, 0),
        ])
    }

    fn none() -> Reservations {
        Reservations::new()
    }

    #[test]
    fn test_new_draft_has_one_empty_line() {
        let draft = TransactionDraft::sale("shop-1");
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_id, "");
        assert_eq!(draft.lines[0].quantity, 1);
        assert_eq!(draft.lines[0].unit_price_cents, 0);
    }

    #[test]
    fn test_add_and_remove_lines() {
        let mut draft = TransactionDraft::sale("shop-1");
        assert!(draft.add_line());
        assert_eq!(draft.lines.len(), 2);

        assert!(draft.remove_line(1));
        assert_eq!(draft.lines.len(), 1);

        // Never below one line
        assert!(!draft.remove_line(0));
        assert_eq!(draft.lines.len(), 1);

        // Out-of-range index
        assert!(!draft.remove_line(5));
    }

    #[test]
    fn test_set_line_product_resyncs_price() {
        let catalog = catalog();
        let mut draft = TransactionDraft::sale("shop-1");

        draft.set_line_product(0, "widget", &catalog);
        assert_eq!(draft.lines[0].unit_price_cents, 500);

        // Switching products re-syncs to the new product's price
        draft.set_line_product(0, "gadget", &catalog);
        assert_eq!(draft.lines[0].unit_price_cents, 1250);

        // Unresolvable id leaves price at zero
        draft.set_line_product(0, "ghost", &catalog);
        assert_eq!(draft.lines[0].unit_price_cents, 0);
    }

    #[test]
    fn test_out_of_stock_selectable_but_invalid() {
        let catalog = catalog();
        let mut draft = TransactionDraft::sale("shop-1");

        draft.set_line_product(0, "empty", &catalog);
        // Selection itself goes through, with the price snapshotted
        assert_eq!(draft.lines[0].product_id, "empty");
        assert_eq!(draft.lines[0].unit_price_cents, 300);
        // ...but the line does not validate
        assert!(!draft.is_line_valid(0, &catalog, &none()));
        assert!(matches!(
            draft.validate(&catalog, &none()),
            Err(CoreError::OutOfStock { .. })
        ));
    }

    #[test]
    fn test_totals_widget_cart() {
        // One line: 3 × $5.00 at 10% VAT → $15.00 + $1.50 = $16.50
        let catalog = catalog();
        let mut draft = TransactionDraft::sale("shop-1");
        draft.set_line_product(0, "widget", &catalog);
        draft.set_line_quantity(0, 3);

        let totals = draft.totals(VatRate::from_bps(1000));
        assert_eq!(totals.subtotal_cents, 1500);
        assert_eq!(totals.tax_cents, 150);
        assert_eq!(totals.total_cents, 1650);
    }

    #[test]
    fn test_totals_recomputed_after_every_mutation() {
        let catalog = catalog();
        let vat = VatRate::from_bps(1000);
        let mut draft = TransactionDraft::sale("shop-1");

        draft.set_line_product(0, "widget", &catalog);
        draft.set_line_quantity(0, 2);
        assert_eq!(draft.totals(vat).subtotal_cents, 1000);

        draft.add_line();
        draft.set_line_product(1, "gadget", &catalog);
        assert_eq!(draft.totals(vat).subtotal_cents, 1000 + 1250);

        draft.remove_line(1);
        assert_eq!(draft.totals(vat).subtotal_cents, 1000);

        draft.set_line_quantity(0, 5);
        assert_eq!(draft.totals(vat).subtotal_cents, 2500);
    }

    #[test]
    fn test_line_validity_rules() {
        let catalog = catalog();
        let mut draft = TransactionDraft::sale("shop-1");

        // Unselected product
        assert!(!draft.is_line_valid(0, &catalog, &none()));

        draft.set_line_product(0, "widget", &catalog);
        assert!(draft.is_line_valid(0, &catalog, &none()));

        // Quantity below one
        draft.set_line_quantity(0, 0);
        assert!(!draft.is_line_valid(0, &catalog, &none()));

        // Quantity above stock
        draft.set_line_quantity(0, 11);
        assert!(!draft.is_line_valid(0, &catalog, &none()));
        assert!(matches!(
            draft.validate(&catalog, &none()),
            Err(CoreError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            })
        ));

        // At the limit is fine
        draft.set_line_quantity(0, 10);
        assert!(draft.is_line_valid(0, &catalog, &none()));
    }

    #[test]
    fn test_invoice_requires_customer_and_due_date() {
        let catalog = catalog();
        let mut draft = TransactionDraft::invoice("shop-1");
        draft.set_line_product(0, "widget", &catalog);
        draft.set_line_quantity(0, 1);

        // Valid lines alone do not make an invoice submittable
        assert!(!draft.is_valid(&catalog, &none()));

        draft.customer_name = "Ada Lovelace".to_string();
        assert!(!draft.is_valid(&catalog, &none()));

        draft.due_date = Some(Utc::now());
        assert!(draft.is_valid(&catalog, &none()));

        // Whitespace-only name does not count
        draft.customer_name = "   ".to_string();
        assert!(!draft.is_valid(&catalog, &none()));
    }

    #[test]
    fn test_sale_needs_no_customer() {
        let catalog = catalog();
        let mut draft = TransactionDraft::sale("shop-1");
        draft.set_line_product(0, "widget", &catalog);
        assert!(draft.is_valid(&catalog, &none()));
    }

    #[test]
    fn test_reservations_extend_available_stock() {
        // Invoice originally reserved 5 widgets; stock is now 10, so the
        // edit may consume up to 15.
        let catalog = catalog();
        let mut reserved = Reservations::new();
        reserved.insert("widget".to_string(), 5);

        let mut draft = TransactionDraft::invoice("shop-1");
        draft.customer_name = "Ada".to_string();
        draft.due_date = Some(Utc::now());
        draft.set_line_product(0, "widget", &catalog);

        draft.set_line_quantity(0, 12);
        assert!(draft.is_valid(&catalog, &reserved));

        draft.set_line_quantity(0, 15);
        assert!(draft.is_valid(&catalog, &reserved));

        draft.set_line_quantity(0, 16);
        assert!(!draft.is_valid(&catalog, &reserved));
    }

    #[test]
    fn test_reservation_rescues_zero_stock_line_on_edit() {
        // Product fully reserved by the invoice being edited: stock shows
        // 0 but the edit can still keep it.
        let catalog = Catalog::new(vec![product("widget", 500, 0)]);
        let mut reserved = Reservations::new();
        reserved.insert("widget".to_string(), 2);

        let mut draft = TransactionDraft::invoice("shop-1");
        draft.customer_name = "Ada".to_string();
        draft.due_date = Some(Utc::now());
        draft.set_line_product(0, "widget", &catalog);
        draft.set_line_quantity(0, 2);

        assert!(draft.is_valid(&catalog, &reserved));
        assert!(!draft.is_valid(&catalog, &none()));
    }

    #[test]
    fn test_line_cap() {
        let mut draft = TransactionDraft::sale("shop-1");
        for _ in 1..MAX_DRAFT_LINES {
            assert!(draft.add_line());
        }
        assert_eq!(draft.lines.len(), MAX_DRAFT_LINES);
        assert!(!draft.add_line());
    }
}
