//! # Domain Types
//!
//! Core domain types used throughout Tillbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  invoice_number │   │  sale_number    │       │
//! │  │  price_cents    │   │  status         │   │  payment_method │       │
//! │  │  stock          │   │  total_cents    │   │  invoice_id     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    VatRate      │   │  InvoiceStatus  │   │     Supply      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Pending        │   │  Ordered        │       │
//! │  │  1000 = 10%     │   │  Paid / Overdue │   │  Received       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID: (sku, invoice_number, sale_number) - human-readable

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_VAT_RATE_BPS;

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the default shop rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRate(u32);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Creates a VAT rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        VatRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero VAT rate.
    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate::zero()
    }
}

// =============================================================================
// Shop
// =============================================================================

/// A shop (tenant). Every other entity carries a `shop_id` pointing here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shop {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name of the shop.
    pub name: String,

    /// Configured VAT rate in basis points. `None` means the shop uses
    /// the system default.
    pub vat_rate_bps: Option<u32>,

    /// ISO 4217 currency code, display-only.
    pub currency: String,

    /// When the shop was created.
    pub created_at: DateTime<Utc>,
}

impl Shop {
    /// Effective VAT rate: the configured rate, or the system default
    /// (10%) when none is set.
    pub fn vat_rate(&self) -> VatRate {
        VatRate::from_bps(self.vat_rate_bps.unwrap_or(DEFAULT_VAT_RATE_BPS))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in a shop's catalog.
///
/// `stock` is the only field the transaction engine ever mutates; all
/// other fields change through catalog administration or supply receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shop this product belongs to.
    pub shop_id: String,

    /// Stock Keeping Unit - business identifier, unique per shop.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Sale unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Unit cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,

    /// Current stock level. Never driven negative by a commit.
    pub stock: i64,

    /// Advisory low-stock threshold. `None` disables the signal.
    pub min_stock: Option<i64>,

    /// Optional category association.
    pub category_id: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit cost as a Money type, when known.
    #[inline]
    pub fn cost(&self) -> Option<Money> {
        self.cost_cents.map(Money::from_cents)
    }

    /// Checks if any stock is available.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Checks if the product is at or below its low-stock threshold.
    /// Products without a threshold never report low.
    pub fn is_low_stock(&self) -> bool {
        match self.min_stock {
            Some(min) => self.stock <= min,
            None => false,
        }
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle status of an invoice.
///
/// A flat enum settable by explicit user action; `paid_at` is maintained
/// on the transition into `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Awaiting payment.
    Pending,
    /// Payment received.
    Paid,
    /// Past its due date without payment.
    Overdue,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a quick sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment.
    Card,
    /// Mobile money payment.
    Mobile,
    /// Direct bank transfer.
    BankTransfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Supply Status
// =============================================================================

/// Lifecycle status of a supply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    /// Placed with the supplier, not yet delivered.
    Ordered,
    /// Delivered; stock has been incremented. Terminal.
    Received,
    /// Cancelled before delivery. Terminal.
    Cancelled,
}

impl Default for SupplyStatus {
    fn default() -> Self {
        SupplyStatus::Ordered
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A persisted line item of an invoice or sale.
/// Uses the snapshot pattern to freeze product data at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub product_id: String,
    /// SKU at commit time (frozen).
    pub sku_snapshot: String,
    /// Product name at commit time (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at commit time (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total before tax (unit_price × quantity).
    pub line_total_cents: i64,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A customer invoice with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub shop_id: String,
    /// Business number in the form `INV-NNNNNN`.
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: InvoiceStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Set exactly when status transitions to `Paid`.
    pub paid_at: Option<DateTime<Utc>>,
    pub items: Vec<TransactionItem>,
}

impl Invoice {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the tax as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total quantity this invoice currently reserves per product.
    ///
    /// Used when editing: the stock an edit may consume is the product's
    /// current stock plus whatever this invoice had already taken.
    pub fn reservations(&self) -> HashMap<String, i64> {
        let mut reserved: HashMap<String, i64> = HashMap::new();
        for item in &self.items {
            *reserved.entry(item.product_id.clone()).or_insert(0) += item.quantity;
        }
        reserved
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A quick (point-of-sale) sale with its line items.
///
/// Sales are never edited after creation; they can be converted to an
/// invoice exactly once, recorded via `invoice_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub shop_id: String,
    /// Business number in the form `SALE-NNNNNN`.
    pub sale_number: String,
    /// Defaults to "Walk-in Customer" when not supplied.
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    /// One-way link set when the sale is converted to an invoice.
    /// Never cleared once set.
    pub invoice_id: Option<String>,
    pub items: Vec<TransactionItem>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Checks whether this sale was already converted to an invoice.
    #[inline]
    pub fn is_converted(&self) -> bool {
        self.invoice_id.is_some()
    }
}

// =============================================================================
// Supply
// =============================================================================

/// One line of a supply order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SupplyItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit cost in cents agreed with the supplier.
    pub unit_cost_cents: i64,
}

/// A supply order: stock inflow from a supplier.
///
/// Receiving an `Ordered` supply adds each item's quantity to the
/// product's stock, exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    pub id: String,
    pub shop_id: String,
    pub supplier_name: String,
    pub status: SupplyStatus,
    pub created_at: DateTime<Utc>,
    /// Set when the supply transitions to `Received`.
    pub received_at: Option<DateTime<Utc>>,
    pub items: Vec<SupplyItem>,
}

// =============================================================================
// Transaction
// =============================================================================

/// Either committed transaction kind, as returned by the commit engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    Invoice(Invoice),
    Sale(Sale),
}

impl Transaction {
    /// The transaction's UUID.
    pub fn id(&self) -> &str {
        match self {
            Transaction::Invoice(inv) => &inv.id,
            Transaction::Sale(sale) => &sale.id,
        }
    }

    /// The human-facing business number.
    pub fn number(&self) -> &str {
        match self {
            Transaction::Invoice(inv) => &inv.invoice_number,
            Transaction::Sale(sale) => &sale.sale_number,
        }
    }

    /// The grand total in cents.
    pub fn total_cents(&self) -> i64 {
        match self {
            Transaction::Invoice(inv) => inv.total_cents,
            Transaction::Sale(sale) => sale.total_cents,
        }
    }

    /// The committed line items.
    pub fn items(&self) -> &[TransactionItem] {
        match self {
            Transaction::Invoice(inv) => &inv.items,
            Transaction::Sale(sale) => &sale.items,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, quantity: i64) -> TransactionItem {
        TransactionItem {
            id: format!("item-{product_id}-{quantity}"),
            product_id: product_id.to_string(),
            sku_snapshot: format!("SKU-{product_id}"),
            name_snapshot: format!("Product {product_id}"),
            unit_price_cents: 500,
            quantity,
            line_total_cents: 500 * quantity,
        }
    }

    #[test]
    fn test_vat_rate_from_bps() {
        let rate = VatRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_vat_rate_from_percentage() {
        let rate = VatRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_shop_vat_rate_defaults() {
        let shop = Shop {
            id: "shop-1".to_string(),
            name: "Corner Store".to_string(),
            vat_rate_bps: None,
            currency: "USD".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(shop.vat_rate().bps(), crate::DEFAULT_VAT_RATE_BPS);

        let configured = Shop {
            vat_rate_bps: Some(2000),
            ..shop
        };
        assert_eq!(configured.vat_rate().bps(), 2000);
    }

    #[test]
    fn test_product_low_stock() {
        let mut product = Product {
            id: "p1".to_string(),
            shop_id: "shop-1".to_string(),
            sku: "WIDGET-1".to_string(),
            name: "Widget".to_string(),
            price_cents: 500,
            cost_cents: Some(300),
            stock: 3,
            min_stock: Some(5),
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
        assert!(product.in_stock());

        product.min_stock = None;
        assert!(!product.is_low_stock());

        product.stock = 0;
        assert!(!product.in_stock());
    }

    #[test]
    fn test_invoice_reservations_sum_per_product() {
        let invoice = Invoice {
            id: "inv-1".to_string(),
            shop_id: "shop-1".to_string(),
            invoice_number: "INV-000001".to_string(),
            customer_name: "Ada".to_string(),
            customer_email: None,
            status: InvoiceStatus::Pending,
            subtotal_cents: 0,
            tax_cents: 0,
            total_cents: 0,
            due_date: Utc::now(),
            created_at: Utc::now(),
            paid_at: None,
            items: vec![item("p1", 2), item("p2", 4), item("p1", 3)],
        };

        let reserved = invoice.reservations();
        assert_eq!(reserved.get("p1"), Some(&5));
        assert_eq!(reserved.get("p2"), Some(&4));
        assert_eq!(reserved.get("p3"), None);
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Pending);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(SupplyStatus::default(), SupplyStatus::Ordered);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");

        let parsed: InvoiceStatus = serde_json::from_str("\"overdue\"").unwrap();
        assert_eq!(parsed, InvoiceStatus::Overdue);
    }
}
