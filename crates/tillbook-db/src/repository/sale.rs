//! # Sale Repository
//!
//! Database operations for quick sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → Sale with items, totals frozen                      │
//! │                                                                         │
//! │  2. (OPTIONAL) CONVERT TO INVOICE                                      │
//! │     └── set_invoice_id() → one-way link, guarded in SQL                │
//! │                                                                         │
//! │  Sales are never edited; there is no update path for items or totals.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillbook_core::{PaymentMethod, Sale, TransactionItem};

const ITEM_COLUMNS: &str =
    "id, product_id, sku_snapshot, name_snapshot, unit_price_cents, quantity, line_total_cents";

/// Flat sale row, composed with items into a domain `Sale`.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    shop_id: String,
    sale_number: String,
    customer_name: String,
    payment_method: PaymentMethod,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    created_at: DateTime<Utc>,
    invoice_id: Option<String>,
}

impl SaleRow {
    fn into_sale(self, items: Vec<TransactionItem>) -> Sale {
        Sale {
            id: self.id,
            shop_id: self.shop_id,
            sale_number: self.sale_number,
            customer_name: self.customer_name,
            payment_method: self.payment_method,
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            total_cents: self.total_cents,
            created_at: self.created_at,
            invoice_id: self.invoice_id,
            items,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale with its items.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, number = %sale.sale_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, shop_id, sale_number, customer_name, payment_method,
                subtotal_cents, tax_cents, total_cents, created_at, invoice_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.shop_id)
        .bind(&sale.sale_number)
        .bind(&sale.customer_name)
        .bind(sale.payment_method)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .bind(&sale.invoice_id)
        .execute(&self.pool)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, sku_snapshot, name_snapshot,
                    unit_price_cents, quantity, line_total_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.sku_snapshot)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(position as i64)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Gets a sale (with items) by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, shop_id, sale_number, customer_name, payment_method,
                   subtotal_cents, tax_cents, total_cents, created_at, invoice_id
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.fetch_items(id).await?;
                Ok(Some(row.into_sale(items)))
            }
            None => Ok(None),
        }
    }

    /// Lists a shop's sales (with items), newest first.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, shop_id, sale_number, customer_name, payment_method,
                   subtotal_cents, tax_cents, total_cents, created_at, invoice_id
            FROM sales
            WHERE shop_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.fetch_items(&row.id).await?;
            sales.push(row.into_sale(items));
        }

        Ok(sales)
    }

    /// Sets the one-way sale → invoice link.
    ///
    /// Guarded in SQL: the update only applies while `invoice_id` is
    /// NULL, so a second conversion can never overwrite the first.
    pub async fn set_invoice_id(&self, sale_id: &str, invoice_id: &str) -> DbResult<()> {
        debug!(sale_id = %sale_id, invoice_id = %invoice_id, "Linking sale to invoice");

        let result = sqlx::query(
            r#"
            UPDATE sales SET invoice_id = ?2
            WHERE id = ?1 AND invoice_id IS NULL
            "#,
        )
        .bind(sale_id)
        .bind(invoice_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "no such sale" from "already converted"
            return match self.get_by_id(sale_id).await? {
                Some(_) => Err(DbError::duplicate("sale invoice link", sale_id)),
                None => Err(DbError::not_found("Sale", sale_id)),
            };
        }

        Ok(())
    }

    async fn fetch_items(&self, sale_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY position"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
