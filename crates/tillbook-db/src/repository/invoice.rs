//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Composition
//! Invoice rows and item rows live in separate tables; reads fetch the
//! parent row, then the items ordered by position, and compose the
//! domain `Invoice` here. Writes insert the parent, then the items,
//! sequentially.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillbook_core::{Invoice, InvoiceStatus, TransactionItem};

const ITEM_COLUMNS: &str =
    "id, product_id, sku_snapshot, name_snapshot, unit_price_cents, quantity, line_total_cents";

/// Flat invoice row, composed with items into a domain `Invoice`.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    shop_id: String,
    invoice_number: String,
    customer_name: String,
    customer_email: Option<String>,
    status: InvoiceStatus,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    due_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<TransactionItem>) -> Invoice {
        Invoice {
            id: self.id,
            shop_id: self.shop_id,
            invoice_number: self.invoice_number,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            status: self.status,
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            total_cents: self.total_cents,
            due_date: self.due_date,
            created_at: self.created_at,
            paid_at: self.paid_at,
            items,
        }
    }
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Inserts an invoice with its items.
    pub async fn insert(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, number = %invoice.invoice_number, "Inserting invoice");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, shop_id, invoice_number, customer_name, customer_email,
                status, subtotal_cents, tax_cents, total_cents,
                due_date, created_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.shop_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_email)
        .bind(invoice.status)
        .bind(invoice.subtotal_cents)
        .bind(invoice.tax_cents)
        .bind(invoice.total_cents)
        .bind(invoice.due_date)
        .bind(invoice.created_at)
        .bind(invoice.paid_at)
        .execute(&self.pool)
        .await?;

        self.insert_items(&invoice.id, &invoice.items).await?;

        Ok(())
    }

    /// Gets an invoice (with items) by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, shop_id, invoice_number, customer_name, customer_email,
                   status, subtotal_cents, tax_cents, total_cents,
                   due_date, created_at, paid_at
            FROM invoices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.fetch_items(id).await?;
                Ok(Some(row.into_invoice(items)))
            }
            None => Ok(None),
        }
    }

    /// Lists a shop's invoices (with items), newest first.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, shop_id, invoice_number, customer_name, customer_email,
                   status, subtotal_cents, tax_cents, total_cents,
                   due_date, created_at, paid_at
            FROM invoices
            WHERE shop_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.fetch_items(&row.id).await?;
            invoices.push(row.into_invoice(items));
        }

        Ok(invoices)
    }

    /// Replaces an invoice record and its items.
    ///
    /// Items are deleted and reinserted wholesale; the commit engine has
    /// already reconciled stock for old vs new quantities.
    pub async fn update(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, "Updating invoice");

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                customer_name = ?2,
                customer_email = ?3,
                status = ?4,
                subtotal_cents = ?5,
                tax_cents = ?6,
                total_cents = ?7,
                due_date = ?8,
                paid_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_email)
        .bind(invoice.status)
        .bind(invoice.subtotal_cents)
        .bind(invoice.tax_cents)
        .bind(invoice.total_cents)
        .bind(invoice.due_date)
        .bind(invoice.paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", &invoice.id));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
            .bind(&invoice.id)
            .execute(&self.pool)
            .await?;

        self.insert_items(&invoice.id, &invoice.items).await?;

        Ok(())
    }

    /// Patches only status and paid_at.
    pub async fn set_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> DbResult<()> {
        debug!(id = %id, status = ?status, "Setting invoice status");

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = ?2,
                paid_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Deletes an invoice. Items cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting invoice");

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    async fn fetch_items(&self, invoice_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ?1 ORDER BY position"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn insert_items(&self, invoice_id: &str, items: &[TransactionItem]) -> DbResult<()> {
        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, product_id, sku_snapshot, name_snapshot,
                    unit_price_cents, quantity, line_total_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(invoice_id)
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
}
