//! # Supply Repository
//!
//! Database operations for supply orders (stock inflow).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillbook_core::{Supply, SupplyItem, SupplyStatus};

/// Flat supply row, composed with items into a domain `Supply`.
#[derive(Debug, sqlx::FromRow)]
struct SupplyRow {
    id: String,
    shop_id: String,
    supplier_name: String,
    status: SupplyStatus,
    created_at: DateTime<Utc>,
    received_at: Option<DateTime<Utc>>,
}

impl SupplyRow {
    fn into_supply(self, items: Vec<SupplyItem>) -> Supply {
        Supply {
            id: self.id,
            shop_id: self.shop_id,
            supplier_name: self.supplier_name,
            status: self.status,
            created_at: self.created_at,
            received_at: self.received_at,
            items,
        }
    }
}

/// Repository for supply database operations.
#[derive(Debug, Clone)]
pub struct SupplyRepository {
    pool: SqlitePool,
}

impl SupplyRepository {
    /// Creates a new SupplyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplyRepository { pool }
    }

    /// Inserts a supply order with its items.
    pub async fn insert(&self, supply: &Supply) -> DbResult<()> {
        debug!(id = %supply.id, supplier = %supply.supplier_name, "Inserting supply");

        sqlx::query(
            r#"
            INSERT INTO supplies (
                id, shop_id, supplier_name, status, created_at, received_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supply.id)
        .bind(&supply.shop_id)
        .bind(&supply.supplier_name)
        .bind(supply.status)
        .bind(supply.created_at)
        .bind(supply.received_at)
        .execute(&self.pool)
        .await?;

        for (position, item) in supply.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO supply_items (
                    id, supply_id, product_id, quantity, unit_cost_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&supply.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_cost_cents)
            .bind(position as i64)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Gets a supply order (with items) by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supply>> {
        let row = sqlx::query_as::<_, SupplyRow>(
            r#"
            SELECT id, shop_id, supplier_name, status, created_at, received_at
            FROM supplies
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = sqlx::query_as::<_, SupplyItem>(
                    r#"
                    SELECT product_id, quantity, unit_cost_cents
                    FROM supply_items
                    WHERE supply_id = ?1
                    ORDER BY position
                    "#,
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

                Ok(Some(row.into_supply(items)))
            }
            None => Ok(None),
        }
    }

    /// Marks an ordered supply as received.
    ///
    /// Guarded in SQL: only applies while status is 'ordered', so a
    /// supply can never be received twice.
    pub async fn mark_received(&self, id: &str, received_at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Marking supply received");

        let result = sqlx::query(
            r#"
            UPDATE supplies SET
                status = 'received',
                received_at = ?2
            WHERE id = ?1 AND status = 'ordered'
            "#,
        )
        .bind(id)
        .bind(received_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supply (ordered)", id));
        }

        Ok(())
    }
}
