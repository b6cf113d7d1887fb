//! # Shop Repository
//!
//! Database operations for shops (tenants) and their settings. The VAT
//! rate lives here; the commit engine receives it as a plain value and
//! never reads configuration on its own.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillbook_core::Shop;

/// Repository for shop database operations.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    /// Creates a new ShopRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Gets a shop by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(
            r#"
            SELECT id, name, vat_rate_bps, currency, created_at
            FROM shops
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    /// Inserts a new shop.
    pub async fn insert(&self, shop: &Shop) -> DbResult<()> {
        debug!(id = %shop.id, name = %shop.name, "Inserting shop");

        sqlx::query(
            r#"
            INSERT INTO shops (id, name, vat_rate_bps, currency, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(shop.vat_rate_bps)
        .bind(&shop.currency)
        .bind(shop.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a shop's settings (name, VAT rate, currency).
    pub async fn update(&self, shop: &Shop) -> DbResult<()> {
        debug!(id = %shop.id, "Updating shop settings");

        let result = sqlx::query(
            r#"
            UPDATE shops SET
                name = ?2,
                vat_rate_bps = ?3,
                currency = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(shop.vat_rate_bps)
        .bind(&shop.currency)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", &shop.id));
        }

        Ok(())
    }
}
