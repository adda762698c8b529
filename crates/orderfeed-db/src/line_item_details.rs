//! Database operations for `line_item_details`.
//!
//! Each row is a denormalized JSONB document keyed by a text `id` and looked
//! up by `(partition_key, order_id)`. Rows are overwritten in place on
//! reprocessing; there is no version history.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `line_item_details` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineItemDetailRow {
    pub id: String,
    pub partition_key: String,
    pub order_id: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lists up to `limit` documents stored for an order, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_line_item_details(
    pool: &PgPool,
    partition_key: &str,
    order_id: &str,
    limit: i64,
) -> Result<Vec<LineItemDetailRow>, DbError> {
    let rows = sqlx::query_as::<_, LineItemDetailRow>(
        "SELECT id, partition_key, order_id, data, created_at, updated_at \
         FROM line_item_details \
         WHERE partition_key = $1 AND order_id = $2 \
         ORDER BY created_at, id \
         LIMIT $3",
    )
    .bind(partition_key)
    .bind(order_id)
    .bind(limit.max(1))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches the document stored for an order, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_line_item_detail(
    pool: &PgPool,
    partition_key: &str,
    order_id: &str,
) -> Result<Option<LineItemDetailRow>, DbError> {
    let mut rows = find_line_item_details(pool, partition_key, order_id, 1).await?;
    Ok(rows.pop())
}

/// Inserts or overwrites a document.
///
/// When `id` is `None` or empty a fresh UUID is minted and a new row is
/// inserted; otherwise the row with that `id` is replaced. The unique index
/// on `(partition_key, order_id)` rejects a second document for the same
/// order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails, including unique
/// violations.
pub async fn upsert_line_item_detail(
    pool: &PgPool,
    id: Option<&str>,
    partition_key: &str,
    order_id: &str,
    data: &serde_json::Value,
) -> Result<LineItemDetailRow, DbError> {
    let id = match id.map(str::trim) {
        Some(existing) if !existing.is_empty() => existing.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };

    let row = sqlx::query_as::<_, LineItemDetailRow>(
        "INSERT INTO line_item_details (id, partition_key, order_id, data) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE \
         SET partition_key = EXCLUDED.partition_key, \
             order_id = EXCLUDED.order_id, \
             data = EXCLUDED.data, \
             updated_at = NOW() \
         RETURNING id, partition_key, order_id, data, created_at, updated_at",
    )
    .bind(&id)
    .bind(partition_key)
    .bind(order_id)
    .bind(data)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
