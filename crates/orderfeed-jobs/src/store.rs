//! Persistence seam for line item detail documents.

use std::future::Future;

use sqlx::PgPool;

use crate::documents::OrderLineItemData;
use crate::error::StoreError;

/// Lookups fetch at most this many ids; two is enough to tell "exactly one"
/// apart from "ambiguous".
const LOOKUP_LIMIT: i64 = 2;

/// Where the job reads and writes line item detail documents.
pub trait LineItemDetailStore: Send + Sync {
    /// IDs of documents already stored for `order_id` in `partition_key`.
    fn find_ids_by_order(
        &self,
        partition_key: &str,
        order_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Writes the document, overwriting `id` when given, and returns the id
    /// it was stored under.
    fn upsert(
        &self,
        id: Option<&str>,
        partition_key: &str,
        order_id: &str,
        data: &OrderLineItemData,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}

impl LineItemDetailStore for PgPool {
    async fn find_ids_by_order(
        &self,
        partition_key: &str,
        order_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let rows =
            orderfeed_db::find_line_item_details(self, partition_key, order_id, LOOKUP_LIMIT)
                .await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn upsert(
        &self,
        id: Option<&str>,
        partition_key: &str,
        order_id: &str,
        data: &OrderLineItemData,
    ) -> Result<String, StoreError> {
        let document = serde_json::to_value(data)?;
        let row =
            orderfeed_db::upsert_line_item_detail(self, id, partition_key, order_id, &document)
                .await?;
        Ok(row.id)
    }
}
