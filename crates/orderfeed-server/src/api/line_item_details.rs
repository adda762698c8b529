use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use orderfeed_core::LINE_ITEM_DETAIL_PARTITION;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct LineItemDetailItem {
    id: String,
    order_id: String,
    partition_key: String,
    document: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(super) async fn get_line_item_detail(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<LineItemDetailItem>>, ApiError> {
    let row = orderfeed_db::get_line_item_detail(&state.pool, LINE_ITEM_DETAIL_PARTITION, &order_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no line item detail for order {order_id}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: LineItemDetailItem {
            id: row.id,
            order_id: row.order_id,
            partition_key: row.partition_key,
            document: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
