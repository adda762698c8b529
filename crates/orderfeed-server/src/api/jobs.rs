use axum::{extract::State, Extension, Json};
use orderfeed_jobs::{run_job, ResultCode};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Job trigger body: `{"message": "<order id>"}`.
#[derive(Debug, Deserialize)]
pub(super) struct JobMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct JobOutcome {
    result: ResultCode,
}

pub(super) async fn receive_recent_line_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<JobMessage>,
) -> Result<Json<ApiResponse<JobOutcome>>, ApiError> {
    tracing::info!(request_id = %req_id.0, order_id = %body.message, "job requested");

    match run_job(state.job.as_ref(), &body.message).await {
        ResultCode::Success => Ok(Json(ApiResponse {
            data: JobOutcome {
                result: ResultCode::Success,
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        ResultCode::PermanentFailure => Err(ApiError::new(
            req_id.0,
            "permanent_failure",
            format!("receive_recent_line_items failed for message '{}'", body.message),
        )),
    }
}
