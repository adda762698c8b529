use orderfeed_commerce::CommerceError;
use orderfeed_db::DbError;
use thiserror::Error;

/// Failures of a [`crate::LineItemDetailStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can go wrong while processing one job message.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job message: {0}")]
    InvalidMessage(String),

    #[error("order {order_id} has no FromCompanyID; cannot resolve buyer")]
    MissingBuyer { order_id: String },

    #[error("order {order_id} has a calculate response without {missing}")]
    IncompleteTaxCalculation {
        order_id: String,
        missing: &'static str,
    },

    #[error("commerce API call failed: {0}")]
    Commerce(#[from] CommerceError),

    #[error("document store failed: {0}")]
    Store(#[from] StoreError),
}
