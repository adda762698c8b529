//! Background jobs that denormalize commerce data into stored documents.

pub mod assemble;
pub mod documents;
pub mod error;
pub mod job;
pub mod receive_recent_line_items;
pub mod store;

pub use documents::{
    LineItemMiscReportFields, LineItemsWithPurchaseOrderFields, OrderLineItemData,
};
pub use error::{JobError, StoreError};
pub use job::{run_job, ReportJob, ResultCode};
pub use receive_recent_line_items::ReceiveRecentLineItemsJob;
pub use store::LineItemDetailStore;
