//! One-shot job runs from the command line.

use std::sync::Arc;

use clap::Subcommand;
use orderfeed_commerce::{CommerceClient, CommerceSettings};
use orderfeed_jobs::{run_job, ReceiveRecentLineItemsJob, ResultCode};

/// Sub-commands available under `job`.
#[derive(Debug, Subcommand)]
pub enum JobCommands {
    /// Build and store the line item detail document for one order
    ReceiveLineItems {
        /// Incoming order ID
        order_id: String,
    },
}

/// Runs the receive-recent-line-items job for `order_id`.
///
/// # Errors
///
/// Returns an error if the commerce client cannot be configured, or if the
/// job reports a permanent failure (so the process exits non-zero).
pub(crate) async fn run_receive_line_items(
    pool: sqlx::PgPool,
    config: &orderfeed_core::AppConfig,
    order_id: &str,
) -> anyhow::Result<()> {
    let settings = CommerceSettings::from_app_config(config)?;
    let commerce = Arc::new(CommerceClient::new(&settings)?);
    let job = ReceiveRecentLineItemsJob::new(commerce, pool);

    tracing::info!(order_id, api_url = %settings.api_url, "running receive_recent_line_items");

    match run_job(&job, order_id).await {
        ResultCode::Success => {
            println!("{order_id}: {}", ResultCode::Success);
            Ok(())
        }
        ResultCode::PermanentFailure => {
            tracing::warn!(order_id, "job reported a permanent failure; see errors above");
            anyhow::bail!("{order_id}: {}", ResultCode::PermanentFailure)
        }
    }
}
