//! Common shape of message-driven report jobs.

use std::future::Future;
use std::time::Instant;

use serde::Serialize;
use tracing::Instrument;

/// Outcome of one job invocation. There is no transient-failure code: every
/// error is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Success,
    PermanentFailure,
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultCode::Success => write!(f, "success"),
            ResultCode::PermanentFailure => write!(f, "permanent_failure"),
        }
    }
}

/// A job that consumes one string message.
///
/// Implementations handle their own errors inside `process_job` and report
/// the outcome as a [`ResultCode`]; callers go through [`run_job`].
pub trait ReportJob: Send + Sync {
    fn name(&self) -> &'static str;

    fn process_job(&self, message: &str) -> impl Future<Output = ResultCode> + Send;
}

/// Runs one message through `job` inside a tracing span and logs the outcome.
pub async fn run_job<J: ReportJob>(job: &J, message: &str) -> ResultCode {
    let span = tracing::info_span!("report_job", job = job.name(), job_message = message);

    async move {
        let started = Instant::now();
        tracing::info!("job started");

        let result = job.process_job(message).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            ResultCode::Success => tracing::info!(elapsed_ms, %result, "job finished"),
            ResultCode::PermanentFailure => tracing::warn!(elapsed_ms, %result, "job failed"),
        }
        result
    }
    .instrument(span)
    .await
}
