//! The job lifecycle client: submit, poll until terminal, query once, cancel.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::backoff::{BackoffSchedule, RetryPolicy};
use crate::config::{ClientConfig, DEFAULT_MAX_UNKNOWN_STATUSES};
use crate::error::{Error, ProtocolError, Result};
use crate::job::{Endpoint, JobHandle, JobResult, JobStatus};
use crate::transport::{HttpTransport, JobTransport};

/// Client driving remote jobs from submission to a terminal state.
///
/// Cheap to clone; clones share the transport. Each poll sequence keeps its
/// own state on the stack, so independent jobs can be polled concurrently
/// from separate tasks. Dropping a [`poll_until_terminal`](Self::poll_until_terminal)
/// future abandons the sequence without touching the remote job.
#[derive(Debug)]
pub struct JobClient<T = HttpTransport> {
    transport: Arc<T>,
    retry: RetryPolicy,
    max_unknown_statuses: u32,
}

impl<T> Clone for JobClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            retry: self.retry,
            max_unknown_statuses: self.max_unknown_statuses,
        }
    }
}

impl JobClient<HttpTransport> {
    /// Create a client talking HTTP to the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP transport cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?)
            .with_retry_policy(config.retry())
            .with_max_unknown_statuses(config.max_unknown_statuses()))
    }
}

impl<T: JobTransport> JobClient<T> {
    /// Create a client over any transport, with default retry settings.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            retry: RetryPolicy::default(),
            max_unknown_statuses: DEFAULT_MAX_UNKNOWN_STATUSES,
        }
    }

    /// Set the retry policy for status fetches.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set how many unrecognized statuses in a row are tolerated.
    #[must_use]
    pub const fn with_max_unknown_statuses(mut self, max: u32) -> Self {
        self.max_unknown_statuses = max;
        self
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a job and return its handle.
    ///
    /// The input is forwarded as-is. Submission is never retried, since a
    /// retried submission could start a second job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the call fails and
    /// [`ProtocolError::MissingJobId`] if the response has no job id.
    pub async fn submit(&self, endpoint: &Endpoint, input: Value) -> Result<JobHandle> {
        info!(endpoint = endpoint.id(), "submitting job");

        let body = self.transport.run(endpoint.id(), &input).await?;
        let job_id = body
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(ProtocolError::MissingJobId)?;

        info!(endpoint = endpoint.id(), job_id, "job submitted");
        Ok(JobHandle::new(endpoint.clone(), job_id))
    }

    /// Fetch the job status once, without waiting or retrying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the call fails, and
    /// [`ProtocolError::NoResult`] if the job completed without an extractable result.
    pub async fn query_status_once(&self, handle: &JobHandle) -> Result<JobResult> {
        let body = self
            .transport
            .status(handle.endpoint().id(), handle.job_id())
            .await?;
        let result = finish(handle, &body)?;
        debug!(job_id = handle.job_id(), status = %result.status, "status queried");
        Ok(result)
    }

    /// Poll until the job reaches a terminal state or the deadline passes.
    ///
    /// The first poll happens immediately. After each non-terminal poll the
    /// client checks the deadline, then sleeps `schedule.delay_for_poll(n)`
    /// where `n` counts the non-terminal polls so far.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] when the elapsed time exceeds `deadline` while the
    ///   job is still running; the error carries the handle for resuming.
    /// - [`Error::Transport`] when a status fetch fails on every attempt allowed
    ///   by the retry policy, or fails in a way that cannot be retried.
    /// - [`Error::Protocol`] on a completed job without a result, or on too many
    ///   consecutive unrecognized statuses.
    pub async fn poll_until_terminal(
        &self,
        handle: &JobHandle,
        schedule: &BackoffSchedule,
        deadline: Duration,
    ) -> Result<JobResult> {
        let started = Instant::now();
        let job_id = handle.job_id();
        let mut polls = 0usize;
        let mut unknown_streak = 0u32;

        info!(job_id, deadline_secs = deadline.as_secs_f64(), "polling job");

        loop {
            let body = self.fetch_status(handle).await?;
            let result = finish(handle, &body)?;
            let elapsed = started.elapsed();

            debug!(
                job_id,
                poll = polls + 1,
                status = %result.status,
                elapsed_secs = elapsed.as_secs_f64(),
                "poll"
            );

            match result.status {
                JobStatus::Completed => {
                    info!(job_id, polls = polls + 1, "job completed");
                    return Ok(result);
                }
                JobStatus::Failed | JobStatus::Cancelled => {
                    error!(job_id, status = %result.status, error = ?result.error, "job ended without result");
                    return Ok(result);
                }
                JobStatus::Unknown => {
                    unknown_streak += 1;
                    if unknown_streak > self.max_unknown_statuses {
                        return Err(ProtocolError::UnrecognizedStatus {
                            status: result.raw_status,
                            occurrences: unknown_streak,
                        }
                        .into());
                    }
                    warn!(job_id, raw_status = ?result.raw_status, streak = unknown_streak, "unrecognized status");
                }
                JobStatus::Queued | JobStatus::InProgress => unknown_streak = 0,
            }

            if elapsed > deadline {
                warn!(job_id, elapsed_secs = elapsed.as_secs_f64(), "deadline exceeded");
                return Err(Error::Timeout {
                    handle: handle.clone(),
                    last_status: result.status,
                    elapsed,
                });
            }

            sleep(schedule.delay_for_poll(polls)).await;
            polls += 1;
        }
    }

    /// Ask the provider to cancel the job and return the status it reports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the call fails.
    pub async fn cancel(&self, handle: &JobHandle) -> Result<JobStatus> {
        let body = self
            .transport
            .cancel(handle.endpoint().id(), handle.job_id())
            .await?;
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .map_or(JobStatus::Unknown, JobStatus::from_wire);
        info!(job_id = handle.job_id(), %status, "cancel requested");
        Ok(status)
    }

    /// One status fetch with bounded retry of transient transport failures.
    async fn fetch_status(&self, handle: &JobHandle) -> Result<Value> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self
                .transport
                .status(handle.endpoint().id(), handle.job_id())
                .await
            {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && self.retry.allows_retry(attempts) => {
                    warn!(
                        job_id = handle.job_id(),
                        attempt = attempts,
                        max_attempts = self.retry.max_attempts,
                        error = %err,
                        "status fetch failed, retrying"
                    );
                    sleep(self.retry.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Turn a status body into a result, extracting the reference of a completed job.
fn finish(handle: &JobHandle, body: &Value) -> Result<JobResult> {
    let mut result = JobResult::from_response(handle.job_id(), body);
    if result.status == JobStatus::Completed {
        let paths = handle.endpoint().result_paths();
        let output = result.output.as_ref().ok_or_else(|| paths.no_result())?;
        result.result_ref = Some(paths.extract(output)?);
    }
    Ok(result)
}
