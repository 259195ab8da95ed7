//! Job handles, statuses and results.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::ResultPaths;

/// A remote endpoint jobs are submitted to.
///
/// Besides the identifier, an endpoint knows where its completed output keeps
/// the result reference, so a handle alone is enough to finish a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    id: String,
    #[serde(default)]
    result_paths: ResultPaths,
}

impl Endpoint {
    /// Create an endpoint using the default result paths.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result_paths: ResultPaths::default(),
        }
    }

    /// Replace the ordered list of result paths.
    #[must_use]
    pub fn with_result_paths(mut self, paths: ResultPaths) -> Self {
        self.result_paths = paths;
        self
    }

    /// The endpoint identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where to look for the result in a completed job's output.
    #[must_use]
    pub const fn result_paths(&self) -> &ResultPaths {
        &self.result_paths
    }
}

/// A submitted job.
///
/// Serializable so that a caller which hit a deadline can store the handle
/// and resume polling later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    endpoint: Endpoint,
    job_id: String,
}

impl JobHandle {
    /// Create a handle for an existing job.
    #[must_use]
    pub fn new(endpoint: Endpoint, job_id: impl Into<String>) -> Self {
        Self {
            endpoint,
            job_id: job_id.into(),
        }
    }

    /// The endpoint the job runs on.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The opaque job identifier.
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

/// Lifecycle state of a remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting for a worker.
    Queued,
    /// A worker is running the job.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
    /// Missing or unrecognized status value.
    Unknown,
}

impl JobStatus {
    /// Parse a provider status string.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IN_QUEUE" | "QUEUED" => Self::Queued,
            "IN_PROGRESS" | "RUNNING" => Self::InProgress,
            "COMPLETED" => Self::Completed,
            "FAILED" | "TIMED_OUT" => Self::Failed,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Provider wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "IN_QUEUE",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// No further transitions happen from a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// The job this result belongs to.
    pub job_id: String,
    /// Interpreted status.
    pub status: JobStatus,
    /// Status string exactly as the provider sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_status: Option<String>,
    /// Result reference (usually a URL) of a completed job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_ref: Option<String>,
    /// Raw provider output payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Provider error message of a failed or cancelled job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time the job spent queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_time: Option<Duration>,
    /// Time the job spent executing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<Duration>,
}

impl JobResult {
    /// Build a result from a status response body.
    ///
    /// Does not extract the result reference; see
    /// [`ResultPaths::extract`](crate::extract::ResultPaths::extract).
    #[must_use]
    pub fn from_response(job_id: impl Into<String>, body: &Value) -> Self {
        let raw_status = body.get("status").and_then(Value::as_str).map(String::from);
        let status = raw_status
            .as_deref()
            .map_or(JobStatus::Unknown, JobStatus::from_wire);
        let output = body.get("output").filter(|v| !v.is_null()).cloned();

        let error = if matches!(status, JobStatus::Failed | JobStatus::Cancelled) {
            error_message(body)
        } else {
            None
        };

        Self {
            job_id: job_id.into(),
            status,
            raw_status,
            result_ref: None,
            output,
            error,
            delay_time: millis(body, "delayTime"),
            execution_time: millis(body, "executionTime"),
        }
    }

    /// Whether the job has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// The handler's own error wins over the platform-level one.
fn error_message(body: &Value) -> Option<String> {
    body.get("output")
        .and_then(|output| output.get("error"))
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(String::from)
}

fn millis(body: &Value, key: &str) -> Option<Duration> {
    body.get(key).and_then(Value::as_u64).map(Duration::from_millis)
}
