#![cfg_attr(docsrs, feature(doc_cfg))]
//! Pixjob drives long-running jobs on serverless image generation endpoints.
//!
//! A job goes through three steps:
//!
//! 1. [`JobClient::submit`] creates it and returns a [`JobHandle`].
//! 2. [`JobClient::poll_until_terminal`] polls on a [`BackoffSchedule`] until the
//!    job completes, fails, or the caller's deadline passes.
//! 3. The result reference is extracted from the provider output using the
//!    endpoint's [`ResultPaths`].
//!
//! [`JobClient::query_status_once`] performs a single status check for callers
//! that want to drive polling themselves, e.g. after an [`Error::Timeout`].
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use pixjob::{BackoffSchedule, ClientConfig, Endpoint, JobClient};
//!
//! let client = JobClient::new(&ClientConfig::new("rp_...")?)?;
//! let endpoint = Endpoint::new("seedream-v4-t2i");
//! let handle = client.submit(&endpoint, serde_json::json!({ "prompt": "a fox" })).await?;
//! let result = client
//!     .poll_until_terminal(&handle, &BackoffSchedule::default(), Duration::from_secs(300))
//!     .await?;
//! println!("{:?}", result.result_ref);
//! ```

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod job;
pub mod transport;

pub use backoff::{BackoffSchedule, RetryPolicy};
pub use client::JobClient;
pub use config::{ClientConfig, ClientConfigBuilder, RUNPOD_API_BASE_URL};
pub use error::{Error, ProtocolError, Result, TransportError, TransportErrorKind};
pub use extract::ResultPaths;
pub use job::{Endpoint, JobHandle, JobResult, JobStatus};
pub use transport::{HttpTransport, JobTransport};
