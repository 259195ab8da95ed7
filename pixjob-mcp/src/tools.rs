//! Tool behavior, independent of the MCP wiring.
//!
//! Each operation validates its arguments, runs the job through [`JobClient`]
//! and renders the outcome. `Ok` carries a success reply, `Err` a reply that
//! should be flagged as an error to the assistant.

use pixjob::{BackoffSchedule, Endpoint, JobClient, JobResult, JobStatus};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::{self, EndpointKind};
use crate::config::ServerConfig;
use crate::params::{ApiInfoRequest, CheckJobStatusRequest, EditImageRequest, GenerateImageRequest};
use crate::render;

/// The image tools bound to one API key and pair of endpoints.
#[derive(Debug, Clone)]
pub struct ImageTools {
    client: JobClient,
    seedream: Endpoint,
    nano_banana: Endpoint,
    schedule: BackoffSchedule,
}

impl ImageTools {
    /// Create the tools over an existing client.
    #[must_use]
    pub fn new(
        client: JobClient,
        seedream_id: impl Into<String>,
        nano_banana_id: impl Into<String>,
        schedule: BackoffSchedule,
    ) -> Self {
        Self {
            client,
            seedream: EndpointKind::Seedream.endpoint(seedream_id),
            nano_banana: EndpointKind::NanoBanana.endpoint(nano_banana_id),
            schedule,
        }
    }

    /// Create the tools from server configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> pixjob::Result<Self> {
        let client = JobClient::new(&config.client)?;
        Ok(Self::new(
            client,
            config.seedream_endpoint_id.clone(),
            config.nano_banana_endpoint_id.clone(),
            config.backoff.clone(),
        ))
    }

    /// The endpoint serving a kind of job.
    #[must_use]
    pub const fn endpoint(&self, kind: EndpointKind) -> &Endpoint {
        match kind {
            EndpointKind::Seedream => &self.seedream,
            EndpointKind::NanoBanana => &self.nano_banana,
        }
    }

    /// Generate an image from text and wait for it.
    ///
    /// # Errors
    ///
    /// Returns the reply text for invalid arguments, failed jobs, timeouts and
    /// service errors.
    pub async fn generate_image(&self, request: &GenerateImageRequest) -> Result<String, String> {
        let job = request.validate().map_err(|e| render::invalid(&e))?;
        info!(size = %job.size, seed = job.seed, "generate_image");

        let result = self
            .run_job(EndpointKind::Seedream, job.input.clone(), job.deadline)
            .await?;
        Ok(render::generated(&result, &job))
    }

    /// Edit one or more images and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns the reply text for invalid arguments, failed jobs, timeouts and
    /// service errors.
    pub async fn edit_image(&self, request: &EditImageRequest) -> Result<String, String> {
        let job = request.validate().map_err(|e| render::invalid(&e))?;
        info!(
            images = request.image_urls.len(),
            resolution = %job.resolution,
            aspect_ratio = ?job.aspect_ratio,
            "edit_image"
        );

        let result = self
            .run_job(EndpointKind::NanoBanana, job.input.clone(), job.deadline)
            .await?;
        Ok(render::edited(&result, &job))
    }

    /// Report the current state of a previously submitted job.
    ///
    /// # Errors
    ///
    /// Returns the reply text for a blank job id or a failed status call.
    pub async fn check_job_status(&self, request: &CheckJobStatusRequest) -> Result<String, String> {
        let job_id = request.job_id().map_err(|e| render::invalid(&e))?;
        let kind = request.endpoint_type;
        info!(job_id, endpoint_type = %kind, "check_job_status");

        let handle = pixjob::JobHandle::new(self.endpoint(kind).clone(), job_id);
        match self.client.query_status_once(&handle).await {
            Ok(result) => Ok(render::status(kind, &result)),
            Err(err) => {
                warn!(job_id, error = %err, "status check failed");
                Err(render::failure(&err, kind, Some(job_id)))
            }
        }
    }

    /// Reference text for the image APIs.
    #[must_use]
    pub fn api_info(&self, request: &ApiInfoRequest) -> String {
        catalog::api_info(request.api)
    }

    async fn run_job(
        &self,
        kind: EndpointKind,
        input: Value,
        deadline: Duration,
    ) -> Result<JobResult, String> {
        let endpoint = self.endpoint(kind);
        let handle = self.client.submit(endpoint, input).await.map_err(|err| {
            warn!(endpoint_type = %kind, error = %err, "submit failed");
            render::failure(&err, kind, None)
        })?;

        let result = self
            .client
            .poll_until_terminal(&handle, &self.schedule, deadline)
            .await
            .map_err(|err| {
                warn!(job_id = handle.job_id(), error = %err, "job did not complete");
                render::failure(&err, kind, Some(handle.job_id()))
            })?;

        match result.status {
            JobStatus::Completed => Ok(result),
            _ => Err(render::job_failed(&result)),
        }
    }
}
