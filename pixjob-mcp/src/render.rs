//! Plain-text replies for the assistant.
//!
//! Keeps the three failure stories apart: the job is still running (come back
//! with the job id), the job failed (here is why), or the service could not be
//! reached (try again).

use std::fmt::Write as _;

use pixjob::{Error, JobResult, JobStatus, TransportErrorKind};
use serde_json::Value;

use crate::catalog::{EndpointKind, Resolution};
use crate::params::{EditJob, GenerateJob, ValidationError};

/// Success text for a generated image.
#[must_use]
pub fn generated(result: &JobResult, job: &GenerateJob) -> String {
    let seed = output_field(result, "seed")
        .and_then(Value::as_i64)
        .unwrap_or(job.seed);
    let mut text = format!(
        "Image generated successfully.\nURL: {}\nSize: {}\nSeed: {seed}\nJob ID: {}",
        result.result_ref.as_deref().unwrap_or_default(),
        job.size,
        result.job_id
    );
    push_timings(&mut text, result);
    text
}

/// Success text for an edited image.
#[must_use]
pub fn edited(result: &JobResult, job: &EditJob) -> String {
    let mut text = format!(
        "Image edited successfully.\nURL: {}\nResolution: {}\nCost: ${:.2}\nJob ID: {}",
        result.result_ref.as_deref().unwrap_or_default(),
        job.resolution,
        job.resolution.price_usd(),
        result.job_id
    );
    if let Some(ref ratio) = job.aspect_ratio {
        let _ = write!(text, "\nAspect Ratio: {ratio}");
    }
    push_timings(&mut text, result);
    text
}

/// Text for a job that ended as FAILED or CANCELLED.
#[must_use]
pub fn job_failed(result: &JobResult) -> String {
    let reason = result.error.as_deref().unwrap_or("Unknown error");
    match result.status {
        JobStatus::Cancelled => format!("Job was cancelled: {reason}\nJob ID: {}", result.job_id),
        _ => format!("Job failed: {reason}\nJob ID: {}", result.job_id),
    }
}

/// Current state of a job for `check_job_status`.
#[must_use]
pub fn status(kind: EndpointKind, result: &JobResult) -> String {
    let job_id = &result.job_id;
    match result.status {
        JobStatus::Completed => {
            let mut text = format!(
                "Status: COMPLETED\nURL: {}\nJob ID: {job_id}",
                result.result_ref.as_deref().unwrap_or_default()
            );
            match kind {
                EndpointKind::Seedream => {
                    if let Some(seed) = output_field(result, "seed").and_then(Value::as_i64) {
                        let _ = write!(text, "\nSeed: {seed}");
                    }
                }
                EndpointKind::NanoBanana => {
                    let resolution = output_field(result, "resolution")
                        .and_then(Value::as_str)
                        .and_then(|r| r.parse::<Resolution>().ok())
                        .unwrap_or_default();
                    let _ = write!(text, "\nCost: ${:.2}", resolution.price_usd());
                }
            }
            push_timings(&mut text, result);
            text
        }
        JobStatus::Failed | JobStatus::Cancelled => format!(
            "Status: {}\nError: {}\nJob ID: {job_id}",
            result.status,
            result.error.as_deref().unwrap_or("Unknown error")
        ),
        JobStatus::Queued | JobStatus::InProgress => format!(
            "Status: {}\nThe job is still processing. Check again in a few seconds.\nJob ID: {job_id}",
            result.status
        ),
        JobStatus::Unknown => format!(
            "Status: {}\nJob ID: {job_id}",
            result.raw_status.as_deref().unwrap_or("UNKNOWN")
        ),
    }
}

/// Text for rejected arguments.
#[must_use]
pub fn invalid(err: &ValidationError) -> String {
    let mut chars = err.to_string();
    if let Some(first) = chars.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    chars
}

/// Text for a failed lifecycle call.
///
/// `job_id` is the id of an already submitted job, if there is one.
#[must_use]
pub fn failure(err: &Error, kind: EndpointKind, job_id: Option<&str>) -> String {
    let mut text = match err {
        Error::Timeout {
            handle,
            last_status,
            elapsed,
        } => {
            return format!(
                "Timeout: job {} is still {last_status} after {}s.\n\
                 The job keeps running. Use check_job_status with job_id '{}' and endpoint_type '{kind}' to check progress.",
                handle.job_id(),
                elapsed.as_secs(),
                handle.job_id(),
            );
        }
        Error::Transport(t) => match t.kind {
            TransportErrorKind::Unauthorized => {
                "Error: the Runpod API key was rejected. Check RUNPOD_API_KEY.".to_string()
            }
            TransportErrorKind::NotFound => match job_id {
                Some(id) => format!(
                    "Error: job '{id}' was not found. Verify the job id and endpoint_type '{kind}'."
                ),
                None => format!("Error: endpoint for '{kind}' was not found. Check the endpoint id configuration."),
            },
            _ => format!("Error: could not reach the image service ({t}). Please try again."),
        },
        Error::Protocol(p) => format!("Error: unexpected response from the image service: {p}"),
        other => format!("Error: {other}"),
    };
    if let Some(id) = job_id {
        let _ = write!(text, "\nJob ID: {id}");
    }
    text
}

/// Queue and execution time reported by the provider, one line each.
fn push_timings(text: &mut String, result: &JobResult) {
    if let Some(delay) = result.delay_time {
        let _ = write!(text, "\nQueue time: {:.1}s", delay.as_secs_f64());
    }
    if let Some(execution) = result.execution_time {
        let _ = write!(text, "\nExecution time: {:.1}s", execution.as_secs_f64());
    }
}

fn output_field<'a>(result: &'a JobResult, key: &str) -> Option<&'a Value> {
    result.output.as_ref().and_then(|o| o.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixjob::{Endpoint, JobHandle, ProtocolError, TransportError};
    use serde_json::json;
    use std::time::Duration;

    fn result(body: Value) -> JobResult {
        JobResult::from_response("job-42", &body)
    }

    fn completed(output: Value) -> JobResult {
        let mut r = result(json!({ "status": "COMPLETED", "output": output }));
        r.result_ref = Some("https://cdn.example.com/img.png".into());
        r
    }

    #[test]
    fn test_generated_prefers_output_seed() {
        let job = crate::params::GenerateImageRequest {
            prompt: "x".into(),
            negative_prompt: String::new(),
            size: "2048*2048".into(),
            seed: -1,
            enable_safety_checker: true,
            max_wait_seconds: 300,
        }
        .validate()
        .unwrap();

        let text = generated(&completed(json!({ "seed": 991 })), &job);
        assert_eq!(
            text,
            "Image generated successfully.\nURL: https://cdn.example.com/img.png\nSize: 2048*2048\nSeed: 991\nJob ID: job-42"
        );

        let text = generated(&completed(json!({})), &job);
        assert!(text.contains("Seed: -1"));
    }

    #[test]
    fn test_edited_includes_cost_and_ratio() {
        let job = EditJob {
            input: json!({}),
            resolution: Resolution::FourK,
            aspect_ratio: Some("9:16".into()),
            deadline: Duration::from_secs(300),
        };
        let text = edited(&completed(json!({})), &job);
        assert!(text.contains("Resolution: 4k"));
        assert!(text.contains("Cost: $0.24"));
        assert!(text.ends_with("Aspect Ratio: 9:16"));
    }

    #[test]
    fn test_status_texts() {
        let text = status(EndpointKind::Seedream, &completed(json!({ "seed": 5 })));
        assert!(text.starts_with("Status: COMPLETED"));
        assert!(text.contains("Seed: 5"));

        let text = status(EndpointKind::NanoBanana, &completed(json!({ "resolution": "4k" })));
        assert!(text.contains("Cost: $0.24"));

        let text = status(EndpointKind::NanoBanana, &completed(json!({})));
        assert!(text.contains("Cost: $0.14"));

        let text = status(EndpointKind::Seedream, &result(json!({ "status": "IN_QUEUE" })));
        assert!(text.starts_with("Status: IN_QUEUE"));
        assert!(text.contains("still processing"));

        let text = status(
            EndpointKind::Seedream,
            &result(json!({ "status": "FAILED", "error": "bad prompt" })),
        );
        assert!(text.contains("Error: bad prompt"));

        let text = status(EndpointKind::Seedream, &result(json!({ "status": "WARMING_UP" })));
        assert_eq!(text, "Status: WARMING_UP\nJob ID: job-42");
    }

    #[test]
    fn test_completed_texts_include_timings() {
        let mut timed = JobResult::from_response(
            "job-42",
            &json!({
                "status": "COMPLETED",
                "delayTime": 1200,
                "executionTime": 34_500,
                "output": { "result": "https://cdn.example.com/img.png", "seed": 3 }
            }),
        );
        timed.result_ref = Some("https://cdn.example.com/img.png".into());

        let text = status(EndpointKind::Seedream, &timed);
        assert!(text.ends_with("Seed: 3\nQueue time: 1.2s\nExecution time: 34.5s"));

        let job = EditJob {
            input: json!({}),
            resolution: Resolution::TwoK,
            aspect_ratio: None,
            deadline: Duration::from_secs(300),
        };
        let text = edited(&timed, &job);
        assert!(text.contains("Queue time: 1.2s"));
        assert!(text.contains("Execution time: 34.5s"));

        let untimed = completed(json!({}));
        assert!(!status(EndpointKind::Seedream, &untimed).contains("time:"));
    }

    #[test]
    fn test_job_failed_text() {
        let text = job_failed(&result(json!({ "status": "FAILED", "error": "NSFW content detected" })));
        assert_eq!(text, "Job failed: NSFW content detected\nJob ID: job-42");
    }

    #[test]
    fn test_timeout_points_to_check_job_status() {
        let err = Error::Timeout {
            handle: JobHandle::new(Endpoint::new("nano-banana-pro-edit"), "job-42"),
            last_status: JobStatus::InProgress,
            elapsed: Duration::from_secs(301),
        };
        let text = failure(&err, EndpointKind::NanoBanana, Some("job-42"));
        assert!(text.starts_with("Timeout"));
        assert!(text.contains("job_id 'job-42'"));
        assert!(text.contains("endpoint_type 'nano_banana'"));
    }

    #[test]
    fn test_transport_failures() {
        let err = Error::from(TransportError::http_status(401, ""));
        assert!(failure(&err, EndpointKind::Seedream, None).contains("API key was rejected"));

        let err = Error::from(TransportError::http_status(404, ""));
        let text = failure(&err, EndpointKind::Seedream, Some("abc"));
        assert!(text.contains("job 'abc' was not found"));
        assert!(text.ends_with("Job ID: abc"));

        let err = Error::from(TransportError::network("connection reset"));
        assert!(failure(&err, EndpointKind::Seedream, None).contains("try again"));
    }

    #[test]
    fn test_protocol_failure() {
        let err = Error::from(ProtocolError::NoResult {
            tried: vec!["/result".into()],
        });
        let text = failure(&err, EndpointKind::Seedream, Some("job-1"));
        assert!(text.contains("unexpected response"));
        assert!(text.ends_with("Job ID: job-1"));
    }

    #[test]
    fn test_invalid_capitalizes() {
        assert_eq!(invalid(&ValidationError::EmptyPrompt), "Prompt must not be empty");
    }
}
