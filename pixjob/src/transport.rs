//! Transport seam between the job client and the remote API.
//!
//! [`JobTransport`] is the only place network I/O happens. [`HttpTransport`]
//! talks to the Runpod serverless API; tests swap in scripted fakes.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, ProtocolError, Result, TransportError};

/// Raw JSON calls against a job endpoint.
///
/// Implementations perform exactly one request per call and never retry;
/// retry policy belongs to the client.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Create a job on `endpoint` with the given input.
    async fn run(&self, endpoint: &str, input: &Value) -> Result<Value>;

    /// Fetch the current status of a job.
    async fn status(&self, endpoint: &str, job_id: &str) -> Result<Value>;

    /// Ask the provider to cancel a job.
    async fn cancel(&self, endpoint: &str, job_id: &str) -> Result<Value>;
}

#[async_trait]
impl<T: JobTransport + ?Sized> JobTransport for Arc<T> {
    async fn run(&self, endpoint: &str, input: &Value) -> Result<Value> {
        (**self).run(endpoint, input).await
    }

    async fn status(&self, endpoint: &str, job_id: &str) -> Result<Value> {
        (**self).status(endpoint, job_id).await
    }

    async fn cancel(&self, endpoint: &str, job_id: &str) -> Result<Value> {
        (**self).cancel(endpoint, job_id).await
    }
}

/// Runpod serverless HTTP transport.
///
/// Routes:
/// - `POST {base}/{endpoint}/run` with `{"input": ...}`
/// - `GET {base}/{endpoint}/status/{job_id}`
/// - `POST {base}/{endpoint}/cancel/{job_id}`
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: Arc<str>,
    headers: Arc<HeaderMap>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built or the
    /// API key is not a valid header value.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(2);
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|e| Error::config(format!("API key is not a valid header value: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http_client: config.build_http_client()?,
            base_url: config.base_url().into(),
            headers: Arc::new(headers),
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .headers((*self.headers).clone())
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            return Err(TransportError::http_status(status.as_u16(), body).into());
        }

        let bytes = response.bytes().await.map_err(TransportError::from)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ProtocolError::InvalidBody(e.to_string()).into())
    }
}

/// Body text of an error response, or a marker when it could not be read.
fn error_body<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|e| {
        debug!(error = %e, "failed to read error response body");
        format!("<unreadable body: {e}>")
    })
}

#[async_trait]
impl JobTransport for HttpTransport {
    async fn run(&self, endpoint: &str, input: &Value) -> Result<Value> {
        let url = self.url(&format!("{endpoint}/run"));
        debug!(%url, "POST run");
        let body = json!({ "input": input });
        self.send(self.http_client.post(url).json(&body)).await
    }

    async fn status(&self, endpoint: &str, job_id: &str) -> Result<Value> {
        let url = self.url(&format!("{endpoint}/status/{job_id}"));
        debug!(%url, "GET status");
        self.send(self.http_client.get(url)).await
    }

    async fn cancel(&self, endpoint: &str, job_id: &str) -> Result<Value> {
        let url = self.url(&format!("{endpoint}/cancel/{job_id}"));
        debug!(%url, "POST cancel");
        self.send(self.http_client.post(url)).await
    }
}
