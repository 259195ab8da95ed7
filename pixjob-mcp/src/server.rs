//! MCP server exposing the image tools.

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router,
};

use crate::params::{ApiInfoRequest, CheckJobStatusRequest, EditImageRequest, GenerateImageRequest};
use crate::tools::ImageTools;

const INSTRUCTIONS: &str = "Image generation and editing on Runpod. \
generate_image creates images from text (Seedream V4), edit_image edits existing images \
(Nano Banana Pro). Both wait for the job; if a call times out, use check_job_status with \
the returned job id. get_api_info describes sizes, resolutions, prices and tips.";

/// MCP handler with one tool per image operation.
#[derive(Clone)]
pub struct ImageServer {
    tools: ImageTools,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for ImageServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageServer")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

fn reply(outcome: Result<String, String>) -> CallToolResult {
    match outcome {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(text) => CallToolResult::error(vec![Content::text(text)]),
    }
}

#[tool_router]
impl ImageServer {
    /// Create a server over the given tools.
    #[must_use]
    pub fn new(tools: ImageTools) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Generate an image from a text prompt with Seedream V4. \
        Sizes are 'width*height' with each side 1024-4096 px (default 2048*2048). \
        Waits for the job and returns the image URL, seed and job id."
    )]
    async fn generate_image(
        &self,
        Parameters(request): Parameters<GenerateImageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(reply(self.tools.generate_image(&request).await))
    }

    #[tool(
        description = "Edit 1-10 images with Nano Banana Pro using a text instruction. \
        Resolution 1k/2k ($0.14) or 4k ($0.24); optional aspect ratio; jpeg or png output. \
        Waits for the job and returns the image URL, cost and job id."
    )]
    async fn edit_image(
        &self,
        Parameters(request): Parameters<EditImageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(reply(self.tools.edit_image(&request).await))
    }

    #[tool(
        description = "Check the status of a job returned by generate_image or edit_image, \
        e.g. after a timeout. endpoint_type is 'seedream' or 'nano_banana'."
    )]
    async fn check_job_status(
        &self,
        Parameters(request): Parameters<CheckJobStatusRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(reply(self.tools.check_job_status(&request).await))
    }

    #[tool(description = "Reference for the image APIs: sizes, resolutions, aspect ratios, prices and tips.")]
    fn get_api_info(
        &self,
        Parameters(request): Parameters<ApiInfoRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(
            self.tools.api_info(&request),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ApiInfoTopic, NANO_BANANA_ENDPOINT_ID, SEEDREAM_ENDPOINT_ID};
    use pixjob::{BackoffSchedule, ClientConfig, JobClient, RetryPolicy};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server(base_url: &str) -> ImageServer {
        let config = ClientConfig::builder()
            .api_key("rp_test_key_0001")
            .base_url(base_url)
            .retry(RetryPolicy::none())
            .build()
            .unwrap();
        ImageServer::new(ImageTools::new(
            JobClient::new(&config).unwrap(),
            SEEDREAM_ENDPOINT_ID,
            NANO_BANANA_ENDPOINT_ID,
            BackoffSchedule::fixed(Duration::from_millis(10)),
        ))
    }

    fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn test_lists_all_tools() {
        let server = server("http://127.0.0.1:9");
        let mut names: Vec<_> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["check_job_status", "edit_image", "generate_image", "get_api_info"]
        );
    }

    #[test]
    fn test_server_info() {
        let info = server("http://127.0.0.1:9").get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("check_job_status"));
    }

    #[test]
    fn test_api_info_tool() {
        let result = server("http://127.0.0.1:9")
            .get_api_info(Parameters(ApiInfoRequest {
                api: ApiInfoTopic::NanoBanana,
            }))
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert!(text(&result).contains("Nano Banana"));
    }

    #[tokio::test]
    async fn test_failed_job_status_is_not_an_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "FAILED",
                "error": "out of memory"
            })))
            .mount(&mock)
            .await;

        let request: CheckJobStatusRequest =
            serde_json::from_value(json!({ "job_id": "job-7", "endpoint_type": "seedream" }))
                .unwrap();
        let result = server(&mock.uri())
            .check_job_status(Parameters(request))
            .await
            .unwrap();

        // A failed job is still a successful status check.
        assert_ne!(result.is_error, Some(true));
        assert!(text(&result).contains("Error: out of memory"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_flagged() {
        let request: GenerateImageRequest =
            serde_json::from_value(json!({ "prompt": "" })).unwrap();
        let result = server("http://127.0.0.1:9")
            .generate_image(Parameters(request))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text(&result), "Prompt must not be empty");
    }
}
