//! Command line and environment configuration.

use std::time::Duration;

use clap::Parser;
use pixjob::{BackoffSchedule, ClientConfig, Error, RUNPOD_API_BASE_URL};

use crate::catalog::{NANO_BANANA_ENDPOINT_ID, SEEDREAM_ENDPOINT_ID};

const MIN_ENDPOINT_ID_LEN: usize = 5;

/// MCP server for Runpod Seedream and Nano Banana image jobs.
///
/// Speaks MCP over stdin/stdout; logs go to stderr.
#[derive(Parser, Debug, Clone)]
#[command(name = "pixjob-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Runpod API key
    #[arg(long, env = "RUNPOD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Runpod API base URL
    #[arg(long, env = "RUNPOD_BASE_URL", default_value = RUNPOD_API_BASE_URL)]
    pub base_url: String,

    /// Seedream V4 text-to-image endpoint id
    #[arg(long, env = "RUNPOD_SEEDREAM_ENDPOINT_ID", default_value = SEEDREAM_ENDPOINT_ID)]
    pub seedream_endpoint_id: String,

    /// Nano Banana Pro Edit endpoint id
    #[arg(long, env = "RUNPOD_NANO_BANANA_ENDPOINT_ID", default_value = NANO_BANANA_ENDPOINT_ID)]
    pub nano_banana_endpoint_id: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "RUNPOD_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Delays between status polls in seconds; the last one repeats
    #[arg(long, env = "RUNPOD_BACKOFF", value_delimiter = ',', default_value = "2,4,8,15")]
    pub backoff: Vec<u64>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Settings for the job client.
    pub client: ClientConfig,
    /// Endpoint id for text-to-image jobs.
    pub seedream_endpoint_id: String,
    /// Endpoint id for edit jobs.
    pub nano_banana_endpoint_id: String,
    /// Poll schedule shared by all tools.
    pub backoff: BackoffSchedule,
}

impl ServerConfig {
    /// Validate parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a missing or short API key, a short
    /// endpoint id, a zero timeout or an invalid backoff list.
    pub fn from_cli(cli: &Cli) -> pixjob::Result<Self> {
        let api_key = cli
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("RUNPOD_API_KEY is not set"))?;

        if cli.request_timeout_secs == 0 {
            return Err(Error::config("request timeout must be at least one second"));
        }

        let client = ClientConfig::builder()
            .api_key(api_key)
            .base_url(cli.base_url.as_str())
            .request_timeout(Duration::from_secs(cli.request_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            seedream_endpoint_id: endpoint_id("RUNPOD_SEEDREAM_ENDPOINT_ID", &cli.seedream_endpoint_id)?,
            nano_banana_endpoint_id: endpoint_id(
                "RUNPOD_NANO_BANANA_ENDPOINT_ID",
                &cli.nano_banana_endpoint_id,
            )?,
            backoff: BackoffSchedule::from_secs(&cli.backoff)?,
        })
    }
}

fn endpoint_id(name: &str, raw: &str) -> pixjob::Result<String> {
    let id = raw.trim();
    if id.len() < MIN_ENDPOINT_ID_LEN {
        return Err(Error::config(format!(
            "{name} '{id}' is too short (at least {MIN_ENDPOINT_ID_LEN} characters)"
        )));
    }
    Ok(id.to_string())
}
