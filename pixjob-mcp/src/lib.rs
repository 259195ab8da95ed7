//! MCP tools for serverless image generation and editing.
//!
//! Exposes four tools over the Model Context Protocol:
//!
//! - `generate_image`: Seedream V4 text-to-image
//! - `edit_image`: Nano Banana Pro image editing
//! - `check_job_status`: resume a job after a timeout
//! - `get_api_info`: sizes, resolutions, prices and tips
//!
//! Jobs are driven by [`pixjob::JobClient`]; this crate adds argument
//! validation, endpoint knowledge and reply formatting.

pub mod catalog;
pub mod config;
pub mod params;
pub mod render;
pub mod server;
pub mod tools;

pub use config::{Cli, ServerConfig};
pub use server::ImageServer;
pub use tools::ImageTools;
