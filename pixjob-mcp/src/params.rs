//! Tool arguments and their validation.
//!
//! Every request is checked here and turned into the exact JSON input the
//! endpoint expects; the job client forwards it without looking inside.

use std::fmt;
use std::time::Duration;

use rmcp::schemars;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::catalog::{
    ApiInfoTopic, DEFAULT_MAX_WAIT_SECS, EndpointKind, MAX_WAIT_LIMIT_SECS,
    NANO_BANANA_ASPECT_RATIOS, NANO_BANANA_MAX_IMAGES, NANO_BANANA_MIN_IMAGES, OutputFormat,
    Resolution, SEEDREAM_DEFAULT_SIZE, SEEDREAM_MAX_SIZE, SEEDREAM_MIN_SIZE,
};

/// Rejected tool arguments, phrased for the assistant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Empty prompt.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// Size string is not `width*height`.
    #[error("invalid size format '{0}'; use 'width*height' with numbers, e.g. '{d}'", d = SEEDREAM_DEFAULT_SIZE)]
    SizeFormat(String),

    /// A side is outside the allowed pixel range.
    #[error("invalid {side} {value}; must be between {lo} and {hi} pixels", lo = SEEDREAM_MIN_SIZE, hi = SEEDREAM_MAX_SIZE)]
    SizeRange {
        /// "width" or "height".
        side: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// No input images.
    #[error("no images provided; at least {n} image URL is required", n = NANO_BANANA_MIN_IMAGES)]
    NoImages,

    /// Too many input images.
    #[error("too many images ({0}); the maximum is {m}", m = NANO_BANANA_MAX_IMAGES)]
    TooManyImages(usize),

    /// Image reference is not an http(s) URL.
    #[error("image URL '{0}' must start with http:// or https://")]
    ImageUrl(String),

    /// Unknown resolution tier.
    #[error("invalid resolution '{0}'; valid options: {o}", o = Resolution::options())]
    Resolution(String),

    /// Unknown aspect ratio.
    #[error("invalid aspect_ratio '{0}'; valid options: {o}", o = NANO_BANANA_ASPECT_RATIOS.join(", "))]
    AspectRatio(String),

    /// Unknown output format.
    #[error("invalid output_format '{0}'; valid options: jpeg, png")]
    OutputFormat(String),

    /// Wait outside the accepted range.
    #[error("max_wait_seconds must be between 1 and {m}, got {0}", m = MAX_WAIT_LIMIT_SECS)]
    MaxWait(u64),

    /// Empty job id.
    #[error("job_id must not be empty")]
    EmptyJobId,
}

/// Seedream image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Parse and range-check a `width*height` string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SizeFormat`] or [`ValidationError::SizeRange`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let format_err = || ValidationError::SizeFormat(raw.to_string());
        let (w, h) = raw.split_once('*').ok_or_else(format_err)?;
        let width: u32 = w.trim().parse().map_err(|_| format_err())?;
        let height: u32 = h.trim().parse().map_err(|_| format_err())?;

        for (side, value) in [("width", width), ("height", height)] {
            if !(SEEDREAM_MIN_SIZE..=SEEDREAM_MAX_SIZE).contains(&value) {
                return Err(ValidationError::SizeRange { side, value });
            }
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.width, self.height)
    }
}

fn default_size() -> String {
    SEEDREAM_DEFAULT_SIZE.to_string()
}

const fn default_seed() -> i64 {
    -1
}

const fn default_true() -> bool {
    true
}

const fn default_max_wait() -> u64 {
    DEFAULT_MAX_WAIT_SECS
}

fn default_resolution() -> String {
    Resolution::default().as_str().to_string()
}

fn default_output_format() -> String {
    OutputFormat::default().as_str().to_string()
}

fn check_prompt(prompt: &str) -> Result<(), ValidationError> {
    if prompt.trim().is_empty() {
        Err(ValidationError::EmptyPrompt)
    } else {
        Ok(())
    }
}

fn check_wait(secs: u64) -> Result<Duration, ValidationError> {
    if (1..=MAX_WAIT_LIMIT_SECS).contains(&secs) {
        Ok(Duration::from_secs(secs))
    } else {
        Err(ValidationError::MaxWait(secs))
    }
}

/// Arguments of `generate_image`.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct GenerateImageRequest {
    /// Detailed description of the image: subject, style, composition, lighting, colors.
    pub prompt: String,
    /// Elements to keep out of the image, e.g. "blurry, low quality, distorted faces".
    #[serde(default)]
    pub negative_prompt: String,
    /// Dimensions as "width*height", each side 1024-4096 pixels. Default "2048*2048".
    #[serde(default = "default_size")]
    pub size: String,
    /// Random seed; -1 picks a random one, any other value reproduces a result.
    #[serde(default = "default_seed")]
    pub seed: i64,
    /// Content safety filtering. Default true.
    #[serde(default = "default_true")]
    pub enable_safety_checker: bool,
    /// How long to wait for the job, in seconds. Default 300.
    #[serde(default = "default_max_wait")]
    pub max_wait_seconds: u64,
}

/// A generation request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateJob {
    /// Endpoint input payload.
    pub input: Value,
    /// Parsed size.
    pub size: ImageSize,
    /// Requested seed.
    pub seed: i64,
    /// Polling deadline.
    pub deadline: Duration,
}

impl GenerateImageRequest {
    /// Validate and build the endpoint input.
    ///
    /// # Errors
    ///
    /// Returns the first rule the request breaks.
    pub fn validate(&self) -> Result<GenerateJob, ValidationError> {
        check_prompt(&self.prompt)?;
        let size = ImageSize::parse(&self.size)?;
        let deadline = check_wait(self.max_wait_seconds)?;

        let input = json!({
            "prompt": self.prompt,
            "negative_prompt": self.negative_prompt,
            "size": size.to_string(),
            "seed": self.seed,
            "enable_safety_checker": self.enable_safety_checker,
        });

        Ok(GenerateJob {
            input,
            size,
            seed: self.seed,
            deadline,
        })
    }
}

/// Arguments of `edit_image`.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct EditImageRequest {
    /// The edit to apply, e.g. "change background to sunset", "remove watermark".
    pub prompt: String,
    /// 1-10 publicly reachable http(s) image URLs (JPEG, PNG, WebP).
    pub image_urls: Vec<String>,
    /// Output resolution: "1k" ($0.14), "2k" ($0.14, default) or "4k" ($0.24).
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// Output aspect ratio; keeps the input image ratio when omitted.
    /// One of 1:1, 3:2, 2:3, 4:3, 3:4, 4:5, 5:4, 16:9, 9:16, 21:9.
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    /// "jpeg" (default, smaller) or "png" (lossless).
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Return base64 image data instead of a URL. Default false.
    #[serde(default)]
    pub enable_base64_output: bool,
    /// Ask the endpoint for synchronous processing. Default false.
    #[serde(default)]
    pub enable_sync_mode: bool,
    /// How long to wait for the job, in seconds. Default 300.
    #[serde(default = "default_max_wait")]
    pub max_wait_seconds: u64,
}

/// An edit request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditJob {
    /// Endpoint input payload.
    pub input: Value,
    /// Output tier, used for pricing.
    pub resolution: Resolution,
    /// Requested aspect ratio.
    pub aspect_ratio: Option<String>,
    /// Polling deadline.
    pub deadline: Duration,
}

impl EditImageRequest {
    /// Validate and build the endpoint input.
    ///
    /// # Errors
    ///
    /// Returns the first rule the request breaks.
    pub fn validate(&self) -> Result<EditJob, ValidationError> {
        check_prompt(&self.prompt)?;

        let count = self.image_urls.len();
        if count < NANO_BANANA_MIN_IMAGES {
            return Err(ValidationError::NoImages);
        }
        if count > NANO_BANANA_MAX_IMAGES {
            return Err(ValidationError::TooManyImages(count));
        }
        if let Some(bad) = self
            .image_urls
            .iter()
            .find(|u| !(u.starts_with("http://") || u.starts_with("https://")))
        {
            return Err(ValidationError::ImageUrl(bad.clone()));
        }

        let resolution: Resolution = self
            .resolution
            .parse()
            .map_err(|()| ValidationError::Resolution(self.resolution.clone()))?;

        let aspect_ratio = self
            .aspect_ratio
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if let Some(ratio) = aspect_ratio.filter(|r| !NANO_BANANA_ASPECT_RATIOS.contains(r)) {
            return Err(ValidationError::AspectRatio(ratio.to_string()));
        }

        let output_format: OutputFormat = self
            .output_format
            .parse()
            .map_err(|()| ValidationError::OutputFormat(self.output_format.clone()))?;

        let deadline = check_wait(self.max_wait_seconds)?;

        // The endpoint names the list "images".
        let mut input = json!({
            "prompt": self.prompt,
            "images": self.image_urls,
            "resolution": resolution.as_str(),
            "output_format": output_format.as_str(),
            "enable_base64_output": self.enable_base64_output,
            "enable_sync_mode": self.enable_sync_mode,
        });
        if let Some(ratio) = aspect_ratio {
            input["aspect_ratio"] = Value::from(ratio);
        }

        Ok(EditJob {
            input,
            resolution,
            aspect_ratio: aspect_ratio.map(String::from),
            deadline,
        })
    }
}

/// Arguments of `check_job_status`.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct CheckJobStatusRequest {
    /// Job id returned by generate_image or edit_image.
    pub job_id: String,
    /// Which API the job was submitted to: "seedream" or "nano_banana".
    pub endpoint_type: EndpointKind,
}

impl CheckJobStatusRequest {
    /// The trimmed job id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyJobId`] for a blank id.
    pub fn job_id(&self) -> Result<&str, ValidationError> {
        let id = self.job_id.trim();
        if id.is_empty() {
            Err(ValidationError::EmptyJobId)
        } else {
            Ok(id)
        }
    }
}

/// Arguments of `get_api_info`.
#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct ApiInfoRequest {
    /// "seedream", "nano_banana" or "all" (default).
    #[serde(default)]
    pub api: ApiInfoTopic,
}
