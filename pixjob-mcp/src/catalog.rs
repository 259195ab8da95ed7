//! Static knowledge about the two image endpoints: limits, options, prices,
//! result locations and the reference text served by `get_api_info`.

use std::fmt;
use std::str::FromStr;

use pixjob::{Endpoint, ResultPaths};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

/// Default Seedream V4 text-to-image endpoint id.
pub const SEEDREAM_ENDPOINT_ID: &str = "seedream-v4-t2i";
/// Default Nano Banana Pro Edit endpoint id.
pub const NANO_BANANA_ENDPOINT_ID: &str = "nano-banana-pro-edit";

/// Smallest allowed Seedream side length in pixels.
pub const SEEDREAM_MIN_SIZE: u32 = 1024;
/// Largest allowed Seedream side length in pixels.
pub const SEEDREAM_MAX_SIZE: u32 = 4096;
/// Seedream size used when the caller gives none.
pub const SEEDREAM_DEFAULT_SIZE: &str = "2048*2048";

/// Minimum number of input images for an edit.
pub const NANO_BANANA_MIN_IMAGES: usize = 1;
/// Maximum number of input images for an edit.
pub const NANO_BANANA_MAX_IMAGES: usize = 10;
/// Accepted output aspect ratios for edits.
pub const NANO_BANANA_ASPECT_RATIOS: [&str; 10] = [
    "1:1", "3:2", "2:3", "4:3", "3:4", "4:5", "5:4", "16:9", "9:16", "21:9",
];

/// Default maximum wait for a tool call, in seconds.
pub const DEFAULT_MAX_WAIT_SECS: u64 = 300;
/// Upper bound accepted for `max_wait_seconds`.
pub const MAX_WAIT_LIMIT_SECS: u64 = 3600;

/// Which API a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Seedream V4 text-to-image generation.
    Seedream,
    /// Nano Banana Pro image editing.
    NanoBanana,
}

impl EndpointKind {
    /// Name used in tool arguments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seedream => "seedream",
            Self::NanoBanana => "nano_banana",
        }
    }

    /// Where each API puts the image URL in a completed job's output.
    #[must_use]
    pub fn result_paths(self) -> ResultPaths {
        match self {
            Self::Seedream => ResultPaths::new(["/result", "/image_url", "/images/0", ""]),
            Self::NanoBanana => ResultPaths::new(["/result", "/image", "/images/0", ""]),
        }
    }

    /// Build the endpoint descriptor for a configured endpoint id.
    #[must_use]
    pub fn endpoint(self, id: impl Into<String>) -> Endpoint {
        Endpoint::new(id).with_result_paths(self.result_paths())
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nano Banana output resolution tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// About 1024 px on the long side.
    OneK,
    /// About 2048 px on the long side.
    #[default]
    TwoK,
    /// About 4096 px on the long side.
    FourK,
}

impl Resolution {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::OneK, Self::TwoK, Self::FourK];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneK => "1k",
            Self::TwoK => "2k",
            Self::FourK => "4k",
        }
    }

    /// Price per edited image in US dollars.
    #[must_use]
    pub const fn price_usd(self) -> f64 {
        match self {
            Self::OneK | Self::TwoK => 0.14,
            Self::FourK => 0.24,
        }
    }

    /// "1k ($0.14), 2k ($0.14), 4k ($0.24)".
    #[must_use]
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|r| format!("{} (${:.2})", r.as_str(), r.price_usd()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Nano Banana output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Smaller files, lossy.
    #[default]
    Jpeg,
    /// Lossless.
    Png,
}

impl OutputFormat {
    /// All formats.
    pub const ALL: [Self; 2] = [Self::Jpeg, Self::Png];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Topic selector for `get_api_info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApiInfoTopic {
    /// Seedream text-to-image reference.
    Seedream,
    /// Nano Banana editing reference.
    NanoBanana,
    /// Both references plus general tips.
    #[default]
    All,
}

const SEEDREAM_INFO: &str = "\
## Seedream V4 T2I (text-to-image)

Sizes
- \"width*height\" with both sides between 1024 and 4096 pixels
- Default 2048*2048; common picks: 1024*1024, 2048*2048, 3072*3072, 4096*4096

Parameters
- negative_prompt: things to keep out of the picture
- seed: -1 for random, any other number to reproduce a result
- enable_safety_checker: content filter, on by default

Tips
- Detailed prompts give better pictures
- Larger sizes take longer
- Keep the seed of results you like
";

const NANO_BANANA_INFO: &str = "\
## Nano Banana Pro Edit (image editing)

Resolution and price per image
- 1k: $0.14
- 2k: $0.14 (default)
- 4k: $0.24

Aspect ratios
- Square 1:1
- Landscape 3:2, 4:3, 16:9, 21:9
- Portrait 2:3, 3:4, 9:16
- Social 4:5, 5:4

Inputs
- 1 to 10 public http(s) image URLs (JPEG, PNG, WebP)

Output
- jpeg (smaller) or png (lossless)
- enable_base64_output returns inline data instead of a URL

Tips
- 2k is the best value for most edits; use 4k only for fine detail
- Give clear, specific editing instructions
";

const GENERAL_TIPS: &str = "\
Tips
- Both APIs run jobs asynchronously; most finish within 30 to 90 seconds
- Tools wait up to max_wait_seconds (default 300)
- When a tool times out, call check_job_status with the returned job id
";

/// Reference text for a topic.
#[must_use]
pub fn api_info(topic: ApiInfoTopic) -> String {
    match topic {
        ApiInfoTopic::Seedream => SEEDREAM_INFO.to_string(),
        ApiInfoTopic::NanoBanana => NANO_BANANA_INFO.to_string(),
        ApiInfoTopic::All => format!("{SEEDREAM_INFO}\n{NANO_BANANA_INFO}\n{GENERAL_TIPS}"),
    }
}
