use folioforge_image::DecodeLimits;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sanitize: SanitizeConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub container: ContainerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SanitizeConfig {
    /// Resolution stamped into every image (default: 96)
    #[serde(default = "default_target_dpi")]
    pub target_dpi: u32,

    /// Longer side above which images are downsampled (default: 2500)
    #[serde(default = "default_max_long_side")]
    pub max_long_side: u32,

    /// JPEG re-encode quality, 1-100 (default: 95)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Upper bound on worker threads (default: 8)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Completions between progress callbacks (default: 50)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Patch eligible JPEGs without decoding them (default: true)
    #[serde(default = "default_fast_path")]
    pub fast_path: bool,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            target_dpi: default_target_dpi(),
            max_long_side: default_max_long_side(),
            jpeg_quality: default_jpeg_quality(),
            max_workers: default_max_workers(),
            progress_interval: default_progress_interval(),
            fast_path: default_fast_path(),
        }
    }
}

fn default_target_dpi() -> u32 {
    folioforge_image::dpi::DEFAULT_TARGET_DPI
}

fn default_max_long_side() -> u32 {
    folioforge_image::normalize::DEFAULT_MAX_LONG_SIDE
}

fn default_jpeg_quality() -> u8 {
    folioforge_image::encode::DEFAULT_JPEG_QUALITY
}

fn default_max_workers() -> usize {
    8
}

fn default_progress_interval() -> usize {
    50
}

fn default_fast_path() -> bool {
    true
}

/// Decode bounds; see [`DecodeLimits`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    #[serde(default = "default_max_decompressed_bytes")]
    pub max_decompressed_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            max_pixels: default_max_pixels(),
            max_decompressed_bytes: default_max_decompressed_bytes(),
        }
    }
}

fn default_max_dimension() -> u32 {
    folioforge_image::decode::DEFAULT_MAX_DIMENSION
}

fn default_max_pixels() -> u64 {
    folioforge_image::decode::DEFAULT_MAX_PIXELS
}

fn default_max_decompressed_bytes() -> u64 {
    folioforge_image::decode::DEFAULT_MAX_DECOMPRESSED_BYTES
}

impl From<&LimitsConfig> for DecodeLimits {
    fn from(limits: &LimitsConfig) -> Self {
        DecodeLimits {
            max_dimension: limits.max_dimension,
            max_pixels: limits.max_pixels,
            max_decompressed_bytes: limits.max_decompressed_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContainerConfig {
    /// Copy buffer for extraction and packing (default: 64 KiB)
    #[serde(default = "default_stream_buffer_size")]
    pub stream_buffer_size: usize,

    /// Appended to the input stem for the default output name
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            stream_buffer_size: default_stream_buffer_size(),
            output_suffix: default_output_suffix(),
        }
    }
}

fn default_stream_buffer_size() -> usize {
    folioforge_container::codec::DEFAULT_BUFFER_SIZE
}

fn default_output_suffix() -> String {
    "_sanitized".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogConfig {
    /// Lines kept in the in-memory log (default: 10000)
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,

    /// Pending events before producers start dropping (default: 1024)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_log_capacity() -> usize {
    10_000
}

fn default_channel_capacity() -> usize {
    1024
}
