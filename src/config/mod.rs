mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./folioforge.toml",
        "~/.config/folioforge/config.toml",
        "/etc/folioforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let sanitize = &config.sanitize;
    if sanitize.target_dpi == 0 || sanitize.target_dpi > u32::from(u16::MAX) {
        anyhow::bail!("target_dpi must be between 1 and {}", u16::MAX);
    }
    if sanitize.max_long_side == 0 {
        anyhow::bail!("max_long_side cannot be 0");
    }
    if !(1..=100).contains(&sanitize.jpeg_quality) {
        anyhow::bail!("jpeg_quality must be between 1 and 100");
    }
    if sanitize.max_workers == 0 {
        anyhow::bail!("max_workers cannot be 0");
    }
    if sanitize.progress_interval == 0 {
        anyhow::bail!("progress_interval cannot be 0");
    }

    let limits = &config.limits;
    if limits.max_dimension == 0 || limits.max_pixels == 0 || limits.max_decompressed_bytes == 0 {
        anyhow::bail!("decode limits cannot be 0");
    }
    if u64::from(sanitize.max_long_side) > u64::from(limits.max_dimension) {
        tracing::warn!(
            "max_long_side {} exceeds max_dimension {}; resizing will never trigger",
            sanitize.max_long_side,
            limits.max_dimension
        );
    }

    if config.container.stream_buffer_size == 0 {
        anyhow::bail!("stream_buffer_size cannot be 0");
    }
    if config.log.capacity == 0 || config.log.channel_capacity == 0 {
        anyhow::bail!("log capacities cannot be 0");
    }

    Ok(())
}
