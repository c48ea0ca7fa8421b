//! Configuration management for Drover

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Launch browsers headless by default
    pub headless: bool,

    /// Route traffic through the proxy pool by default
    pub proxy: bool,

    /// Window width for visible sessions
    pub window_width: u32,

    /// Window height for visible sessions
    pub window_height: u32,

    /// Default wait budget for query/wait operations, in seconds
    pub max_wait_time: u64,

    /// Directory where downloads land
    pub download_dir: String,

    /// Directory for debug snapshots and HTML dumps
    pub temp_dir: String,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: false,
            window_width: 2560,
            window_height: 1600,
            max_wait_time: 30,
            download_dir: "/tmp/drover/downloads".to_string(),
            temp_dir: "/tmp/drover".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(headless) = env::var("DROVER_HEADLESS") {
            config.headless = headless
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_HEADLESS"))?;
        }

        if let Ok(proxy) = env::var("DROVER_PROXY") {
            config.proxy = proxy
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_PROXY"))?;
        }

        if let Ok(width) = env::var("DROVER_WINDOW_WIDTH") {
            config.window_width = width
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_WINDOW_WIDTH"))?;
        }

        if let Ok(height) = env::var("DROVER_WINDOW_HEIGHT") {
            config.window_height = height
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_WINDOW_HEIGHT"))?;
        }

        if let Ok(max_wait) = env::var("DROVER_MAX_WAIT_TIME") {
            config.max_wait_time = max_wait
                .parse()
                .map_err(|_| Error::configuration("Invalid DROVER_MAX_WAIT_TIME"))?;
        }

        if let Ok(download_dir) = env::var("DROVER_DOWNLOAD_DIR") {
            config.download_dir = download_dir;
        }

        if let Ok(temp_dir) = env::var("DROVER_TEMP_DIR") {
            config.temp_dir = temp_dir;
        }

        if let Ok(log_level) = env::var("DROVER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}
