use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::services::catalog::types::DEFAULT_REPORT_ID;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub max_file_size: usize,
    pub default_report_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            max_file_size: default_max_file_size(),
            default_report_id: DEFAULT_REPORT_ID.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let addr = match std::env::var("CATALOG_ADDR") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("Invalid CATALOG_ADDR: {}", v))?,
            Err(_) => default_addr(),
        };

        let max_file_size = match std::env::var("CATALOG_MAX_FILE_SIZE") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("Invalid CATALOG_MAX_FILE_SIZE: {}", v))?,
            Err(_) => default_max_file_size(),
        };

        let default_report_id = std::env::var("CATALOG_DEFAULT_REPORT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_ID.to_string());

        Ok(Config {
            addr,
            max_file_size,
            default_report_id,
        })
    }
}

pub fn load_config() -> Result<Config> {
    Config::new()
}
