use std::path::Path;

use anyhow::Context;
use bgv_core::checks::CheckConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Optional JSON file holding the default check configuration.
    pub check_config_path: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CHECK_CONFIG_PATH`    | unset                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let check_config_path = std::env::var("CHECK_CONFIG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            check_config_path,
        }
    }

    /// Load the default check configuration.
    ///
    /// No configured path means an empty configuration (no aggregate
    /// policies at all).
    pub fn load_check_config(&self) -> anyhow::Result<CheckConfig> {
        match &self.check_config_path {
            Some(path) => load_check_config_file(Path::new(path)),
            None => Ok(CheckConfig::default()),
        }
    }
}

/// Read and parse a check configuration JSON file.
pub fn load_check_config_file(path: &Path) -> anyhow::Result<CheckConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read check config {}", path.display()))?;
    let config = CheckConfig::from_json(&raw)
        .with_context(|| format!("Failed to parse check config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid check config {}", path.display()))?;
    Ok(config)
}
