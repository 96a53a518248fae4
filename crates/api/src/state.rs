use std::sync::Arc;

use bgv_core::checks::CheckConfig;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Policy applied when a request carries no `checkConfig` of its own.
    pub default_check_config: Arc<CheckConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, default_check_config: CheckConfig) -> Self {
        Self {
            config: Arc::new(config),
            default_check_config: Arc::new(default_check_config),
        }
    }
}
