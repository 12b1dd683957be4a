pub mod baseline;
pub mod ownership;
pub mod seed;

use std::path::Path;

use anyhow::{Context, Result};
use selfservice_rbac::{AccessToken, AppConfig, SelfServiceClient};

use crate::observability::apply_config_debug;

/// Load and validate the config file, then apply its `debug` flag to logging.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    apply_config_debug(config.debug);
    tracing::info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Build a backend client from the configured `apiUrl` and the token in the environment.
pub fn connect(config: &AppConfig) -> Result<SelfServiceClient> {
    let token = AccessToken::from_env()?;
    let base_url = config.api_base_url()?;
    tracing::debug!(%base_url, "using SelfService API");
    Ok(SelfServiceClient::new(base_url, token)?)
}
