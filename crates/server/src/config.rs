use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use portfolio_tracker_core::models::settings::Settings;

/// Everything the server binary reads at startup.
///
/// Sources, later ones winning:
/// 1. `portfolio-tracker.toml` in the working directory (optional)
/// 2. `PORTFOLIO__*` environment variables, `__` separating nested keys,
///    e.g. `PORTFOLIO__SETTINGS__API_KEYS__ALPHAVANTAGE`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    /// Return password reset tokens in the response body. Local use only.
    pub expose_reset_token: bool,

    pub settings: Settings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            expose_reset_token: false,
            settings: Settings::default(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("portfolio-tracker").required(false))
            .add_source(
                Environment::with_prefix("PORTFOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
