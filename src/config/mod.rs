//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `CALLPAD_POPUP__TOKEN_TIMEOUT_SECS=5`
const ENV_PREFIX: &str = "CALLPAD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub popup: PopupConfig,
    pub logging: LoggingConfig,
    pub loopback: LoopbackConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupConfig {
    /// Where the token URL and last number are persisted
    pub settings_path: PathBuf,
    pub token_timeout_secs: u64,
    /// Ask the provider for verbose signalling logs
    pub debug_provider: bool,
}

impl PopupConfig {
    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopbackConfig {
    /// Remote side answers every outgoing call
    pub auto_answer: bool,
}

impl Config {
    /// Defaults, then the optional TOML file, then `CALLPAD_*` variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            popup: PopupConfig {
                settings_path: PathBuf::from("callpad-settings.toml"),
                token_timeout_secs: 10,
                debug_provider: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            loopback: LoopbackConfig { auto_answer: true },
        }
    }
}
