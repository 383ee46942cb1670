use std::{path::PathBuf, str::FromStr};

use anchorages_core::PipelineConfig;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use strum::{AsRefStr, EnumString};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr, EnumString)]
pub enum Environment {
    Local,
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSettings {
    pub tracks: PathBuf,
    pub anchorages: PathBuf,
    pub visits: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log_level: LogLevel,
    pub environment: Environment,
    pub num_workers: usize,
    pub input: FileSettings,
    pub pipeline: PipelineConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENVIRONMENT")
            .map_err(|e| ConfigError::Message(format!("failed to read APP_ENVIRONMENT: {e}")))?;
        let environment = Environment::from_str(&environment).map_err(|e| {
            ConfigError::Message(format!("failed to parse APP_ENVIRONMENT '{environment}': {e}"))
        })?;

        Config::builder()
            .add_source(
                File::with_name(&format!("config/{}", environment.as_ref().to_lowercase()))
                    .required(true),
            )
            .add_source(config::Environment::with_prefix("ANCHORAGES_ENGINE").separator("__"))
            .set_override("environment", environment.as_ref())?
            .build()?
            .try_deserialize()
    }

    pub fn init_tracer(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(self.log_level.as_ref()))
            .init();
    }
}
