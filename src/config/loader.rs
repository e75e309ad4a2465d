use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub counter: CounterConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from("config", env)
    }

    /// Layers `{dir}/default`, the optional `{dir}/{env}` and `EVENT_COUNTER__*` variables.
    pub fn load_from(dir: &str, env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(
                Environment::with_prefix("EVENT_COUNTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        app.counter.validate()?;
        Ok(app)
    }
}
