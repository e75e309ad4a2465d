use tracing::Span;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Installs the global subscriber. `RUST_LOG` takes precedence over the configured filter.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::ConfigError(format!("invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(format!("tracing already initialised: {}", e)))
}

pub fn counter_span(counter_id: &Uuid, window_secs: usize) -> Span {
    tracing::info_span!(
        "event_counter",
        counter_id = %counter_id,
        window_secs = window_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_subscriber_only_once() {
        let config = LoggingConfig {
            filter: "event_counter=debug".to_string(),
            json: true,
        };
        assert!(init_tracing(&config).is_ok());
        assert!(matches!(init_tracing(&config), Err(Error::ConfigError(_))));
    }

    #[test]
    fn counter_span_is_named() {
        let span = counter_span(&Uuid::new_v4(), 30);
        // Disabled when no subscriber is listening, but the metadata is still set
        if let Some(metadata) = span.metadata() {
            assert_eq!(metadata.name(), "event_counter");
        }
    }
}
