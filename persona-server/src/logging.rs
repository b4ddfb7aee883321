//! Tracing subscriber setup.

use anyhow::{Result, bail};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LogConfig;

/// Install the global subscriber. `RUST_LOG` wins over `log.level`.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = FmtSubscriber::builder().with_env_filter(env_filter);

    let result = match config.format.as_str() {
        "json" => tracing::subscriber::set_global_default(builder.json().finish()),
        "pretty" => tracing::subscriber::set_global_default(builder.pretty().finish()),
        "compact" => tracing::subscriber::set_global_default(builder.compact().finish()),
        other => bail!("Unknown log format: {}", other),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;

    tracing::info!("Logging initialized with level: {}", level);
    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => bail!("Invalid log level: {}", level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let config = LogConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        assert!(init_logging(&config).is_err());
    }
}
