//! Tracing subscriber setup

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Map a level name to a filter directive, defaulting to `info`
pub fn level_directive(log_level: &str) -> &'static str {
    match log_level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Install the global subscriber, writing to stderr
pub fn init_logging(log_level: &str, json_logs: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json_logs {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("warn"), "warn");
        assert_eq!(level_directive("verbose"), "info");
    }
}
