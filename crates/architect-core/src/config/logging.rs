//! Logging configuration.

use serde::{Deserialize, Serialize};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"architect_service=debug,info"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parses_lowercase() {
        let parsed: LoggingConfig =
            serde_json::from_str(r#"{ "level": "debug", "format": "json" }"#).unwrap();
        assert_eq!(parsed.format, LogFormat::Json);
        assert_eq!(parsed.level, "debug");

        let defaulted: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaulted.format, LogFormat::Pretty);
    }
}
