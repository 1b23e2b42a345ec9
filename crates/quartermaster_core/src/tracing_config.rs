//! Tracing subscriber configuration.

use core::fmt::{self as core_fmt, Display};
use core::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding a log level or a filter directive.
pub const LOG_ENV: &str = "QUARTERMASTER_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "QUARTERMASTER_LOG_FORMAT";

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

/// Error returned when parsing an unknown [`TracingFormat`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format '{0}', expected pretty, compact or json")]
pub struct ParseFormatError(String);

impl FromStr for TracingFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ParseFormatError(s.to_owned())),
        }
    }
}

impl Display for TracingFormat {
    fn fmt(&self, f: &mut core_fmt::Formatter<'_>) -> core_fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing subscriber configuration.
///
/// # Environment
///
/// [`from_env`](Self::from_env) reads:
///
/// | Variable | Example | Effect |
/// |----------|---------|--------|
/// | `QUARTERMASTER_LOG` | `debug` | Maximum level |
/// | `QUARTERMASTER_LOG` | `quartermaster_registry=debug,warn` | Filter directive |
/// | `QUARTERMASTER_LOG_FORMAT` | `json` | Output format |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "`quartermaster_registry=debug,warn`").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a new `TracingConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from `QUARTERMASTER_LOG` and `QUARTERMASTER_LOG_FORMAT`.
    ///
    /// Unset or unparsable variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(LOG_ENV).filter(|value| !value.trim().is_empty()) {
            config = match value.trim().parse::<Level>() {
                Ok(level) => config.with_level(level),
                Err(_) => config.with_env_filter(value),
            };
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).and_then(|value| value.parse().ok()) {
            config = config.with_format(format);
        }
        config
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured maximum level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured output format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Returns the configured filter directive, if any.
    #[must_use]
    pub fn env_filter(&self) -> Option<&str> {
        self.env_filter.as_deref()
    }

    /// Installs the global subscriber.
    ///
    /// An invalid filter directive falls back to the configured level.
    /// Calling this when a subscriber is already installed does nothing.
    pub fn init(&self) {
        let filter = self
            .env_filter
            .as_deref()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(self.level.as_str()));

        let spans = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let output = match self.format {
            TracingFormat::Pretty => fmt::layer().pretty().with_span_events(spans).boxed(),
            TracingFormat::Compact => fmt::layer().compact().with_span_events(spans).boxed(),
            TracingFormat::Json => fmt::layer().json().with_span_events(spans).boxed(),
        };

        // An already installed subscriber wins.
        if tracing_subscriber::registry()
            .with(filter)
            .with(output)
            .try_init()
            .is_ok()
        {
            tracing::debug!(level = %self.level, format = %self.format, "tracing initialized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_is_pretty_info() {
        let config = TracingConfig::default();
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.format(), TracingFormat::Pretty);
        assert_eq!(config.env_filter(), None);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>(), Ok(TracingFormat::Json));
        assert_eq!(" compact ".parse::<TracingFormat>(), Ok(TracingFormat::Compact));
        assert!("yaml".parse::<TracingFormat>().is_err());
    }

    #[test]
    fn env_level_sets_level() {
        let config =
            TracingConfig::from_vars(vars(&[(LOG_ENV, "debug"), (LOG_FORMAT_ENV, "json")]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format(), TracingFormat::Json);
        assert_eq!(config.env_filter(), None);
    }

    #[test]
    fn env_directive_becomes_filter() {
        let config =
            TracingConfig::from_vars(vars(&[(LOG_ENV, "quartermaster_registry=debug,warn")]));
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.env_filter(), Some("quartermaster_registry=debug,warn"));
    }

    #[test]
    fn unknown_format_keeps_default() {
        let config = TracingConfig::from_vars(vars(&[(LOG_FORMAT_ENV, "xml")]));
        assert_eq!(config.format(), TracingFormat::Pretty);
    }

    #[test]
    fn init_twice_is_harmless() {
        let config = TracingConfig::new()
            .with_format(TracingFormat::Compact)
            .with_span_events(true);
        config.init();
        config.init();
    }
}
