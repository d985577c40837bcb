//! Log subscriber for binaries and test harnesses that embed the codec.
//!
//! The library only emits events; nothing is printed until a subscriber is
//! installed. Targets are `xmlrpc_core` and `xmlrpc_client`.
//!
//! ```ignore
//! use xmlrpc_core::logging::{self, LogConfig, LogFormat};
//!
//! logging::init(&LogConfig::default().format(LogFormat::Json))?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const TARGETS: [&str; 2] = ["xmlrpc_core", "xmlrpc_client"];

#[derive(Debug, Error)]
pub enum LogError {
    #[error("a global log subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log directive: {0}")]
    BadDirective(#[from] tracing_subscriber::filter::ParseError),
}

/// How each event is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    /// One object per line, for log shippers.
    Json,
}

/// Subscriber settings. `RUST_LOG` wins over `level` when set.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Print source file and line with each event.
    pub source_location: bool,
    /// Filter directive used verbatim instead of `RUST_LOG` and `level`.
    pub directive: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            source_location: false,
            directive: None,
        }
    }
}

impl LogConfig {
    /// Traces every envelope built or parsed and every HTTP exchange.
    #[must_use]
    pub fn wire_debug() -> Self {
        Self {
            level: Level::TRACE,
            format: LogFormat::Compact,
            source_location: true,
            directive: None,
        }
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, LogError> {
        if let Some(directive) = &self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let defaults: Vec<String> = TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.level))
            .collect();
        Ok(EnvFilter::try_new(defaults.join(","))?)
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails if a subscriber is already installed or the directive is invalid.
pub fn init(config: &LogConfig) -> Result<(), LogError> {
    let filter = config.env_filter()?;
    let location = config.source_location;
    let base = fmt::layer()
        .with_file(location)
        .with_line_number(location);

    let layer = match config.format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.source_location);
        assert!(config.directive.is_none());
    }

    #[test]
    fn wire_debug_traces_with_location() {
        let config = LogConfig::wire_debug();
        assert_eq!(config.level, Level::TRACE);
        assert!(config.source_location);
    }

    #[test]
    fn explicit_directive() {
        let config = LogConfig::default()
            .level(Level::WARN)
            .format(LogFormat::Json)
            .directive("xmlrpc_client=debug");

        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn bad_directive() {
        let config = LogConfig::default().directive("xmlrpc_core=loud");
        assert!(matches!(config.env_filter(), Err(LogError::BadDirective(_))));
    }
}
