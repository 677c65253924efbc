//! Strategy logging capability.
//!
//! A strategy is configured either with a level name (resolved to a
//! [`TracingLogger`]) or with an injected logger object. Both end up behind
//! the same [`StrategyLogger`] trait so the state machine never cares which.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Severity levels understood by the strategy logger, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Logging sink used by the strategy.
pub trait StrategyLogger: Send + Sync {
    fn trace(&self, message: &str);
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Either a level for the built-in tracing logger or a caller-supplied logger.
#[derive(Clone)]
pub enum LoggerConfig {
    Level(LogLevel),
    Injected(Arc<dyn StrategyLogger>),
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig::Level(LogLevel::default())
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerConfig::Level(level) => f.debug_tuple("Level").field(level).finish(),
            LoggerConfig::Injected(_) => f.write_str("Injected(..)"),
        }
    }
}

impl From<LogLevel> for LoggerConfig {
    fn from(level: LogLevel) -> Self {
        LoggerConfig::Level(level)
    }
}

impl LoggerConfig {
    /// Resolve into the logger the strategy will hold for its lifetime.
    pub fn resolve(self, strategy_name: &str) -> Arc<dyn StrategyLogger> {
        match self {
            LoggerConfig::Level(level) => Arc::new(TracingLogger::new(strategy_name, level)),
            LoggerConfig::Injected(logger) => logger,
        }
    }
}

/// Forwards to `tracing`, dropping anything below `level`.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    strategy: String,
    level: LogLevel,
}

impl TracingLogger {
    pub fn new(strategy: &str, level: LogLevel) -> Self {
        Self {
            strategy: strategy.to_string(),
            level,
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }
}

impl StrategyLogger for TracingLogger {
    fn trace(&self, message: &str) {
        if self.enabled(LogLevel::Trace) {
            tracing::trace!(target: "openam_strategy", strategy = %self.strategy, "{}", message);
        }
    }

    fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!(target: "openam_strategy", strategy = %self.strategy, "{}", message);
        }
    }

    fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            tracing::info!(target: "openam_strategy", strategy = %self.strategy, "{}", message);
        }
    }

    fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Warn) {
            tracing::warn!(target: "openam_strategy", strategy = %self.strategy, "{}", message);
        }
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "openam_strategy", strategy = %self.strategy, "{}", message);
    }
}
