//! Logging configuration structures for declarative setup.
//!
//! Adapted from `lithair-core/src/logging/config.rs`.

use crate::logging::{LogFormat, LogOutput};
use std::collections::HashMap;

/// Declarative logging configuration, consumed once by `init_logging`.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub outputs: Vec<LogOutput>,
    pub format: LogFormat,
    pub context_fields: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            outputs: vec![LogOutput::Stdout { format: None }],
            format: LogFormat::Human,
            context_fields: HashMap::new(),
        }
    }
}

/// Log levels in order of severity (compatible with the standard `log` crate).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Trace => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

impl LoggingConfig {
    /// Builds a `LoggingConfig` from the top-level `[log]` table (§6), translating the
    /// rotation/level/format fields into this module's vocabulary.
    pub fn from_app_log_config(cfg: &crate::config::LogConfig) -> Self {
        if !cfg.logging_enabled {
            return Self { level: LogLevel::Error, outputs: Vec::new(), ..Self::default() };
        }

        let format =
            if cfg.format_as_json { LogFormat::Json { pretty: cfg.pretty_json } } else { LogFormat::Human };

        let level = match cfg.level.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        };

        let mut outputs = vec![LogOutput::Stdout { format: Some(format.clone()) }];
        if !cfg.filename.is_empty() {
            let rotation = if cfg.max_file_size > 0 {
                crate::logging::FileRotation::Size(cfg.max_file_size)
            } else if cfg.max_file_days_age > 0 {
                crate::logging::FileRotation::Daily
            } else {
                crate::logging::FileRotation::None
            };
            let max_files = if cfg.max_file_backups > 0 { Some(cfg.max_file_backups) } else { None };
            outputs.push(LogOutput::File { path: cfg.filename.clone(), rotation, max_files });
        }

        Self { level, outputs, format, context_fields: HashMap::new() }
    }

    pub fn with_context_field(mut self, key: &str, value: &str) -> Self {
        self.context_fields.insert(key.to_string(), value.to_string());
        self
    }
}
