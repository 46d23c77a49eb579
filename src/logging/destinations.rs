//! Log output destinations - where logs are sent.
//!
//! Adapted from `lithair-core/src/logging/destinations.rs`.

use crate::logging::{FileRotation, LogFormat};

/// Where logs should be sent
#[derive(Clone, Debug)]
pub enum LogOutput {
    Stdout { format: Option<LogFormat> },
    Stderr { format: Option<LogFormat> },
    File { path: String, rotation: FileRotation, max_files: Option<u32> },
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: crate::logging::LogLevel,
    pub message: String,
    pub target: String,
    pub fields: std::collections::HashMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

#[derive(Debug, Clone)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: crate::logging::LogLevel, message: String, target: String) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            message,
            target,
            fields: std::collections::HashMap::new(),
            location: None,
        }
    }

    /// Creates a `LogEntry` from a standard `log::Record`, copying in the context fields
    /// carried by `config`.
    pub fn from_log_record(record: &log::Record, config: &crate::logging::LoggingConfig) -> Self {
        let level = crate::logging::LogLevel::from(record.level());

        let mut entry = Self {
            timestamp: chrono::Utc::now(),
            level,
            message: record.args().to_string(),
            target: record.target().to_string(),
            fields: std::collections::HashMap::new(),
            location: None,
        };

        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry.location = Some(LogLocation { file: file.to_string(), line });
        }

        for (key, value) in &config.context_fields {
            entry.fields.insert(key.clone(), serde_json::Value::String(value.clone()));
        }

        entry
    }

    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn log_entry_creation() {
        let entry = LogEntry::new(LogLevel::Info, "Test message".to_string(), "test::module".to_string());
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "Test message");
    }

    #[test]
    fn log_entry_with_fields() {
        let entry =
            LogEntry::new(LogLevel::Error, "Error occurred".to_string(), "app::handler".to_string())
                .with_field("user_id", serde_json::Value::Number(serde_json::Number::from(123)));
        assert_eq!(entry.fields.len(), 1);
    }
}
