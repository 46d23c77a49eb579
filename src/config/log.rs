//! Top-level logging configuration (§6 `log.*` schema).
//!
//! Shape and merge/apply_env_vars pattern follow `lithair-core/src/config/logging.rs`; the
//! fields themselves match SPEC_FULL.md §6's richer schema rather than the teacher's
//! `level/format/file_enabled/file_path`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub logging_enabled: bool,
    pub filename: String,
    pub max_file_size: u64,
    pub max_file_backups: u32,
    pub max_file_days_age: u32,
    pub format_as_json: bool,
    pub level: String,
    pub pretty_json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            logging_enabled: true,
            filename: String::new(),
            max_file_size: 0,
            max_file_backups: 0,
            max_file_days_age: 0,
            format_as_json: false,
            level: "info".to_string(),
            pretty_json: false,
        }
    }
}

impl LogConfig {
    pub fn merge(&mut self, other: &LogConfig) {
        *self = other.clone();
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = std::env::var("MOCKHUB_LOG_LEVEL") {
            self.level = level;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => anyhow::bail!("unknown log level: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_logging_at_info() {
        let cfg = LogConfig::default();
        assert!(cfg.logging_enabled);
        assert_eq!(cfg.level, "info");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_level_fails_validation() {
        let cfg = LogConfig { level: "verbose".to_string(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn apply_env_vars_overrides_level() {
        std::env::set_var("MOCKHUB_LOG_LEVEL", "debug");
        let mut cfg = LogConfig::default();
        cfg.apply_env_vars();
        assert_eq!(cfg.level, "debug");
        std::env::remove_var("MOCKHUB_LOG_LEVEL");
    }
}
