//! Top-level application configuration: load/merge/validate chain.
//!
//! Follows `lithair-core/src/config/mod.rs`'s `LithairConfig::load/load_from/from_file/merge/
//! apply_env_vars/validate` chain exactly.

pub mod api;
pub mod http;
pub mod log;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use api::APIConfig;
pub use http::HttpConfig;
pub use log::LogConfig;

const DEFAULT_API_DIR: &str = "./mockApis";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub log: LogConfig,
    pub api_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { http: HttpConfig::default(), log: LogConfig::default(), api_dir: DEFAULT_API_DIR.to_string() }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("app_config.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        let path = path.as_ref();
        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.merge(&file_config);
        }
        config.apply_env_vars();
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn merge(&mut self, other: &AppConfig) {
        self.http.merge(&other.http);
        self.log.merge(&other.log);
        if !other.api_dir.is_empty() {
            self.api_dir = other.api_dir.clone();
        }
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(dir) = std::env::var("MOCKHUB_API_DIR") {
            self.api_dir = dir;
        }
        self.log.apply_env_vars();
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.http.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_default_api_dir() {
        let config = AppConfig::default();
        assert_eq!(config.api_dir, DEFAULT_API_DIR);
    }

    #[test]
    fn default_config_fails_validation_without_a_port() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let config = AppConfig::load_from("/nonexistent/app_config.toml").unwrap();
        assert_eq!(config.api_dir, DEFAULT_API_DIR);
    }

    #[test]
    fn load_from_file_merges_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        std::fs::write(
            &path,
            r#"
                api_dir = "./fixtures/apis"

                [http]
                port = 9000

                [log]
                level = "debug"
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_dir, "./fixtures/apis");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.log.level, "debug");
    }
}
