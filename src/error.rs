//! Unified error taxonomy for the hub.
//!
//! Every fallible core operation (trie, dispatcher, TLS resolution, config loading) returns
//! `Result<T, HubError>`. Configuration-loading call sites that only need to log or render a
//! message, rather than branch on the kind, use `anyhow` instead (see `config::AppConfig::load`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("no port provided")]
    NoPort,

    #[error("route already registered: {template}")]
    RouteAlreadyRegistered { template: String },

    #[error("duplicate parameter `{name}` in route: {template}")]
    DuplicateParamInRoute { template: String, name: String },

    #[error("not found")]
    NotFound,

    #[error("invalid JSON in {path}: {source}")]
    InvalidJson { path: String, #[source] source: serde_json::Error },

    #[error("I/O error on {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("TLS material missing: {missing}")]
    TlsMaterialMissing { missing: &'static str },

    #[error("not an API directory: {name}")]
    NotAnApiDirectory { name: String },

    #[error("failed to decode config {path}: {source}")]
    ConfigDecode { path: String, #[source] source: toml::de::Error },
}

pub type HubResult<T> = Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable_for_log_lines() {
        let err = HubError::RouteAlreadyRegistered { template: "a/b".into() };
        assert_eq!(err.to_string(), "route already registered: a/b");
    }

    #[test]
    fn tls_missing_names_the_absent_half() {
        let err = HubError::TlsMaterialMissing { missing: "key_file" };
        assert!(err.to_string().contains("key_file"));
    }
}
