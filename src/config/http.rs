//! HTTP-level configuration shared by the app-level and per-API configs.
//!
//! The TLS precedence validation mirrors `lithair-core/src/config/server.rs`'s
//! `ServerConfig::validate` almost verbatim, gated by `use_tls` the way
//! `original_source/manager/manager.go` gates `startUsingTLS`; this is the same four-case
//! state machine SPEC_FULL.md §4.6 names, just lifted into a reusable block instead of being
//! spelled out once per config level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub use_tls: bool,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: 0, use_tls: false, cert_file: None, key_file: None }
    }
}

impl HttpConfig {
    pub fn merge(&mut self, other: &HttpConfig) {
        if other.port != 0 {
            self.port = other.port;
        }
        self.use_tls = other.use_tls;
        if other.cert_file.is_some() {
            self.cert_file = other.cert_file.clone();
        }
        if other.key_file.is_some() {
            self.key_file = other.key_file.clone();
        }
    }

    pub fn validate(&self) -> HubResult<()> {
        if self.port == 0 {
            return Err(HubError::NoPort);
        }
        self.resolve_tls(None, None)?;
        Ok(())
    }

    /// Resolves the effective TLS cert/key pair per SPEC_FULL.md §4.6, gated by `use_tls`
    /// (`original_source/manager/manager.go:113`'s `if mgr.config.HTTP.UseTLS { ... }`):
    ///
    /// 0. `use_tls == false` → always plaintext (`Ok(None)`), regardless of configured material.
    /// 1. Both configured non-empty at this level → use them.
    /// 2. Exactly one configured non-empty → `TlsMaterialMissing` naming the absent half.
    /// 3. Neither configured → fall back to the caller-supplied defaults; if those are also
    ///    absent, `TlsMaterialMissing` (TLS was requested but no material resolves anywhere).
    ///
    /// Both resolved paths must exist on disk; a `stat` failure against either returns
    /// `TlsMaterialMissing`.
    pub fn resolve_tls(
        &self,
        default_cert: Option<&str>,
        default_key: Option<&str>,
    ) -> HubResult<Option<(String, String)>> {
        if !self.use_tls {
            return Ok(None);
        }

        let cert = non_empty(&self.cert_file);
        let key = non_empty(&self.key_file);

        let resolved = match (cert, key) {
            (Some(cert), Some(key)) => (cert.to_string(), key.to_string()),
            (Some(_), None) => return Err(HubError::TlsMaterialMissing { missing: "key_file" }),
            (None, Some(_)) => return Err(HubError::TlsMaterialMissing { missing: "cert_file" }),
            (None, None) => match (default_cert, default_key) {
                (Some(cert), Some(key)) => (cert.to_string(), key.to_string()),
                _ => return Err(HubError::TlsMaterialMissing { missing: "cert_file" }),
            },
        };

        if !Path::new(&resolved.0).exists() {
            return Err(HubError::TlsMaterialMissing { missing: "cert_file" });
        }
        if !Path::new(&resolved.1).exists() {
            return Err(HubError::TlsMaterialMissing { missing: "key_file" });
        }

        Ok(Some(resolved))
    }
}

/// Treats an empty string the same as absent, so `cert_file = Some("")` doesn't count as
/// "configured" in the precedence above.
fn non_empty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}
