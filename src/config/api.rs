//! Per-API configuration schema (§6), decoded by the `TomlConfigLoader` from one TOML file per
//! API directory.
//!
//! Grounded on `original_source/config/config.go`'s `APIConfig`/`Endpoint`, extended with the
//! `enforce_valid_json`/`headers`/`allow_cors` fields confirmed present in the evolved schema by
//! `original_source/manager/hub_api_test.go`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::http::HttpConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct APIConfig {
    pub base_url: String,
    pub http: HttpConfig,
    #[serde(default)]
    pub log: Option<super::log::LogConfig>,
    pub endpoints: HashMap<String, Endpoint>,
}

impl Default for APIConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            http: HttpConfig::default(),
            log: None,
            endpoints: HashMap::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    pub path: String,
    pub file: String,
    pub method: String,
    pub enforce_valid_json: bool,
    pub headers: Vec<Header>,
    pub allow_cors: bool,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            path: String::new(),
            file: String::new(),
            method: "GET".to_string(),
            enforce_valid_json: false,
            headers: Vec::new(),
            allow_cors: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_toml() {
        let toml = r#"
            base_url = "customers"

            [http]
            port = 5002

            [endpoints.get_customer]
            path = ":id"
            file = "customer.json"
            method = "get"
            enforce_valid_json = true
        "#;
        let cfg: APIConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.base_url, "customers");
        assert_eq!(cfg.http.port, 5002);
        let endpoint = cfg.endpoints.get("get_customer").unwrap();
        assert_eq!(endpoint.path, ":id");
        assert!(endpoint.enforce_valid_json);
    }

    #[test]
    fn headers_and_cors_decode() {
        let toml = r#"
            [http]
            port = 1

            [endpoints.e]
            path = "widgets"
            method = "GET"
            allow_cors = true
            headers = [{ key = "X-Test", value = "1" }]
        "#;
        let cfg: APIConfig = toml::from_str(toml).unwrap();
        let endpoint = cfg.endpoints.get("e").unwrap();
        assert!(endpoint.allow_cors);
        assert_eq!(endpoint.headers[0].key, "X-Test");
    }
}
