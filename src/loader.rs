//! Configuration loader: enumerates API directories and decodes one TOML file per directory.
//!
//! Grounded on `original_source/manager/manager.go`'s `isAPI`/`isAPIConfig`/`decodeAPIConfig`.
//! Exposed behind a trait so the hub can be tested against a fixture loader instead of touching
//! the filesystem.

use async_trait::async_trait;
use std::path::Path;

use crate::config::api::APIConfig;
use crate::error::{HubError, HubResult};
use crate::fileio::FileOps;

const API_DIR_SUFFIX: &str = "Api";

#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// Returns `Ok(None)` when `entry` is a recognised API directory with no `.toml` file in
    /// it, `Err(NotAnApiDirectory)` when `entry` isn't an API directory at all, and `Ok(Some)`
    /// with the decoded config otherwise.
    async fn get_api_config(&self, entry: &Path) -> HubResult<Option<APIConfig>>;
}

pub struct TomlConfigLoader {
    file_io: std::sync::Arc<dyn FileOps>,
}

impl TomlConfigLoader {
    pub fn new(file_io: std::sync::Arc<dyn FileOps>) -> Self {
        Self { file_io }
    }
}

fn is_api_directory(name: &str) -> bool {
    name.len() > API_DIR_SUFFIX.len() && name.ends_with(API_DIR_SUFFIX)
}

fn is_toml_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("toml")
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn get_api_config(&self, entry: &Path) -> HubResult<Option<APIConfig>> {
        if !entry.is_dir() {
            return Err(HubError::NotAnApiDirectory {
                name: entry.display().to_string(),
            });
        }

        let name = entry.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !is_api_directory(name) {
            return Err(HubError::NotAnApiDirectory { name: name.to_string() });
        }

        let mut contents = None;
        for candidate in self.file_io.read_dir(entry).await? {
            if is_toml_file(&candidate) {
                let bytes = self.file_io.read(&candidate).await?;
                contents = Some((candidate, bytes));
                break;
            }
        }

        let Some((path, bytes)) = contents else {
            return Ok(None);
        };

        let text = String::from_utf8_lossy(&bytes);
        let config: APIConfig =
            toml::from_str(&text).map_err(|source| HubError::ConfigDecode {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Some(config))
    }
}
