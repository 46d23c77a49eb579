//! Hub controller: owns the fleet of API dispatchers plus the control-plane listener.
//!
//! Grounded on `original_source/manager/manager.go` (`StartMockAPIHub`, `loadMockAPIs`,
//! `registerMockAPIs`, `stopServer`) and `original_source/manager/hub_api.go` (`refreshAPI`); the
//! introspection shape follows `original_source/manager/hub_api_test.go`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::{APIConfig, AppConfig};
use crate::dispatcher::{body_from, ApiDispatcher, Req, Resp};
use crate::error::HubResult;
use crate::fileio::FileOps;
use crate::loader::ConfigLoader;
use crate::server::ServerHandle;

const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct FleetEntry {
    base_url: String,
    port: u16,
    endpoints: Vec<String>,
}

/// Everything the control-plane handler needs to reload the fleet from disk, shared behind an
/// `Arc` so the handler closure (which outlives `&self`) can reach it.
struct Shared {
    api_dir: std::path::PathBuf,
    file_io: Arc<dyn FileOps>,
    loader: Arc<dyn ConfigLoader>,
    cert: Option<String>,
    key: Option<String>,
    fleet: RwLock<HashMap<String, ApiDispatcher>>,
}

impl Shared {
    /// Enumerates the API directory, constructing one dispatcher per valid, non-conflicting
    /// configuration. Partial failure is isolated: a bad entry is logged and skipped. Expects
    /// the fleet write lock is not already held by the caller.
    async fn load(&self) {
        let entries = match self.file_io.read_dir(&self.api_dir).await {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("failed to enumerate api dir {}: {err}", self.api_dir.display());
                return;
            }
        };

        let mut fleet = self.fleet.write().await;
        let mut used_ports: std::collections::HashSet<u16> =
            fleet.values().map(|d| d.port()).collect();

        for entry in entries {
            let name = entry.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();

            let config = match self.loader.get_api_config(&entry).await {
                Ok(Some(config)) => config,
                Ok(None) => continue,
                Err(err) => {
                    log::warn!("skipping {}: {err}", entry.display());
                    continue;
                }
            };

            if used_ports.contains(&config.http.port) {
                log::warn!("skipping {name}: port {} already in use in the fleet", config.http.port);
                continue;
            }

            match build_dispatcher(config, &entry, self.file_io.clone()) {
                Ok(dispatcher) => {
                    used_ports.insert(dispatcher.port());
                    fleet.insert(name, dispatcher);
                }
                Err(err) => log::warn!("skipping {name}: {err}"),
            }
        }
    }

    /// Starts every dispatcher currently in the fleet. Individual start failures are logged and
    /// do not abort the loop.
    async fn start_all(&self) {
        let mut fleet = self.fleet.write().await;
        for (name, dispatcher) in fleet.iter_mut() {
            if let Err(err) = dispatcher.start(self.cert.as_deref(), self.key.as_deref()).await {
                log::error!("failed to start {name}: {err}");
            }
        }
    }

    /// Shuts down every dispatcher, clears the fleet, then reloads and restarts it from the API
    /// directory's current contents. Observes a consistent cut: everything present at the start
    /// of the refresh is shut down before any new dispatcher is created. The fleet lock is held
    /// only long enough to drain the map; shutdown (up to `SHUTDOWN_DEADLINE` each) runs against
    /// the drained dispatchers with no lock held, so concurrent introspect reads aren't blocked.
    async fn refresh(&self) {
        let mut drained: Vec<ApiDispatcher> = {
            let mut fleet = self.fleet.write().await;
            fleet.drain().map(|(_, dispatcher)| dispatcher).collect()
        };

        let shutdowns = drained.iter_mut().map(|d| d.shutdown(SHUTDOWN_DEADLINE));
        for result in futures::future::join_all(shutdowns).await {
            if let Err(err) = result {
                log::warn!("dispatcher shutdown error during refresh: {err}");
            }
        }

        self.load().await;
        self.start_all().await;
    }
}

/// Owns the fleet (API directory name → running dispatcher) and the control-plane listener.
pub struct HubController {
    app_config: AppConfig,
    shared: Arc<Shared>,
    control: Option<ServerHandle>,
}

impl HubController {
    /// Fails `NoPort` if the control-plane port is zero.
    pub fn new(
        app_config: AppConfig,
        file_io: Arc<dyn FileOps>,
        loader: Arc<dyn ConfigLoader>,
    ) -> HubResult<Self> {
        app_config.http.validate()?;
        let shared = Arc::new(Shared {
            api_dir: std::path::PathBuf::from(&app_config.api_dir),
            file_io,
            loader,
            cert: app_config.http.cert_file.clone(),
            key: app_config.http.key_file.clone(),
            fleet: RwLock::new(HashMap::new()),
        });
        Ok(Self { app_config, shared, control: None })
    }

    pub async fn load(&self) -> HubResult<()> {
        self.shared.load().await;
        Ok(())
    }

    pub async fn start_all(&self) {
        self.shared.start_all().await;
    }

    /// Runs `load` + `start_all`, then binds the control-plane listener. Returns once the
    /// listener is bound; it keeps serving on its own task until `stop_hub` signals shutdown.
    pub async fn start_hub(&mut self) -> HubResult<()> {
        self.shared.load().await;
        self.shared.start_all().await;

        let tls = self.app_config.http.resolve_tls(None, None)?;
        let port = self.app_config.http.port;
        let shared = self.shared.clone();

        let handle = ServerHandle::bind(port, tls, move |req| {
            let shared = shared.clone();
            Box::pin(async move { serve_control_plane(&shared, req).await })
        })
        .await?;

        self.control = Some(handle);
        Ok(())
    }

    /// Shuts down every dispatcher (bounded, best-effort) and then the control listener. A
    /// control-listener shutdown failure is fatal (§7 propagation policy) and panics.
    pub async fn stop_hub(&mut self) {
        {
            let mut fleet = self.shared.fleet.write().await;
            let shutdowns = fleet.values_mut().map(|d| d.shutdown(SHUTDOWN_DEADLINE));
            for result in futures::future::join_all(shutdowns).await {
                if let Err(err) = result {
                    log::warn!("dispatcher shutdown error: {err}");
                }
            }
        }

        if let Some(control) = self.control.take() {
            control
                .shutdown(SHUTDOWN_DEADLINE)
                .await
                .expect("control-plane listener failed to shut down within deadline");
        }
    }
}

fn build_dispatcher(
    config: APIConfig,
    api_dir: &std::path::Path,
    file_io: Arc<dyn FileOps>,
) -> HubResult<ApiDispatcher> {
    ApiDispatcher::new(config, api_dir.to_path_buf(), file_io)
}

async fn serve_control_plane(shared: &Arc<Shared>, req: Req) -> Resp {
    let path = crate::url::canonicalise(req.uri().path());
    let method = req.method().as_str().to_uppercase();

    match (method.as_str(), path.as_str()) {
        ("GET", "show-all-registered-mock-apis") => {
            let fleet = shared.fleet.read().await;
            let snapshot: HashMap<String, FleetEntry> = fleet
                .iter()
                .map(|(name, dispatcher)| {
                    (
                        name.clone(),
                        FleetEntry {
                            base_url: dispatcher.base_url().to_string(),
                            port: dispatcher.port(),
                            endpoints: dispatcher.endpoints().keys().cloned().collect(),
                        },
                    )
                })
                .collect();
            let body = serde_json::to_vec(&snapshot).unwrap_or_default();
            hyper::Response::builder()
                .status(hyper::StatusCode::OK)
                .header("Content-Type", "application/json")
                .body(body_from(body))
                .expect("valid HTTP response")
        }
        ("POST", "refresh-all-mock-apis") => {
            shared.refresh().await;
            hyper::Response::builder()
                .status(hyper::StatusCode::OK)
                .body(body_from("successfully refreshed mock apis"))
                .expect("valid HTTP response")
        }
        _ => hyper::Response::builder()
            .status(hyper::StatusCode::NOT_FOUND)
            .body(body_from("endpoint not found"))
            .expect("valid HTTP response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::api::Endpoint;
    use crate::fileio::RealFileOps;
    use crate::loader::TomlConfigLoader;

    fn write_api(dir: &std::path::Path, name: &str, port: u16) {
        let api_dir = dir.join(name);
        std::fs::create_dir(&api_dir).unwrap();
        std::fs::write(
            api_dir.join("config.toml"),
            format!(
                r#"
                    base_url = "widgets"

                    [http]
                    port = {port}

                    [endpoints.list]
                    path = ""
                    method = "GET"
                "#
            ),
        )
        .unwrap();
    }

    fn controller(root: &std::path::Path, control_port: u16) -> HubController {
        let mut app_config = AppConfig::default();
        app_config.http.port = control_port;
        app_config.api_dir = root.display().to_string();
        HubController::new(
            app_config,
            Arc::new(RealFileOps),
            Arc::new(TomlConfigLoader::new(Arc::new(RealFileOps))),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn load_skips_port_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        write_api(dir.path(), "firstApi", 7001);
        write_api(dir.path(), "secondApi", 7001);

        let hub = controller(dir.path(), 1);
        hub.load().await.unwrap();

        let fleet = hub.shared.fleet.read().await;
        assert_eq!(fleet.len(), 1);
    }

    #[tokio::test]
    async fn load_populates_fleet_by_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        write_api(dir.path(), "widgetsApi", 7101);

        let hub = controller(dir.path(), 1);
        hub.load().await.unwrap();

        let fleet = hub.shared.fleet.read().await;
        assert!(fleet.contains_key("widgetsApi"));
        assert_eq!(fleet.get("widgetsApi").unwrap().port(), 7101);
    }

    #[test]
    fn dispatcher_construction_rejects_zero_port() {
        let config = APIConfig {
            base_url: "x".into(),
            endpoints: HashMap::from([(
                "a".to_string(),
                Endpoint { path: "a".into(), ..Default::default() },
            )]),
            ..Default::default()
        };
        let err =
            build_dispatcher(config, std::path::Path::new("."), Arc::new(RealFileOps)).unwrap_err();
        assert!(matches!(err, crate::error::HubError::NoPort));
    }
}
