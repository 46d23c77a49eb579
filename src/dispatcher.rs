//! Per-API request dispatcher: one HTTP listener, one route trie, one handler table.
//!
//! The accept-loop/hyper wiring follows `lithair-core/src/http/async_server.rs`. The handler
//! factory (JSON-enforcing vs general, warn-and-drop on duplicate registration) follows
//! `original_source/api/api.go`'s `Register` and `original_source/api/api_creator.go`'s
//! `getJSONHandler`/`getGeneralHandler`/`writeError`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::{Request, Response, StatusCode};

use crate::config::api::{APIConfig, Endpoint};
use crate::fileio::FileOps;
use crate::server::ServerHandle;
use crate::trie::{PathParams, RouteTrie};

pub type RespBody = BoxBody<Bytes, Infallible>;
pub type Req = Request<hyper::body::Incoming>;
pub type Resp = Response<RespBody>;

pub fn body_from<T: Into<Bytes>>(data: T) -> RespBody {
    Full::new(data.into()).boxed()
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Resp {
    Response::builder().status(status).body(body_from(body.into())).expect("valid HTTP response")
}

/// A bound handler: the closure that serves a request for one (method, canonical path) key.
/// Kept as a named record rather than inserting the closure directly into the handler table, so
/// SPEC_FULL.md §9's per-handler fields (if any are added later) have somewhere to live.
pub struct Handler {
    serve: Arc<dyn Fn(&Req, &PathParams) -> futures::future::BoxFuture<'static, Resp> + Send + Sync>,
}

/// Owns one mock API's route trie, handler table, and listener.
pub struct ApiDispatcher {
    base_url: String,
    port: u16,
    http: crate::config::HttpConfig,
    endpoints: HashMap<String, Endpoint>,
    trie: RouteTrie,
    handlers: HashMap<(String, String), Handler>,
    file_io: Arc<dyn FileOps>,
    api_dir: std::path::PathBuf,
    server: Option<ServerHandle>,
}

impl ApiDispatcher {
    /// Constructs a dispatcher from a validated API configuration. Refuses construction if the
    /// port is zero.
    pub fn new(
        config: APIConfig,
        api_dir: impl Into<std::path::PathBuf>,
        file_io: Arc<dyn FileOps>,
    ) -> crate::error::HubResult<Self> {
        if config.http.port == 0 {
            return Err(crate::error::HubError::NoPort);
        }

        Ok(Self {
            base_url: config.base_url,
            port: config.http.port,
            http: config.http,
            endpoints: config.endpoints,
            trie: RouteTrie::new(),
            handlers: HashMap::new(),
            file_io,
            api_dir: api_dir.into(),
            server: None,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &HashMap<String, Endpoint> {
        &self.endpoints
    }

    /// Registers every configured endpoint into the trie and handler table, then spawns the
    /// accept loop. Registration errors are non-fatal: the offending endpoint is dropped and a
    /// warning logged; `start` itself always returns once registration + spawn have happened.
    pub async fn start(
        &mut self,
        default_cert: Option<&str>,
        default_key: Option<&str>,
    ) -> crate::error::HubResult<()> {
        let mut dropped = Vec::new();

        for (name, endpoint) in self.endpoints.clone() {
            let template = join_base(&self.base_url, &endpoint.path);
            let canonical = match self.trie.add(&template) {
                Ok(canonical) => canonical,
                Err(err) => {
                    log::warn!("dropping endpoint {name} ({template}): {err}");
                    dropped.push(name);
                    continue;
                }
            };

            let method = endpoint.method.to_uppercase();
            let key = (method, canonical);
            if self.handlers.contains_key(&key) {
                log::warn!("dropping endpoint {name}: {} {} already bound", key.0, key.1);
                dropped.push(name);
                continue;
            }

            let handler = build_handler(endpoint, self.api_dir.clone(), self.file_io.clone());
            self.handlers.insert(key, Handler { serve: handler });
        }

        for name in dropped {
            self.endpoints.remove(&name);
        }

        let tls = self.http.resolve_tls(default_cert, default_key)?;
        let handlers = Arc::new(std::mem::take(&mut self.handlers));
        let trie = Arc::new(std::mem::replace(&mut self.trie, RouteTrie::new()));
        let port = self.port;

        let handle = ServerHandle::bind(port, tls, move |req| {
            let handlers = handlers.clone();
            let trie = trie.clone();
            Box::pin(async move { serve(&trie, &handlers, req).await })
        })
        .await?;

        self.server = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self, deadline: std::time::Duration) -> crate::error::HubResult<()> {
        if let Some(server) = self.server.take() {
            server.shutdown(deadline).await?;
        }
        Ok(())
    }
}

fn join_base(base_url: &str, path: &str) -> String {
    if base_url.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base_url, path)
    }
}

async fn serve(
    trie: &RouteTrie,
    handlers: &HashMap<(String, String), Handler>,
    req: Req,
) -> Resp {
    let canonical_path = crate::url::canonicalise(req.uri().path());

    let (canonical, params) = match trie.resolve(&canonical_path) {
        Ok(resolved) => resolved,
        Err(_) => return not_found(),
    };

    log::debug!("resolved {canonical} params={params:?}");

    let method = req.method().as_str().to_uppercase();
    match handlers.get(&(method, canonical)) {
        Some(handler) => (handler.serve)(&req, &params).await,
        None => not_found(),
    }
}

fn not_found() -> Resp {
    text_response(StatusCode::NOT_FOUND, "endpoint not found")
}

/// Builds a handler closure per SPEC_FULL.md §4.3's handler factory. `enforce_valid_json`
/// selects between the JSON and general variants; `allow_cors` adds the CORS header trio
/// (§4.3.1, a supplement with no distilled-spec wire effect given).
fn build_handler(
    endpoint: Endpoint,
    api_dir: std::path::PathBuf,
    file_io: Arc<dyn FileOps>,
) -> Arc<dyn Fn(&Req, &PathParams) -> futures::future::BoxFuture<'static, Resp> + Send + Sync> {
    Arc::new(move |_req: &Req, _params: &PathParams| {
        let endpoint = endpoint.clone();
        let api_dir = api_dir.clone();
        let file_io = file_io.clone();
        Box::pin(async move { handle_endpoint(&endpoint, &api_dir, file_io.as_ref()).await })
            as futures::future::BoxFuture<'static, Resp>
    })
}

async fn handle_endpoint(endpoint: &Endpoint, api_dir: &std::path::Path, file_io: &dyn FileOps) -> Resp {
    let mut builder = Response::builder().status(StatusCode::OK);
    for header in &endpoint.headers {
        builder = builder.header(header.key.as_str(), header.value.as_str());
    }
    if endpoint.allow_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, PATCH, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type, Authorization");
    }

    if endpoint.file.is_empty() {
        return builder.body(body_from(Bytes::new())).expect("valid HTTP response");
    }

    let path = api_dir.join(&endpoint.file);
    let bytes = match file_io.read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => return builder.status(StatusCode::INTERNAL_SERVER_ERROR).body(body_from(err.to_string())).expect("valid HTTP response"),
    };

    if endpoint.enforce_valid_json {
        if let Err(err) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(body_from(err.to_string()))
                .expect("valid HTTP response");
        }
    }

    builder.body(body_from(bytes)).expect("valid HTTP response")
}
