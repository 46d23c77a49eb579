//! Server lifecycle wrapper: abstracts `listen_and_serve`/`listen_and_serve_tls`/`shutdown`
//! behind one stable interface, per SPEC_FULL.md §4.6.
//!
//! Grounded on `original_source/wrapper/serverops_wrapper.go`'s `IServerOps` interface for the
//! shape of the abstraction; the accept-loop plumbing follows
//! `lithair-core/src/http/async_server.rs`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::dispatcher::{Req, Resp};
use crate::error::{HubError, HubResult};

type HandlerFn = Arc<dyn Fn(Req) -> Pin<Box<dyn Future<Output = Resp> + Send>> + Send + Sync>;

/// A running listener's shutdown handle. Dropping it without calling `shutdown` leaves the
/// accept loop running until the process exits.
pub struct ServerHandle {
    stop_tx: watch::Sender<bool>,
    join: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Binds `port`, optionally wraps accepted connections in TLS using the resolved
    /// `(cert_path, key_path)` pair, and spawns the accept loop. Returns immediately once the
    /// listener is bound; binding errors are returned to the caller (unlike per-connection
    /// errors, which are logged and do not tear down the loop).
    pub async fn bind<F, Fut>(
        port: u16,
        tls: Option<(String, String)>,
        handler: F,
    ) -> HubResult<Self>
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Resp> + Send + 'static,
    {
        let addr = format!("0.0.0.0{}", crate::url::format_port(port));
        let listener = TcpListener::bind(&addr).await.map_err(|source| HubError::Io {
            path: addr.clone(),
            source,
        })?;

        let acceptor = match tls {
            Some((cert, key)) => Some(Arc::new(build_tls_acceptor(&cert, &key)?)),
            None => None,
        };

        let handler: HandlerFn = Arc::new(move |req| Box::pin(handler(req)));
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        let Ok((stream, _addr)) = accepted else { continue };
                        let handler = handler.clone();
                        let acceptor = acceptor.clone();
                        tokio::spawn(async move {
                            if let Err(err) = serve_connection(stream, acceptor, handler).await {
                                log::warn!("connection error: {err}");
                            }
                        });
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self { stop_tx, join })
    }

    /// Signals the accept loop to stop and awaits it, bounded by `deadline`. Returns an error if
    /// the deadline elapses first.
    pub async fn shutdown(self, deadline: Duration) -> HubResult<()> {
        let _ = self.stop_tx.send(true);
        tokio::time::timeout(deadline, self.join).await.map_err(|_| HubError::Io {
            path: "shutdown".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::TimedOut, "shutdown deadline elapsed"),
        })?
        .map_err(|source| HubError::Io {
            path: "shutdown".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source.to_string()),
        })
    }
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    acceptor: Option<Arc<tokio_rustls::TlsAcceptor>>,
    handler: HandlerFn,
) -> HubResult<()> {
    let service = hyper::service::service_fn(move |req| {
        let handler = handler.clone();
        async move { Ok::<_, std::convert::Infallible>(handler(req).await) }
    });

    let result = match acceptor {
        Some(acceptor) => {
            let tls_stream = acceptor.accept(stream).await.map_err(|source| HubError::Io {
                path: "tls-handshake".to_string(),
                source,
            })?;
            http1::Builder::new().serve_connection(TokioIo::new(tls_stream), service).await
        }
        None => http1::Builder::new().serve_connection(TokioIo::new(stream), service).await,
    };

    result.map_err(|source| HubError::Io {
        path: "connection".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, source.to_string()),
    })
}

fn build_tls_acceptor(cert_path: &str, key_path: &str) -> HubResult<tokio_rustls::TlsAcceptor> {
    let cert_file = std::fs::File::open(cert_path).map_err(|source| HubError::Io {
        path: cert_path.to_string(),
        source,
    })?;
    let key_file = std::fs::File::open(key_path).map_err(|source| HubError::Io {
        path: key_path.to_string(),
        source,
    })?;

    let certs: Vec<_> = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_file))
        .collect::<Result<_, _>>()
        .map_err(|_| HubError::TlsMaterialMissing { missing: "cert_file" })?;

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_file))
        .map_err(|_| HubError::TlsMaterialMissing { missing: "key_file" })?
        .ok_or(HubError::TlsMaterialMissing { missing: "key_file" })?;

    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|_| HubError::TlsMaterialMissing { missing: "cert_file" })?;

    Ok(tokio_rustls::TlsAcceptor::from(Arc::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{body_from, Resp};
    use http_body_util::BodyExt;

    async fn echo_handler(_req: Req) -> Resp {
        hyper::Response::builder().status(200).body(body_from("ok")).unwrap()
    }

    #[tokio::test]
    async fn binds_and_shuts_down_within_deadline() {
        // Port 0 asks the OS for an ephemeral free port.
        let handle = ServerHandle::bind(0, None, echo_handler).await.unwrap();
        handle.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn serves_a_request_over_the_bound_port() {
        let handle = ServerHandle::bind(18080, None, echo_handler).await.unwrap();

        let stream = tokio::net::TcpStream::connect("127.0.0.1:18080").await.unwrap();
        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await.unwrap();
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = hyper::Request::builder()
            .uri("/")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");

        handle.shutdown(Duration::from_secs(1)).await.unwrap();
    }
}
