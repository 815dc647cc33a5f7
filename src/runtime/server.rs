//! Controller HTTP server.

use crate::access_log::{AccessLog, AccessLogEntry};
use crate::api::{respond_with_error, write_response, Api};
use crate::error::ApiError;
use crate::http::{ApiRequest, Method};
use crate::router::RouteTable;
use crate::runtime::ControllerConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// State shared by every connection.
struct Shared {
    api: Api,
    routes: RouteTable,
    access_log: AccessLog,
    max_body_size: usize,
}

/// Controller server: the route table and the API behind an access log.
pub struct ControllerServer {
    config: ControllerConfig,
    shared: Shared,
}

impl ControllerServer {
    pub fn new(config: ControllerConfig, api: Api) -> Self {
        let shared = Shared {
            api,
            routes: RouteTable::controller(),
            access_log: AccessLog::stdout(),
            max_body_size: config.max_body_size,
        };
        Self { config, shared }
    }

    /// Send access log lines somewhere other than stdout.
    pub fn with_access_log(mut self, access_log: AccessLog) -> Self {
        self.shared.access_log = access_log;
        self
    }

    /// Bind the listener without accepting connections yet.
    pub async fn bind(self) -> Result<BoundServer, ServeError> {
        let addr_str = self.config.bind_addr();
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|source| ServeError::InvalidAddress {
                addr: addr_str.clone(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServeError::Bind { addr, source })?;

        info!(port = local_addr.port(), "Server started");

        Ok(BoundServer {
            listener,
            local_addr,
            shared: Arc::new(self.shared),
        })
    }

    /// Bind and serve until the process exits.
    ///
    /// Only returns on a startup failure; the caller decides whether that
    /// is fatal.
    pub async fn serve(self) -> Result<(), ServeError> {
        self.bind().await?.run().await;
        Ok(())
    }
}

/// A server whose listener is bound.
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    shared: Arc<Shared>,
}

impl BoundServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections forever, one task per connection.
    pub async fn run(self) {
        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    error!("Error accepting connection: {}", err);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            };
            let io = TokioIo::new(stream);
            let shared = self.shared.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let shared = shared.clone();
                    async move { Ok::<_, Infallible>(handle_request(req, shared, remote_addr).await) }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle one request and record it in the access log.
async fn handle_request(
    req: Request<Incoming>,
    shared: Arc<Shared>,
    remote_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let uri = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let mut entry = AccessLogEntry::now(
        remote_addr.ip(),
        req.method().as_str(),
        uri,
        format!("{:?}", req.version()),
    );

    debug!(method = %req.method(), path = %req.uri().path(), "handling request");

    let response = match convert_request(req, shared.max_body_size).await {
        Ok(request) => shared.api.dispatch(&shared.routes, request).await,
        Err(err) => respond_with_error(&err),
    };
    let response = write_response(response);

    entry.status = response.status().as_u16();
    entry.size = response.body().size_hint().exact().unwrap_or(0) as usize;
    shared.access_log.record(&entry);

    response
}

/// Convert a hyper request into an [`ApiRequest`].
async fn convert_request(
    req: Request<Incoming>,
    max_body_size: usize,
) -> Result<ApiRequest, ApiError> {
    let method = Method::from(req.method());
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    // Content-Length is reported as the exact size hint
    let declared = req.body().size_hint().lower();
    if declared > max_body_size as u64 {
        return Err(body_too_large(max_body_size));
    }

    let body = match Limited::new(req.into_body(), max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.is::<LengthLimitError>() => return Err(body_too_large(max_body_size)),
        Err(err) => {
            return Err(ApiError::invalid_argument(format!(
                "failed to read request: {}",
                err
            )))
        }
    };

    Ok(ApiRequest {
        method,
        path,
        query,
        headers,
        body,
        params: HashMap::new(),
    })
}

fn body_too_large(max_body_size: usize) -> ApiError {
    ApiError::SizeLimitExceeded(format!(
        "request body exceeds the {} byte limit",
        max_body_size
    ))
}
