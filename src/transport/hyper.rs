//! HTTP transport over hyper.
//!
//! Client side: one POST per exchange through a pooled
//! `hyper_util` legacy client. Server side: a plain accept loop that
//! translates hyper requests into [`InboundRequest`]s and serves them
//! through the dispatcher's HTTP edge.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Method, Request, Response, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;

use crate::domain::{
    HttpReply, Transport, TransportPtr, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON,
};
use crate::server::{fatal_response, InboundRequest, RpcServer};
use crate::{log_debug, log_info, Error, Result, RpcConfig};

/// HTTP transport backed by hyper.
struct HyperTransport {
    // ---
    client: Client<HttpConnector, Full<Bytes>>,
}

#[async_trait::async_trait]
impl Transport for HyperTransport {
    // ---
    async fn post(&self, endpoint: &str, body: Bytes) -> Result<HttpReply> {
        // ---
        let request = Request::builder()
            .method(Method::POST)
            .uri(endpoint)
            .header(CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON)
            .body(Full::new(body))
            .map_err(|err| Error::Connection(err.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|err| Error::Connection(err.to_string()))?;

        let (parts, body) = response.into_parts();

        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|text| (name.to_string(), text.to_string()))
            })
            .collect();

        let body = body
            .collect()
            .await
            .map_err(|err| Error::Connection(err.to_string()))?
            .to_bytes();

        Ok(HttpReply {
            status: parts.status.as_u16(),
            headers,
            body,
        })
    }

    async fn close(&self) -> Result<()> {
        // Connections are pooled by the legacy client and released on drop.
        Ok(())
    }
}

/// Create an HTTP transport.
///
/// The config's endpoint is resolved per post, so one transport can
/// serve several client sessions.
pub async fn create_transport(_config: &RpcConfig) -> Result<TransportPtr> {
    // ---
    let client: Client<HttpConnector, Full<Bytes>> =
        Client::builder(TokioExecutor::new()).build_http();

    Ok(Arc::new(HyperTransport { client }))
}

/// Serve an [`RpcServer`] on a TCP address.
///
/// Accepts connections until the surrounding task is dropped. This is
/// where the process-wide fault channel is installed: every request on
/// every connection flows through the dispatcher's HTTP edge, which
/// converts escaping faults into the fatal `id = 0` envelope.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the listener cannot bind or an
/// accept fails.
pub async fn serve(addr: SocketAddr, server: Arc<RpcServer>) -> Result<()> {
    // ---
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| Error::Connection(err.to_string()))?;

    log_info!("listening on {addr}");

    loop {
        let (stream, _peer) = listener
            .accept()
            .await
            .map_err(|err| Error::Connection(err.to_string()))?;

        let io = TokioIo::new(stream);
        let server = server.clone();

        tokio::spawn(async move {
            // ---
            let service = service_fn(move |request: Request<Incoming>| {
                let server = server.clone();

                async move {
                    let reply = handle(server, request).await;
                    Ok::<_, std::convert::Infallible>(to_response(reply))
                }
            });

            if let Err(_err) = http1::Builder::new().serve_connection(io, service).await {
                log_debug!("connection error: {_err}");
            }
        });
    }
}

/// Translate one hyper request into a dispatcher call.
async fn handle(server: Arc<RpcServer>, request: Request<Incoming>) -> HttpReply {
    // ---
    let (parts, body) = request.into_parts();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => return fatal_response(&Error::Connection(err.to_string())),
    };

    server
        .serve_http(InboundRequest {
            method: parts.method.to_string(),
            content_type,
            body,
        })
        .await
}

fn to_response(reply: HttpReply) -> Response<Full<Bytes>> {
    // ---
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK));

    for (name, value) in &reply.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(Full::new(reply.body))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
