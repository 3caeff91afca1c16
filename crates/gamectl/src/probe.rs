//! Minimal HTTP responder for checking that a client can reach a port.
//!
//! Every request, whatever its method or path, gets `200 OK` with the body `OK`.

use std::net::SocketAddr;

use axum::{
    Router,
    extract::{ConnectInfo, State},
    http::{StatusCode, Uri},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
}

impl ProbeConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 3000)
    }
}

pub struct ProbeServer {
    config: ProbeConfig,
}

impl ProbeServer {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        Router::new()
            .fallback(respond_ok)
            .with_state(self.config.port)
    }

    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        self.serve_on(listener).await
    }

    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        info!(address = %listener.local_addr()?, "Probe server started");

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}

async fn respond_ok(
    State(port): State<u16>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> (StatusCode, &'static str) {
    info!(port, peer = %peer, path = %uri.path(), "Connection received");
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        extract::connect_info::MockConnectInfo,
        http::{Method, Request},
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tower::ServiceExt;

    fn router() -> Router {
        ProbeServer::new(ProbeConfig::new("127.0.0.1", 4100))
            .router()
            .layer(MockConnectInfo(SocketAddr::from(([10, 0, 0, 7], 51234))))
    }

    async fn send(method: Method, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(ProbeConfig::new("127.0.0.1", 4100).bind_address(), "127.0.0.1:4100");
        assert_eq!(ProbeConfig::default().bind_address(), "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn test_root_path_returns_ok() {
        let (status, body) = send(Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_any_path_returns_ok() {
        let (status, body) = send(Method::GET, "/ws/room-1?player=avery").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_any_method_returns_ok() {
        let (status, _) = send(Method::POST, "/get-traffic").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_serves_real_connections() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = ProbeServer::new(ProbeConfig::new("127.0.0.1", address.port()));
        let handle = tokio::spawn(server.serve_on(listener));

        let mut stream = tokio::net::TcpStream::connect(address).await.unwrap();
        stream
            .write_all(b"GET /health/check HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("OK"));

        handle.abort();
    }
}
