//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use api_base::config::AppConfig;
use api_base::example::InMemoryExampleRepository;
use api_base::http::HttpServer;
use api_base::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A running server. Dropping it shuts the server down.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub config_updates: mpsc::UnboundedSender<AppConfig>,
    shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Test configuration: security on, auth off, small timeouts.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app.env = "test".to_string();
    config
}

/// Start a server on an ephemeral port.
pub async fn spawn_app(config: AppConfig) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, Arc::new(InMemoryExampleRepository::default()));
    tokio::spawn(server.run(listener, updates_rx, shutdown.subscribe()));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        config_updates,
        shutdown,
    }
}

/// Send a request line verbatim, bypassing client-side URL normalization.
/// Returns the response status code.
pub async fn raw_get(addr: SocketAddr, target: &str) -> u16 {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {target} HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nConnection: close\r\n\r\n",
        addr.port()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let text = String::from_utf8_lossy(&response);

    text.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}
