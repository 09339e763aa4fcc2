use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::errors::TransportError;
use crate::registry::ToolRegistry;
use crate::server::TimeService;
use crate::transport::Transport;

const NAME: &str = "sse";

pub const SSE_PATH: &str = "/sse";
pub const POST_PATH: &str = "/message";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// MCP over HTTP: clients open `GET /sse` and post requests to `/message`.
///
/// Accept and dispatch run on a spawned task so `start` can race it against
/// the cancellation token.
pub struct SseTransport {
    addr: SocketAddr,
    shutdown_timeout: Duration,
    registry: Arc<ToolRegistry>,
    shutdown: Mutex<Option<CancellationToken>>,
}

impl SseTransport {
    pub fn new(addr: SocketAddr, registry: Arc<ToolRegistry>) -> Self {
        Self {
            addr,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            registry,
            shutdown: Mutex::new(None),
        }
    }

    /// How long open connections get to finish after cancellation
    #[cfg(test)]
    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn start(&self, cancel: CancellationToken) -> Result<(), TransportError> {
        tracing::info!("Starting SSE transport on {}", self.addr);

        // Bind failures surface here, before any wait on cancellation
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: self.addr,
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::serve(NAME, e))?;

        let token = cancel.child_token();
        *self.shutdown.lock().await = Some(token.clone());

        let server_ct = CancellationToken::new();
        let (sse_server, router) = SseServer::new(SseServerConfig {
            bind: local_addr,
            sse_path: SSE_PATH.to_string(),
            post_path: POST_PATH.to_string(),
            ct: server_ct.clone(),
            sse_keep_alive: Some(KEEP_ALIVE),
        });

        let graceful = server_ct.clone().cancelled_owned();
        let mut serve_task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
        });

        let registry = self.registry.clone();
        let _service_ct = sse_server.with_service(move || TimeService::new(registry.clone()));

        tracing::info!(
            "SSE transport listening on {} (stream: {}, messages: {})",
            local_addr,
            SSE_PATH,
            POST_PATH
        );

        tokio::select! {
            biased;

            _ = token.cancelled() => {
                tracing::info!("SSE transport cancelled, shutting down");
                server_ct.cancel();

                if tokio::time::timeout(self.shutdown_timeout, &mut serve_task).await.is_err() {
                    tracing::warn!(
                        "Graceful shutdown exceeded {:?}, dropping open connections",
                        self.shutdown_timeout
                    );
                    serve_task.abort();
                }

                Err(TransportError::Cancelled { transport: NAME })
            }
            result = &mut serve_task => {
                server_ct.cancel();

                let message = match result {
                    Ok(Ok(())) => "server stopped unexpectedly".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => e.to_string(),
                };
                tracing::error!("SSE server failed: {}", message);

                Err(TransportError::Serve {
                    transport: NAME,
                    message,
                })
            }
        }
    }

    async fn stop(&self) -> Result<(), TransportError> {
        if let Some(token) = self.shutdown.lock().await.take() {
            tracing::info!("Stopping SSE transport");
            token.cancel();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, TcpListener as StdTcpListener};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;
    use crate::core::provider::TimeOperations;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::with_time_tools(TimeOperations::new()).unwrap())
    }

    fn free_addr() -> SocketAddr {
        let listener = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap()
    }

    #[test]
    fn test_name() {
        let transport = SseTransport::new(free_addr(), registry());
        assert_eq!(transport.name(), "sse");
    }

    #[tokio::test]
    async fn test_occupied_port_fails_fast() {
        let occupied = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = occupied.local_addr().unwrap();

        let transport = SseTransport::new(addr, registry());
        let cancel = CancellationToken::new();

        // Never cancelled: start must still return on its own
        let outcome = tokio::time::timeout(TIMEOUT, transport.start(cancel))
            .await
            .unwrap();

        assert!(matches!(outcome, Err(TransportError::Bind { addr: a, .. }) if a == addr));
    }

    #[tokio::test]
    async fn test_context_cancellation() {
        let transport = Arc::new(SseTransport::new(free_addr(), registry()));
        let cancel = CancellationToken::new();

        let server = {
            let transport = transport.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { transport.start(cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let outcome = tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
        assert!(matches!(outcome, Err(ref e) if e.is_cancelled()));
    }

    #[tokio::test]
    async fn test_stream_opens_then_shutdown_is_bounded() {
        let addr = free_addr();
        let transport = Arc::new(
            SseTransport::new(addr, registry()).with_shutdown_timeout(Duration::from_millis(500)),
        );
        let cancel = CancellationToken::new();

        let server = {
            let transport = transport.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { transport.start(cancel).await })
        };

        let mut stream = loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        };
        stream
            .write_all(b"GET /sse HTTP/1.1\r\nHost: localhost\r\nAccept: text/event-stream\r\n\r\n")
            .await
            .unwrap();

        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        tokio::time::timeout(TIMEOUT, async {
            while !String::from_utf8_lossy(&received).contains(POST_PATH) {
                let n = stream.read(&mut buf).await.unwrap();
                assert!(n > 0, "stream closed before endpoint event");
                received.extend_from_slice(&buf[..n]);
            }
        })
        .await
        .unwrap();

        let head = String::from_utf8_lossy(&received);
        assert!(head.starts_with("HTTP/1.1 200"));
        assert!(head.contains("event: endpoint"));

        // The open stream must not keep shutdown waiting forever
        transport.stop().await.unwrap();
        let outcome = tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
        assert!(matches!(outcome, Err(ref e) if e.is_cancelled()));
    }
}
