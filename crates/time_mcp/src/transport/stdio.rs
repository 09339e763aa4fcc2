use std::sync::Arc;

use async_trait::async_trait;
use rmcp::ServiceExt;
use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::errors::TransportError;
use crate::registry::ToolRegistry;
use crate::server::TimeService;
use crate::transport::Transport;

const NAME: &str = "stdio";

/// Newline-delimited JSON-RPC over a reader/writer pair, one request at a time.
///
/// Defaults to the process stdin/stdout; any async pipe works for tests.
pub struct StdioTransport<R = Stdin, W = Stdout> {
    registry: Arc<ToolRegistry>,
    io: Mutex<Option<(R, W)>>,
    shutdown: Mutex<Option<CancellationToken>>,
}

impl StdioTransport {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_io(registry, tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn with_io(registry: Arc<ToolRegistry>, reader: R, writer: W) -> Self {
        Self {
            registry,
            io: Mutex::new(Some((reader, writer))),
            shutdown: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn start(&self, cancel: CancellationToken) -> Result<(), TransportError> {
        let io = self
            .io
            .lock()
            .await
            .take()
            .ok_or_else(|| TransportError::serve(NAME, "transport already started"))?;

        let token = cancel.child_token();
        *self.shutdown.lock().await = Some(token.clone());

        tracing::info!("Starting stdio transport");

        let service = TimeService::new(self.registry.clone());
        let running = tokio::select! {
            biased;

            _ = token.cancelled() => {
                tracing::info!("stdio transport cancelled before initialization");
                return Err(TransportError::Cancelled { transport: NAME });
            }
            result = service.serve_with_ct(io, token.clone()) => {
                result.map_err(|e| failure(&token, e))?
            }
        };

        // Ends on cancellation (the service shares `token`) or end of input
        running.waiting().await.map_err(|e| failure(&token, e))?;

        if token.is_cancelled() {
            tracing::info!("stdio transport cancelled, shutting down");
            Err(TransportError::Cancelled { transport: NAME })
        } else {
            tracing::info!("stdio input closed");
            Ok(())
        }
    }

    async fn stop(&self) -> Result<(), TransportError> {
        if let Some(token) = self.shutdown.lock().await.take() {
            tracing::info!("Stopping stdio transport");
            token.cancel();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// Errors raised while `token` is cancelled are the shutdown itself
fn failure(token: &CancellationToken, error: impl ToString) -> TransportError {
    if token.is_cancelled() {
        TransportError::Cancelled { transport: NAME }
    } else {
        TransportError::serve(NAME, error)
    }
}
