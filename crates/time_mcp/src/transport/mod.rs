//! Channels the time service can be served over.
//!
//! Both variants share one lifecycle: `start` blocks until the cancellation
//! token fires (returning [`TransportError::Cancelled`]) or the channel fails,
//! and `stop` may be called any number of times.

pub mod sse;
pub mod stdio;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Mode};
use crate::errors::TransportError;
use crate::registry::ToolRegistry;

pub use sse::SseTransport;
pub use stdio::StdioTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Serve until `cancel` fires or the channel fails
    async fn start(&self, cancel: CancellationToken) -> Result<(), TransportError>;

    /// Release held resources; safe when never started or already stopped
    async fn stop(&self) -> Result<(), TransportError>;

    fn name(&self) -> &'static str;
}

/// Build the transport selected by `config.mode`
pub fn create_transport(config: &Config, registry: Arc<ToolRegistry>) -> Box<dyn Transport> {
    match config.mode {
        Mode::Stdio => Box::new(StdioTransport::new(registry)),
        Mode::Sse => Box::new(SseTransport::new(
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port)),
            registry,
        )),
    }
}
