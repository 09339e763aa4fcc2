use std::sync::Arc;

use rmcp::{
    RoleServer, ServerHandler,
    model::*,
    service::RequestContext,
};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::{error::McpResult, models::ToolInvocation, provider::TimeOperations};
use crate::errors::AppResult;
use crate::registry::ToolRegistry;
use crate::transport;

/// Time MCP Server fronting the tool registry
#[derive(Clone)]
pub struct TimeService {
    registry: Arc<ToolRegistry>,
}

impl TimeService {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for TimeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Time MCP Server. Tools: getCurrentTime (optional timezone and format, defaults to UTC in RFC3339), getUnixTimestamp. Format tokens: YYYY, YY, MM, DD, HH, hh, mm, ss, SSS."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> McpResult<ListToolsResult> {
        Ok(ListToolsResult {
            tools: self.registry.descriptors().to_vec(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        CallToolRequestParam { name, arguments }: CallToolRequestParam,
        _: RequestContext<RoleServer>,
    ) -> McpResult<CallToolResult> {
        let invocation = ToolInvocation::new(name, arguments.unwrap_or_default());
        let result = self.registry.invoke(invocation).inspect_err(|e| {
            tracing::debug!("tool call failed: {}", e);
        })?;

        Ok(CallToolResult::success(vec![Content::text(result.text)]))
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<InitializeResult> {
        tracing::info!("Time MCP Server initialized successfully");
        Ok(self.get_info())
    }
}

/// Serve until a shutdown signal arrives or the transport fails
pub async fn run(config: Config) -> AppResult<()> {
    let registry = Arc::new(ToolRegistry::with_time_tools(TimeOperations::new())?);
    let transport = transport::create_transport(&config, registry);

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    tracing::info!(
        mode = %config.mode,
        port = config.port,
        timeout = ?config.timeout,
        "Starting Time MCP server"
    );

    let outcome = transport.start(cancel.clone()).await;

    if let Err(e) = transport.stop().await {
        tracing::warn!("Error while stopping {} transport: {}", transport.name(), e);
    }
    cancel.cancel();

    match outcome {
        Err(e) if e.is_cancelled() => {
            tracing::info!("Time MCP server shut down cleanly");
            Ok(())
        }
        Err(e) => Err(e.into()),
        Ok(()) => {
            tracing::info!("Input closed, Time MCP server exiting");
            Ok(())
        }
    }
}

/// Cancel `cancel` on SIGINT or SIGTERM
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => return,
    }

    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
