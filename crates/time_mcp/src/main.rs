mod cli;
mod config;
mod core;
mod errors;
mod registry;
mod server;
mod transport;
mod utils;

use std::process::ExitCode;

use cli::Cli;
use errors::AppError;
use utils::logging;

/// Time MCP Server
///
/// Serves `getCurrentTime` and `getUnixTimestamp` over stdio (default) or HTTP+SSE.
///
/// Usage: npx @modelcontextprotocol/inspector cargo run --bin mcp-server-time
fn main() -> ExitCode {
    // Invalid configuration ends the process before any server state exists
    let config = match Cli::parse_config() {
        Ok(config) => config,
        Err(e) => {
            let field = e.field();
            eprintln!("Error: {}", AppError::from(e));
            eprintln!(
                "Check --{} or MCP_{}",
                field,
                field.to_uppercase().replace('-', "_")
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(config.log_level) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(async {
        match server::run(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("Error running Time MCP server: {}", e);
                ExitCode::FAILURE
            }
        }
    });

    // A pending stdin read sits on a blocking thread that cannot be interrupted
    runtime.shutdown_background();
    code
}
