//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes the expense operations as tools
//! for AI agent integration. The server communicates via JSON-RPC over stdio.

mod mcp_utils;
mod tools;

use crate::error::{ErrorType, IntoResult};
use crate::Config;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use std::sync::Arc;
use tracing::info;

/// The expenses MCP server.
///
/// All tools share one `Config`, and through it one database handle.
#[derive(Debug, Clone)]
pub struct ExpenseServer {
    config: Arc<Config>,
    tool_router: ToolRouter<ExpenseServer>,
}

impl ExpenseServer {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for ExpenseServer {
    /// Returns server information sent to the MCP client during initialization. The
    /// `instructions` describe the tools and the conventions shared by their arguments.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "expenses".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with stdio transport or mock transport. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
///
/// # Arguments
/// - `config`: The `Config` object
/// - `io`: Whether we are using stdio as the transport or using mock io for testing
pub(crate) async fn run_server(config: Config, io: Io) -> crate::Result<()> {
    let count = config
        .db()
        .count_expenses()
        .await
        .pub_result(ErrorType::Database)?;
    info!(
        "Starting MCP server with {count} expenses in {}",
        config.sqlite_path().display()
    );
    let db = config.db().clone();
    let server = ExpenseServer::new(config);

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    // Runs until the client disconnects or the transport fails.
    let waited = service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service);
    db.close().await;
    waited?;

    info!("MCP server shut down");
    Ok(())
}
