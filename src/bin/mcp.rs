//! DealDesk MCP server: lets an MCP client ask the pipeline questions.
//!
//! Standalone binary that communicates over stdio using the Model Context Protocol.
//! Opens the SQLite database read-only so it can run alongside whatever writes it.
//!
//! Build: `cargo build --features mcp --bin dealdesk-mcp`

use std::sync::Arc;

use rmcp::model::*;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, ServerHandler, ServiceExt};
use serde::Deserialize;

use dealdesk_lib::commands::handle_query_request;
use dealdesk_lib::handlers::QueryRouter;
use dealdesk_lib::state::AppState;

// =============================================================================
// Server State
// =============================================================================

#[derive(Clone)]
struct DealDeskMcp {
    router: Arc<QueryRouter>,
}

// =============================================================================
// Tool Parameter Types
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
struct AskPipelineParams {
    /// The question, in plain English.
    #[schemars(description = "Question about deals, candidates, customers or competitors")]
    query: String,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool(tool_box)]
impl DealDeskMcp {
    fn new(router: Arc<QueryRouter>) -> Self {
        Self { router }
    }

    #[tool(description = "Ask DealDesk a question about the sales pipeline, hiring pipeline, customer health or competitors. Returns a JSON answer with a title, summary, matching records, insights and suggested follow-up questions. Examples: 'Which deals have gone silent?', 'Show me deals over $5,000', 'Prep for my meeting with Acme'.")]
    async fn ask_pipeline(&self, #[tool(aggr)] params: AskPipelineParams) -> String {
        let payload = serde_json::json!({ "query": params.query });
        let response = handle_query_request(self.router.clone(), &payload).await;
        serde_json::to_string_pretty(&response.body).unwrap_or_else(|e| format!("Error: {e}"))
    }
}

// =============================================================================
// ServerHandler: wires tool_box into the MCP protocol
// =============================================================================

#[tool(tool_box)]
impl ServerHandler for DealDeskMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "dealdesk".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "DealDesk MCP server. Read-only answers about deals, candidates, \
                 customers and competitors. Use ask_pipeline with a plain-English question."
                    .to_string(),
            ),
        }
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let state = AppState::new_readonly()
        .map_err(|e| anyhow::anyhow!("Failed to start DealDesk: {e}"))?;

    let server = DealDeskMcp::new(state.router.clone());

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
