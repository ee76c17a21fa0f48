//! MCP server handler over the tool registry
//!
//! Bridges the `ToolManager` catalog to the MCP wire protocol: `tools/list`
//! converts every registered tool into an MCP descriptor, `tools/call`
//! dispatches through the manager. Tool failures are reported as tool-level
//! errors so the calling session can recover per invocation.

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::{RequestContext, RoleServer},
    ServerHandler,
};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use oc_core::ToolManager;

/// The annotation tool service exposed to MCP sessions
#[derive(Clone)]
pub struct AnnotatorService {
    tools: Arc<ToolManager>,
}

impl AnnotatorService {
    pub fn new(tools: Arc<ToolManager>) -> Self {
        Self { tools }
    }
}

/// Convert the registry catalog into MCP tool descriptors
fn to_mcp_tools(manager: &ToolManager) -> Vec<Tool> {
    manager
        .definitions()
        .into_iter()
        .map(|def| {
            let schema = def.input_schema.as_object().cloned().unwrap_or_default();
            Tool::new(def.name, def.description, Arc::new(schema))
        })
        .collect()
}

impl ServerHandler for AnnotatorService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "oc-annotate".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::default()
            },
            instructions: Some(
                "Annotate genomic variants through OpenCRAVAT: look up alleles, \
                 rsIDs and CAids, or inspect the installed annotator modules."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: to_mcp_tools(&self.tools),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let name = request.name.to_string();
        let input = JsonValue::Object(request.arguments.unwrap_or_default());

        info!(tool = %name, "tool call");

        match self.tools.execute(&name, input).await {
            Ok(result) if !result.is_error => Ok(CallToolResult::success(vec![Content::text(
                result.output,
            )])),
            Ok(result) => {
                warn!(tool = %name, "tool reported failure: {}", result.output);
                Ok(CallToolResult::error(vec![Content::text(result.output)]))
            }
            Err(e) => {
                warn!(tool = %name, "tool execution failed: {}", e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oc_tools::register_annotation_tools;

    fn service() -> AnnotatorService {
        let mut manager = ToolManager::new();
        register_annotation_tools(&mut manager, "modules");
        AnnotatorService::new(Arc::new(manager))
    }

    #[test]
    fn test_get_info_advertises_tools() {
        let info = service().get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "oc-annotate");
    }

    #[test]
    fn test_catalog_conversion() {
        let service = service();
        let tools = to_mcp_tools(&service.tools);

        assert_eq!(tools.len(), 5);
        let mut names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "describe_annotator",
                "get_allele",
                "get_caid",
                "get_rsid",
                "list_annotators"
            ]
        );
    }
}
