//! MCP session handle
//!
//! Owns one SSE connection to a tool server: the transport, the negotiated
//! session, and the connect/list/invoke/close lifecycle.

use rmcp::{
    model::{CallToolRequestParam, Tool},
    service::{RoleClient, RunningService, ServiceExt},
    transport::SseClientTransport,
};
use serde_json::Value as JsonValue;
use tracing::info;

use oc_core::{Error, Result};

/// Tool descriptor as retrieved from the server
///
/// Immutable once listed; refreshed only by listing again.
#[derive(Debug, Clone)]
pub struct McpTool {
    /// Tool name, unique within a session
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for input parameters
    pub input_schema: JsonValue,
}

impl From<Tool> for McpTool {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.clone().unwrap_or_default().to_string(),
            input_schema: serde_json::to_value(&tool.input_schema).unwrap_or(JsonValue::Null),
        }
    }
}

/// Normalize a server address into its SSE endpoint.
///
/// Trailing slashes are stripped and the `/sse` suffix is appended exactly
/// once, so `http://host` and `http://host/sse` target the same endpoint.
pub fn normalize_endpoint(address: &str) -> String {
    let trimmed = address.trim_end_matches('/');
    let base = trimmed.strip_suffix("/sse").unwrap_or(trimmed);
    format!("{}/sse", base)
}

/// Client session with one MCP tool server
pub struct McpSession {
    /// Inner rmcp running service; `None` once the session is closed
    service: Option<RunningService<RoleClient, ()>>,
    /// Server name for identification
    server_name: String,
}

impl McpSession {
    /// Connect to a tool server over SSE
    ///
    /// Establishes the transport against the normalized `/sse` endpoint,
    /// runs the protocol handshake, and fetches the tool catalog once to
    /// prove the session is usable.
    pub async fn connect(address: &str) -> Result<Self> {
        let endpoint = normalize_endpoint(address);
        info!("Connecting to MCP server at {}", endpoint);

        let transport = SseClientTransport::start(endpoint.clone())
            .await
            .map_err(|e| Error::Connection(format!("Failed to reach {}: {}", endpoint, e)))?;

        // Serve with unit type handler (client-only mode)
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| Error::Connection(format!("Handshake failed: {}", e)))?;

        let server_name = service
            .peer_info()
            .map(|peer| peer.server_info.name.clone().to_string())
            .ok_or_else(|| Error::Protocol("handshake returned no usable session".to_string()))?;

        let session = Self {
            service: Some(service),
            server_name,
        };

        let tools = session.list_tools().await?;
        info!(
            server_name = %session.server_name,
            tool_count = tools.len(),
            "Connected to MCP server"
        );

        Ok(session)
    }

    /// Get the server name
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    fn service(&self) -> Result<&RunningService<RoleClient, ()>> {
        self.service
            .as_ref()
            .ok_or_else(|| Error::Protocol("session is closed".to_string()))
    }

    /// List available tools from the server
    ///
    /// May be called repeatedly; never mutates server state.
    pub async fn list_tools(&self) -> Result<Vec<McpTool>> {
        let result = self
            .service()?
            .list_tools(Default::default())
            .await
            .map_err(|e| Error::Protocol(format!("Failed to list tools: {}", e)))?;

        let tools = result.tools.into_iter().map(McpTool::from).collect();
        Ok(tools)
    }

    /// Call one tool and wait for its result
    ///
    /// Returns the result payload as text. A failure reported by the server
    /// becomes `Error::ToolExecution` carrying the tool name; callers
    /// surface it inline rather than aborting the conversation.
    pub async fn call_tool(&self, name: &str, args: JsonValue) -> Result<String> {
        let arguments = args.as_object().cloned();

        let result = self
            .service()?
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await
            .map_err(|e| Error::tool(name, e.to_string()))?;

        let output = result
            .content
            .into_iter()
            .filter_map(|c| {
                if let rmcp::model::RawContent::Text(text) = c.raw {
                    Some(text.text)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error.unwrap_or(false) {
            return Err(Error::tool(name, output));
        }

        Ok(output)
    }

    /// Release the transport and session
    ///
    /// Safe to call multiple times; the second call finds the session
    /// already gone and returns `Ok`.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(service) = self.service.take() {
            service
                .cancel()
                .await
                .map_err(|e| Error::Connection(format!("Shutdown failed: {}", e)))?;
            info!(server_name = %self.server_name, "MCP session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoint_appends_suffix() {
        assert_eq!(normalize_endpoint("http://host"), "http://host/sse");
        assert_eq!(normalize_endpoint("http://host/"), "http://host/sse");
    }

    #[test]
    fn test_normalize_endpoint_is_idempotent() {
        // An address already ending in /sse must not get a second suffix.
        assert_eq!(normalize_endpoint("http://host/sse"), "http://host/sse");
        assert_eq!(normalize_endpoint("http://host/sse/"), "http://host/sse");
        assert_eq!(
            normalize_endpoint("http://host"),
            normalize_endpoint("http://host/sse")
        );
    }

    #[test]
    fn test_normalize_endpoint_keeps_port_and_path() {
        assert_eq!(
            normalize_endpoint("http://localhost:8000"),
            "http://localhost:8000/sse"
        );
        assert_eq!(
            normalize_endpoint("https://annotate.example.com/mcp/"),
            "https://annotate.example.com/mcp/sse"
        );
    }

    fn closed_session() -> McpSession {
        McpSession {
            service: None,
            server_name: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_close_twice_is_a_noop() {
        let mut session = closed_session();
        assert!(session.close().await.is_ok());
        assert!(session.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_session_rejects_operations() {
        let session = closed_session();
        assert!(matches!(
            session.list_tools().await,
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            session.call_tool("get_rsid", serde_json::json!({})).await,
            Err(Error::Protocol(_))
        ));
    }
}
