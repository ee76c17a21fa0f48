//! Tool trait definition
//!
//! The server-side registry maps tool names to handlers implementing this
//! trait. Each handler declares its schema and executes one invocation.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::Result;

/// Tool execution result
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Output string from tool execution
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }
}

/// A named, schema-described function the server executes on request
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within a server
    fn name(&self) -> &str;

    /// Human-readable description shown in the catalog
    fn description(&self) -> &str;

    /// JSON schema for the tool's input parameters
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given input
    async fn execute(&self, input: JsonValue) -> Result<ToolResult>;
}
