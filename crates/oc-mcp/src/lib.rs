//! oc-mcp: MCP session handle for the annotation chat client
//!
//! Wraps the rmcp SDK's SSE client transport behind the small surface the
//! conversation loop needs: connect, list tools, invoke, close.

pub mod client;

pub use client::{normalize_endpoint, McpSession, McpTool};
