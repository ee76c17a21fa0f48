//! Error types for oc-core

use thiserror::Error;

/// Main error type for the oc-bridge workspace
///
/// `Connection` and `Protocol` are fatal to a client run. `ToolExecution`
/// is recovered by the conversation loop and surfaced inline in the answer.
/// `Upstream` marks annotate-API failures on the server side; the server
/// layer reports it to the calling session as a tool execution failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("upstream annotate API error: {0}")]
    Upstream(String),

    #[error("Claude API error: {0}")]
    ClaudeApi(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `ToolExecution` error carrying the failing tool's name.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for oc-core
pub type Result<T> = std::result::Result<T, Error>;
