//! Claude Messages API client and wire types

mod client;
mod types;

pub use client::ClaudeClient;
pub use types::*;
