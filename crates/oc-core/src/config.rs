//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. An optional `oc-bridge.toml` file
//! 3. Defaults
//!
//! `${VAR_NAME}` inside the config file expands to the environment variable's
//! value (empty string when unset).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    #[serde(default)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,

    /// Token cap for each Messages API call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: None,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u64 {
    1000
}

/// Chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tool server address the client connects to
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Append-only log file for the client process
    #[serde(default = "default_client_log")]
    pub log_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            log_file: default_client_log(),
        }
    }
}

/// Tool server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the SSE transport
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory of installed annotator modules
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    /// Append-only log file for the server process
    #[serde(default = "default_server_log")]
    pub log_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            modules_dir: default_modules_dir(),
            log_file: default_server_log(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_modules_dir() -> String {
    "modules".to_string()
}

fn default_client_log() -> String {
    "app.log".to_string()
}

fn default_server_log() -> String {
    "tool.log".to_string()
}

/// Main configuration for oc-bridge
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Chat client configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Tool server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references against the process environment.
    ///
    /// Unset variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next();
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from `./oc-bridge.toml` when present, otherwise
    /// from environment variables alone.
    pub fn load() -> crate::Result<Self> {
        if Path::new("oc-bridge.toml").exists() {
            return Self::from_toml_file("oc-bridge.toml");
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Overwrite file/default values with environment variables.
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        } else if let Ok(api_key) = std::env::var("CLAUDE_API_KEY") {
            self.llm.api_key = api_key;
        }

        if let Ok(model) = std::env::var("LLM_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        } else if let Ok(model) = std::env::var("CLAUDE_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }

        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            if !base_url.is_empty() {
                self.llm.base_url = Some(base_url);
            }
        }

        if let Ok(max_tokens) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = max_tokens.parse() {
                self.llm.max_tokens = n;
            }
        }

        if let Ok(url) = std::env::var("OC_SERVER_URL") {
            if !url.is_empty() {
                self.client.server_url = url;
            }
        }

        if let Ok(addr) = std::env::var("OC_BIND_ADDR") {
            if !addr.is_empty() {
                self.server.bind_addr = addr;
            }
        }

        if let Ok(dir) = std::env::var("OC_MODULES_DIR") {
            if !dir.is_empty() {
                self.server.modules_dir = dir;
            }
        }

        // One override for either process; each binary reads its own section.
        if let Ok(path) = std::env::var("OC_LOG_FILE") {
            if !path.is_empty() {
                self.client.log_file = path.clone();
                self.server.log_file = path;
            }
        }
    }

    /// Get the effective LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }
}
