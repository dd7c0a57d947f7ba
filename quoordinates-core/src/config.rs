// ABOUTME: Configuration parsing from TOML file with environment variable overrides
// ABOUTME: Validates required credentials and provides defaults for everything else
use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Largest page the platform returns for one message history request
pub const MAX_THREAD_PAGE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
    /// Book title -> purchase/info link, used for quote attribution
    #[serde(default)]
    pub books: HashMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Inbound interaction gateway (HTTP)
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Shared secret expected in the `X-Api-Key` header. Unset disables the check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Chat platform REST API used for replies and thread history
#[derive(Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_platform_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub bot_token: String,
    /// Page size for thread history requests (the platform allows 1..=100)
    #[serde(default = "default_thread_history_limit")]
    pub thread_history_limit: u32,
    /// Upper bound on thread messages read when deduplicating quotes
    #[serde(default = "default_thread_history_max")]
    pub thread_history_max: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base: default_platform_api_base(),
            application_id: String::new(),
            bot_token: String::new(),
            thread_history_limit: default_thread_history_limit(),
            thread_history_max: default_thread_history_max(),
        }
    }
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_base", &self.api_base)
            .field("application_id", &self.application_id)
            .field("bot_token", &"[REDACTED]")
            .field("thread_history_limit", &self.thread_history_limit)
            .field("thread_history_max", &self.thread_history_max)
            .finish()
    }
}

/// OpenAI-compatible completion and image generation
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_completion_model")]
    pub completion_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            completion_model: default_completion_model(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("completion_model", &self.completion_model)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Quote similarity search service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesConfig {
    #[serde(default)]
    pub search_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            search_url: String::new(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rotated log files into this directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
            dir: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    13100
}

fn default_platform_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_thread_history_limit() -> u32 {
    MAX_THREAD_PAGE
}

fn default_thread_history_max() -> u32 {
    1000
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_results() -> u32 {
    5
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Expand tilde (~) to home directory in paths
fn expand_tilde(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            return base_dirs
                .home_dir()
                .join(stripped)
                .to_string_lossy()
                .to_string();
        }
        tracing::warn!(path = %path, "Could not determine home directory for tilde expansion");
    }
    path.to_string()
}

impl Config {
    /// Find the config file, checking in order:
    /// 1. QUOORDINATES_CONFIG_PATH env var (if set)
    /// 2. ./config.toml
    /// 3. ~/.config/quoordinates/config.toml
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var("QUOORDINATES_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
        }

        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let xdg_config = paths::config_file();
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        None
    }

    /// Parse a TOML document without env overrides or validation
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<Config>(content).context("Invalid configuration TOML")
    }

    /// Load configuration from file, apply environment overrides, and validate
    pub fn load() -> Result<Self> {
        let mut config = if let Some(config_path) = Self::find_config_file() {
            tracing::info!(path = %config_path.display(), "Loading configuration from file");
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            tracing::info!("No config file found, using environment variables and defaults");
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("GATEWAY_HOST") {
            self.gateway.host = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_PORT") {
            self.gateway.port = val.parse().with_context(|| {
                format!("GATEWAY_PORT must be a valid port number, got: {}", val)
            })?;
        }
        if let Ok(val) = std::env::var("GATEWAY_API_KEY") {
            self.gateway.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("PLATFORM_API_BASE") {
            self.platform.api_base = val;
        }
        if let Ok(val) = std::env::var("PLATFORM_APPLICATION_ID") {
            self.platform.application_id = val;
        }
        if let Ok(val) = std::env::var("PLATFORM_BOT_TOKEN") {
            self.platform.bot_token = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = val;
        }
        if let Ok(val) = std::env::var("OPENAI_BASE_URL") {
            self.openai.base_url = val;
        }
        if let Ok(val) = std::env::var("QUOTE_SEARCH_URL") {
            self.quotes.search_url = val;
        }
        if let Some(dir) = self.logging.dir.as_deref() {
            self.logging.dir = Some(expand_tilde(dir));
        }
        Ok(())
    }

    /// Check that every credential and endpoint needed at runtime is present
    pub fn validate(&self) -> Result<()> {
        if self.platform.bot_token.trim().is_empty() {
            anyhow::bail!(
                "platform.bot_token is required (set in config.toml or PLATFORM_BOT_TOKEN env var)"
            );
        }
        if self.platform.application_id.trim().is_empty() {
            anyhow::bail!(
                "platform.application_id is required (set in config.toml or PLATFORM_APPLICATION_ID env var)"
            );
        }
        if self.openai.api_key.trim().is_empty() {
            anyhow::bail!(
                "openai.api_key is required (set in config.toml or OPENAI_API_KEY env var)"
            );
        }
        if self.quotes.search_url.trim().is_empty() {
            anyhow::bail!(
                "quotes.search_url is required (set in config.toml or QUOTE_SEARCH_URL env var)"
            );
        }
        if !(1..=MAX_THREAD_PAGE).contains(&self.platform.thread_history_limit) {
            anyhow::bail!(
                "platform.thread_history_limit must be between 1 and {}, got {}",
                MAX_THREAD_PAGE,
                self.platform.thread_history_limit
            );
        }
        if self.platform.thread_history_max < self.platform.thread_history_limit {
            anyhow::bail!(
                "platform.thread_history_max ({}) must be at least platform.thread_history_limit ({})",
                self.platform.thread_history_max,
                self.platform.thread_history_limit
            );
        }
        if self.quotes.max_results == 0 {
            anyhow::bail!("quotes.max_results must be at least 1");
        }
        Ok(())
    }
}
