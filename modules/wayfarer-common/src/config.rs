use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Claude,
}

impl ModelProvider {
    /// Environment variable holding this provider's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ModelProvider::Gemini => "GEMINI_API_KEY",
            ModelProvider::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelProvider::Gemini => f.write_str("gemini"),
            ModelProvider::Claude => f.write_str("claude"),
        }
    }
}

impl FromStr for ModelProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ModelProvider::Gemini),
            "claude" | "anthropic" => Ok(ModelProvider::Claude),
            other => Err(anyhow!("unknown MODEL_PROVIDER '{other}' (expected gemini or claude)")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// API keys are not stored here; [`Config::model_credential`] reads them per request.
#[derive(Debug, Clone)]
pub struct Config {
    // Model
    pub model_provider: ModelProvider,
    pub gemini_model: String,
    pub claude_model: String,
    pub gemini_api_base: Option<String>,
    pub model_timeout_secs: u64,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub max_body_bytes: usize,

    // CORS
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            model_provider: env::var("MODEL_PROVIDER")
                .unwrap_or_else(|_| "gemini".to_string())
                .parse()?,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-lite".to_string()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".to_string()),
            gemini_api_base: env::var("GEMINI_API_BASE")
                .ok()
                .map(|value| value.trim().trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty()),
            model_timeout_secs: env::var("MODEL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("MODEL_TIMEOUT_SECS must be a number")?,
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("WEB_PORT must be a number")?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| (25 * 1024 * 1024).to_string())
                .parse()
                .context("MAX_BODY_BYTES must be a number")?,
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }

    /// The configured provider's API key, read from the environment now.
    pub fn model_credential(&self) -> Option<String> {
        env::var(self.model_provider.credential_var())
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn model_name(&self) -> &str {
        match self.model_provider {
            ModelProvider::Gemini => &self.gemini_model,
            ModelProvider::Claude => &self.claude_model,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_provider: ModelProvider::Gemini,
            gemini_model: "gemini-2.5-flash-lite".to_string(),
            claude_model: "claude-sonnet-4-5-20250929".to_string(),
            gemini_api_base: None,
            model_timeout_secs: 120,
            web_host: "0.0.0.0".to_string(),
            web_port: 3000,
            max_body_bytes: 25 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
