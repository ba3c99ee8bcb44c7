//! Configuration types for the zak service.
//!
//! Configuration is assembled once at startup: TOML file (optional), then
//! environment overrides, then validation. The resulting [`QaConfig`] is
//! passed by reference into the components; nothing downstream reads the
//! environment.

use crate::error::{QaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use zak_search::{FetchConfig, FetchStrategy, SearchConfig};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "ZAK_CONFIG";

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Search API settings.
    pub search: SearchConfig,
    /// Page fetch settings.
    pub fetch: FetchConfig,
    /// Language model settings.
    pub llm: LlmConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
}

/// Language model API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini API key. Required; validated at startup.
    pub api_key: String,
    /// API base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Cap on corpus characters embedded in the prompt. `None` embeds it all.
    pub max_corpus_chars: Option<usize>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            model: "gemini-2.0-flash".to_owned(),
            timeout_seconds: 30,
            max_corpus_chars: None,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("LlmConfig")
            .field("api_key", &key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_corpus_chars", &self.max_corpus_chars)
            .finish()
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Origins allowed to call `/api/*` from a browser.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5000,
            allowed_origins: vec!["https://zak-beta.vercel.app".to_owned()],
        }
    }
}

impl QaConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| QaError::Config(e.to_string()))
    }

    /// Assemble startup configuration from `.env`, the optional
    /// `ZAK_CONFIG` file and the process environment, then validate it.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if a required key is missing or any value
    /// is invalid. Callers treat this as fatal.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }

        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment values using `lookup` for each variable.
    ///
    /// Recognised: `SERPAPI_KEY`, `GEMINI_API_KEY`, `PORT`, `ZAK_HOST`,
    /// `ZAK_ALLOWED_ORIGINS` (comma-separated), `ZAK_FETCH_STRATEGY`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] for an unparsable port or unknown strategy.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("SERPAPI_KEY") {
            self.search.api_key = key.trim().to_owned();
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.llm.api_key = key.trim().to_owned();
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| QaError::Config(format!("PORT must be a valid port number: {port}")))?;
        }
        if let Some(host) = lookup("ZAK_HOST") {
            self.server.host = host.trim().to_owned();
        }
        if let Some(origins) = lookup("ZAK_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(name) = lookup("ZAK_FETCH_STRATEGY") {
            self.fetch.strategy = FetchStrategy::parse(&name).ok_or_else(|| {
                QaError::Config(format!("unknown fetch strategy: {name}"))
            })?;
        }
        Ok(())
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.search
            .validate()
            .map_err(|e| QaError::Config(format!("search: {e}")))?;
        self.fetch
            .validate()
            .map_err(|e| QaError::Config(format!("fetch: {e}")))?;
        if self.llm.api_key.trim().is_empty() {
            return Err(QaError::Config("llm api_key is not set (GEMINI_API_KEY)".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(QaError::Config("llm model must not be empty".into()));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(QaError::Config(
                "llm timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(QaError::Config("server host must not be empty".into()));
        }
        Ok(())
    }
}
