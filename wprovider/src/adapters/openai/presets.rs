//! Connection settings for OpenAI-compatible backends.
//!
//! ```rust
//! use wprovider::{ProviderErrorKind, ProviderPreset};
//!
//! let local = ProviderPreset::LmStudio.config_with(|_| None).expect("no key needed");
//! assert_eq!(local.base_url, "http://localhost:1234/v1");
//! assert_eq!(local.default_model, "qwen/qwen3-1.7b");
//!
//! let err = ProviderPreset::OpenAi.config_with(|_| None).expect_err("key required");
//! assert_eq!(err.kind, ProviderErrorKind::Configuration);
//! ```

use std::time::Duration;

use crate::{ProviderError, ProviderId, SecretString, require_var_with};

/// Key sent to local servers that ignore authentication.
pub const LOCAL_SERVER_API_KEY: &str = "1234567890";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompatibleConfig {
    pub provider: ProviderId,
    pub base_url: String,
    pub api_key: SecretString,
    pub default_model: String,
    pub embedding_model: Option<String>,
    pub timeout: Option<Duration>,
}

impl OpenAiCompatibleConfig {
    pub fn new(
        provider: ProviderId,
        base_url: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            api_key,
            default_model: String::new(),
            embedding_model: None,
            timeout: None,
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.base_url.trim().is_empty() {
            return Err(ProviderError::configuration(format!(
                "{} base url must not be empty",
                self.provider
            )));
        }

        if self.api_key.is_empty() {
            return Err(ProviderError::configuration(format!(
                "{} api key must not be empty",
                self.provider
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderPreset {
    OpenAi,
    Google,
    XAi,
    LmStudio,
    Ollama,
}

impl ProviderPreset {
    pub fn provider_id(self) -> ProviderId {
        match self {
            Self::OpenAi => ProviderId::OpenAi,
            Self::Google => ProviderId::Google,
            Self::XAi => ProviderId::XAi,
            Self::LmStudio => ProviderId::LmStudio,
            Self::Ollama => ProviderId::Ollama,
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::XAi => "https://api.x.ai/v1",
            Self::LmStudio => "http://localhost:1234/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Ollama serves whatever the caller pulled, so it has no default.
    pub fn default_model(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("gpt-4o-mini"),
            Self::Google => Some("gemini-2.5-flash-preview-04-17"),
            Self::XAi => Some("grok-3-beta"),
            Self::LmStudio => Some("qwen/qwen3-1.7b"),
            Self::Ollama => None,
        }
    }

    /// Environment variable holding the api key; local servers need none.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Google => Some("GOOGLE_GENERATIVE_AI_API_KEY"),
            Self::XAi => Some("XAI_API_KEY"),
            Self::LmStudio | Self::Ollama => None,
        }
    }

    pub fn config_from_env(self) -> Result<OpenAiCompatibleConfig, ProviderError> {
        self.config_with(|name| std::env::var(name).ok())
    }

    pub fn config_with(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<OpenAiCompatibleConfig, ProviderError> {
        let api_key = match self.api_key_env() {
            Some(key) => require_var_with(key, lookup)?,
            None => SecretString::new(LOCAL_SERVER_API_KEY),
        };

        let config = OpenAiCompatibleConfig::new(self.provider_id(), self.base_url(), api_key)
            .with_default_model(self.default_model().unwrap_or_default());

        Ok(config)
    }
}
