//! Provider construction for the OpenAI-compatible backends.
//!
//! Credentials are resolved when the provider is built, so a missing api key
//! fails here with a Configuration error instead of on the first request.

use std::sync::Arc;

use reqwest::Client;

use crate::{
    OpenAiCompatibleConfig, OpenAiCompatibleProvider, OpenAiHttpTransport, ProviderError,
    ProviderPreset,
};

/// Builds a provider for `preset`, reading its api key from the environment.
pub fn build_provider(preset: ProviderPreset) -> Result<Arc<OpenAiCompatibleProvider>, ProviderError> {
    OpenAiCompatibleProvider::from_preset(preset).map(Arc::new)
}

pub fn build_provider_with_config(
    config: OpenAiCompatibleConfig,
) -> Result<Arc<OpenAiCompatibleProvider>, ProviderError> {
    OpenAiCompatibleProvider::from_config(config).map(Arc::new)
}

/// Builds a provider on a caller-owned HTTP client so several providers can
/// share one connection pool. `config.timeout` is ignored; configure it on
/// the client instead.
pub fn build_provider_with_client(
    config: OpenAiCompatibleConfig,
    client: Client,
) -> Result<Arc<OpenAiCompatibleProvider>, ProviderError> {
    config.validate()?;

    let transport = OpenAiHttpTransport::new(client).with_base_url(config.base_url);
    let mut provider =
        OpenAiCompatibleProvider::new(config.provider, config.api_key, Arc::new(transport))
            .with_default_model(config.default_model);
    if let Some(model) = config.embedding_model {
        provider = provider.with_embedding_model(model);
    }

    Ok(Arc::new(provider))
}

/// Resolves a preset from a user-facing name such as a CLI flag.
pub fn parse_preset(value: &str) -> Option<ProviderPreset> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(ProviderPreset::OpenAi),
        "google" | "gemini" => Some(ProviderPreset::Google),
        "xai" | "grok" => Some(ProviderPreset::XAi),
        "lmstudio" | "lm-studio" | "lm_studio" => Some(ProviderPreset::LmStudio),
        "ollama" => Some(ProviderPreset::Ollama),
        _ => None,
    }
}
