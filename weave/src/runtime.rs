//! Wiring helpers that turn a provider into ready-to-use services.

use std::sync::Arc;

use crate::{
    ChatService, EmbeddingProvider, Embedder, ModelProvider, ProviderError, ProviderInvoker,
    SafeHooks, TextGenerator, TracingObservabilityHooks,
};

/// Services sharing one provider and model.
#[derive(Clone)]
pub struct RuntimeBundle {
    pub invoker: Arc<ProviderInvoker>,
    pub generator: TextGenerator,
}

impl RuntimeBundle {
    /// A fresh chat with its own history.
    pub fn chat(&self) -> ChatService {
        ChatService::new(self.invoker.clone())
    }
}

impl std::fmt::Debug for RuntimeBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeBundle")
            .field("invoker", &self.invoker)
            .finish_non_exhaustive()
    }
}

pub fn invoker(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> ProviderInvoker {
    ProviderInvoker::new(provider, model)
}

/// Invoker that reports every provider attempt through `tracing`.
pub fn traced_invoker(
    provider: Arc<dyn ModelProvider>,
    model: impl Into<String>,
) -> ProviderInvoker {
    ProviderInvoker::new(provider, model)
        .with_hooks(Arc::new(SafeHooks::new(TracingObservabilityHooks)))
}

pub fn chat_service(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> ChatService {
    ChatService::new(Arc::new(invoker(provider, model)))
}

/// Chat service with provider, tool and turn events all traced.
pub fn traced_chat_service(
    provider: Arc<dyn ModelProvider>,
    model: impl Into<String>,
) -> ChatService {
    let hooks = Arc::new(SafeHooks::new(TracingObservabilityHooks));
    ChatService::builder(Arc::new(traced_invoker(provider, model)))
        .hooks(hooks.clone())
        .tool_hooks(hooks)
        .build()
}

pub fn text_generator(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> TextGenerator {
    TextGenerator::new(Arc::new(invoker(provider, model)))
}

pub fn embedder(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Embedder {
    Embedder::new(provider, model)
}

pub fn build_runtime(
    provider: Arc<dyn ModelProvider>,
    model: impl Into<String>,
) -> Result<RuntimeBundle, ProviderError> {
    let model = model.into();
    if model.trim().is_empty() {
        return Err(ProviderError::configuration(format!(
            "{} runtime needs a model name",
            provider.id()
        )));
    }

    let invoker = Arc::new(invoker(provider, model));
    Ok(RuntimeBundle {
        generator: TextGenerator::new(invoker.clone()),
        invoker,
    })
}

/// Builds a runtime for a preset using its default model.
#[cfg(feature = "provider-openai-compatible")]
pub fn build_preset_runtime(preset: crate::ProviderPreset) -> Result<RuntimeBundle, ProviderError> {
    let provider = crate::build_provider(preset)?;
    let model = provider.default_model().to_string();
    build_runtime(provider, model)
}
