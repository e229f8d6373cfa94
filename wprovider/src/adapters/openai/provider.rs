//! OpenAI-compatible provider implementation over transport and shared models.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BoxedEventStream, CompletedEventStream, EmbeddingProvider, ModelProvider, ModelRequest, ModelResponse,
    ProviderError, ProviderFuture, ProviderId, SecretString,
};

use super::presets::{OpenAiCompatibleConfig, ProviderPreset};
use super::transport::{OpenAiHttpTransport, OpenAiTransport};
use super::types::{OpenAiEmbeddingRequest, OpenAiMessage, OpenAiRequest, OpenAiTool};

#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    id: ProviderId,
    api_key: SecretString,
    transport: Arc<dyn OpenAiTransport>,
    default_model: String,
    embedding_model: Option<String>,
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("id", &self.id)
            .field("transport", &self.transport)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleProvider {
    pub fn new(id: ProviderId, api_key: SecretString, transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            id,
            api_key,
            transport,
            default_model: String::new(),
            embedding_model: None,
        }
    }

    /// Builds an HTTP-backed provider; configuration errors surface before any request.
    pub fn from_config(config: OpenAiCompatibleConfig) -> Result<Self, ProviderError> {
        config.validate()?;

        let transport = match config.timeout {
            Some(timeout) => OpenAiHttpTransport::with_timeout(timeout)?,
            None => OpenAiHttpTransport::new(reqwest::Client::new()),
        }
        .with_base_url(config.base_url);

        let mut provider = Self::new(config.provider, config.api_key, Arc::new(transport))
            .with_default_model(config.default_model);
        provider.embedding_model = config.embedding_model;
        Ok(provider)
    }

    pub fn from_preset(preset: ProviderPreset) -> Result<Self, ProviderError> {
        Self::from_config(preset.config_from_env()?)
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn resolve_model(&self, model: String) -> String {
        if model.trim().is_empty() {
            self.default_model.clone()
        } else {
            model
        }
    }

    pub(crate) fn build_openai_request(&self, request: ModelRequest, stream: bool) -> OpenAiRequest {
        let mut messages = request
            .messages
            .into_iter()
            .map(OpenAiMessage::from)
            .collect::<Vec<_>>();

        for round in request.tool_rounds {
            messages.push(OpenAiMessage::assistant_tool_calls(
                round.assistant_text,
                round.tool_calls,
            ));
            messages.extend(round.tool_results.into_iter().map(OpenAiMessage::tool_result));
        }

        let tools = request.tools.into_iter().map(OpenAiTool::from).collect::<Vec<_>>();

        OpenAiRequest {
            model: request.model,
            messages,
            tools,
            temperature: request.options.temperature,
            top_p: request.options.top_p,
            max_tokens: request.options.max_tokens,
            response_format: request.response_format,
            stream,
        }
    }

    fn prepare(&self, mut request: ModelRequest, stream: bool) -> Result<OpenAiRequest, ProviderError> {
        request.model = self.resolve_model(request.model);
        request.validate()?;
        Ok(self.build_openai_request(request, stream))
    }
}

impl ModelProvider for OpenAiCompatibleProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let openai_request = self.prepare(request, false)?;
            let response = self
                .transport
                .complete(openai_request, self.api_key.clone())
                .await?;
            Ok(response.into_model_response(self.id))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let openai_request = self.prepare(request, true)?;
            let mut chunks = self
                .transport
                .stream(openai_request, self.api_key.clone())
                .await?;
            let provider = self.id;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    yield chunk?.into_stream_event(provider);
                }
            };

            Ok(Box::pin(CompletedEventStream::new(Box::pin(stream))) as BoxedEventStream<'a>)
        })
    }
}

impl EmbeddingProvider for OpenAiCompatibleProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn embed<'a>(
        &'a self,
        model: &'a str,
        inputs: Vec<String>,
    ) -> ProviderFuture<'a, Result<Vec<Vec<f32>>, ProviderError>> {
        Box::pin(async move {
            let model = match (model.trim().is_empty(), &self.embedding_model) {
                (false, _) => model.to_string(),
                (true, Some(configured)) => configured.clone(),
                (true, None) => {
                    return Err(ProviderError::invalid_request(
                        "embedding model must not be empty",
                    ));
                }
            };

            let expected = inputs.len();
            let vectors = self
                .transport
                .embed(
                    OpenAiEmbeddingRequest {
                        model,
                        input: inputs,
                    },
                    self.api_key.clone(),
                )
                .await?;

            if vectors.len() != expected {
                return Err(ProviderError::transport(format!(
                    "expected {expected} embeddings, received {}",
                    vectors.len()
                )));
            }

            Ok(vectors)
        })
    }
}
