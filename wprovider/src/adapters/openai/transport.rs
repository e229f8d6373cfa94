//! OpenAI-compatible transport trait and reqwest-based HTTP implementation.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::time::Duration;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture, SecretString};

use super::serde_api::{
    OpenAiApiEmbeddingResponse, OpenAiApiStreamResponse, build_api_request,
    build_embedding_request, extract_error_message, parse_finish_reason,
};
use super::types::{
    OpenAiAssistantMessage, OpenAiEmbeddingRequest, OpenAiFinishReason, OpenAiRequest,
    OpenAiResponse, OpenAiStreamChunk, OpenAiToolCall, OpenAiUsage,
};

pub type OpenAiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>>;

    fn embed<'a>(
        &'a self,
        request: OpenAiEmbeddingRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<Vec<Vec<f32>>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Builds a client with an overall request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::configuration(err.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
        api_key: &SecretString,
    ) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else if err.is_connect() {
        ProviderError::unavailable(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(request)?;
            let response = self.post("chat/completions", &api_request, &api_key).await?;

            let parsed: super::serde_api::OpenAiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            OpenAiResponse::try_from(parsed)
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let model_for_fallback = request.model.clone();
            let api_request = build_api_request(request)?;
            let response = self.post("chat/completions", &api_request, &api_key).await?;

            let bytes = response
                .bytes_stream()
                .map(|item| item.map_err(map_reqwest_error));
            let stream = decode_sse(Box::pin(bytes), model_for_fallback);

            Ok(Box::pin(stream) as OpenAiChunkStream<'a>)
        })
    }

    fn embed<'a>(
        &'a self,
        request: OpenAiEmbeddingRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<Vec<Vec<f32>>, ProviderError>> {
        Box::pin(async move {
            let api_request = build_embedding_request(request)?;
            let response = self.post("embeddings", &api_request, &api_key).await?;

            let parsed: OpenAiApiEmbeddingResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parsed.into_vectors())
        })
    }
}

/// Decodes an OpenAI server-sent event body into stream chunks.
///
/// A body that ends without the `[DONE]` sentinel is a transport error, so a
/// truncated response never surfaces as a completed one.
pub(crate) fn decode_sse<'a, S, B>(
    mut chunks: S,
    model_for_fallback: String,
) -> impl Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'a
where
    S: Stream<Item = Result<B, ProviderError>> + Send + Unpin + 'a,
    B: AsRef<[u8]> + Send + 'a,
{
    try_stream! {
        let mut sse_buffer = Vec::<u8>::new();
        let mut finished = false;
        let mut content = String::new();
        let mut tool_calls: BTreeMap<u32, OpenAiToolCall> = BTreeMap::new();
        let mut model = None::<String>;
        let mut finish_reason = OpenAiFinishReason::Other;
        let mut usage = OpenAiUsage::default();

        while let Some(item) = chunks.next().await {
            sse_buffer.extend_from_slice(item?.as_ref());

            // Split on raw bytes so multi-byte characters may straddle chunks.
            while let Some(newline_index) = sse_buffer.iter().position(|byte| *byte == b'\n') {
                let line_bytes = sse_buffer.drain(..=newline_index).collect::<Vec<u8>>();
                let line = std::str::from_utf8(&line_bytes)
                    .map_err(|err| ProviderError::transport(err.to_string()))?
                    .trim();

                let Some(payload) = line.strip_prefix("data:") else {
                    continue;
                };

                let payload = payload.trim();
                if payload == "[DONE]" {
                    finished = true;
                    break;
                }

                let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload)
                    .map_err(|err| ProviderError::transport(err.to_string()))?;

                if model.is_none() && !parsed.model.is_empty() {
                    model = Some(parsed.model.clone());
                }

                if let Some(reported) = parsed.usage {
                    usage = reported.into();
                }

                let Some(choice) = parsed.choices.first() else {
                    continue;
                };

                if let Some(delta_content) = &choice.delta.content
                    && !delta_content.is_empty()
                {
                    content.push_str(delta_content);
                    yield OpenAiStreamChunk::TextDelta(delta_content.clone());
                }

                if let Some(delta_tool_calls) = &choice.delta.tool_calls {
                    for delta_call in delta_tool_calls {
                        let index = delta_call.index.unwrap_or(0);
                        let entry = tool_calls.entry(index).or_insert_with(|| OpenAiToolCall {
                            id: format!("tool_call_{index}"),
                            name: String::new(),
                            arguments: String::new(),
                        });

                        if let Some(id) = &delta_call.id {
                            entry.id = id.clone();
                        }

                        if let Some(function) = &delta_call.function {
                            if let Some(name) = &function.name {
                                entry.name = name.clone();
                            }

                            if let Some(arguments) = &function.arguments {
                                entry.arguments.push_str(arguments);
                            }
                        }

                        yield OpenAiStreamChunk::ToolCallDelta(entry.clone());
                    }
                }

                if choice.finish_reason.is_some() {
                    finish_reason = parse_finish_reason(choice.finish_reason.as_deref());
                }
            }

            if finished {
                break;
            }
        }

        if !finished {
            Err::<(), _>(ProviderError::transport(
                "response stream ended before [DONE]",
            ))?;
        }

        yield OpenAiStreamChunk::ResponseComplete(OpenAiResponse {
            model: model.unwrap_or(model_for_fallback),
            message: OpenAiAssistantMessage {
                content,
                tool_calls: tool_calls.into_values().collect(),
            },
            finish_reason,
            usage,
        });
    }
}
