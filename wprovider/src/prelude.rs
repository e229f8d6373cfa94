//! Common `wprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, ContentPart, EmbeddingProvider, Message, ModelEventStream, ModelProvider,
    ModelRequest, ModelRequestBuilder, ModelResponse, NoopOperationHooks, OutputItem,
    ProviderCall, ProviderError, ProviderErrorKind, ProviderId, ProviderOperation,
    ProviderOperationHooks, ResponseFormat,
    RetryPolicy, Role, StopReason, StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult,
    ToolRound, execute_with_retry,
};
#[cfg(feature = "provider-openai-compatible")]
pub use crate::{OpenAiCompatibleConfig, OpenAiCompatibleProvider, ProviderPreset};
pub use wcommon::{BoxFuture, GenerationOptions, MetadataMap};
