//! Provider contracts, shared model types, and the OpenAI-compatible adapter.
//!
//! Every backend speaks the same [`ModelProvider`] / [`EmbeddingProvider`]
//! contracts so orchestration code never branches on the provider in use.

pub mod adapters;
mod credentials;
mod error;
mod model;
pub mod prelude;
mod provider;
mod resilience;
mod stream;

pub use credentials::{SecretString, require_env, require_var_with};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    ContentPart, ImageSource, Message, ModelRequest, ModelRequestBuilder, ModelResponse,
    OutputItem, ProviderId, ResponseFormat, Role, StopReason, TokenUsage, ToolCall,
    ToolDefinition, ToolResult, ToolRound,
};
pub use provider::{EmbeddingProvider, ModelProvider, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderCall, ProviderOperation, ProviderOperationHooks, RetryPolicy,
    execute_with_retry, execute_with_timer,
};
pub use stream::{
    BoxedEventStream, CompletedEventStream, ModelEventStream, StreamEvent, VecEventStream,
};

#[cfg(feature = "provider-openai-compatible")]
pub use adapters::openai::{
    OpenAiCompatibleConfig, OpenAiCompatibleProvider, OpenAiHttpTransport, OpenAiTransport,
    ProviderPreset,
};
pub use wcommon::{BoxFuture, GenerationOptions, MetadataMap};
