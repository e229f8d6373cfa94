//! Unified facade over the weave workspace crates.
//!
//! One dependency for most applications: it re-exports the provider, tooling,
//! chat, embedding and observability crates and adds provider construction
//! helpers and message macros.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use weave::{ChatService, ProviderInvoker, ProviderPreset, build_provider};
//!
//! let provider = build_provider(ProviderPreset::LmStudio).expect("local server needs no key");
//! let chat = ChatService::builder(Arc::new(ProviderInvoker::new(provider, "qwen/qwen3-1.7b")))
//!     .system_prompt("You are concise.")
//!     .build();
//! assert_eq!(chat.messages().len(), 1);
//! ```

mod macros;

pub mod prelude;
#[cfg(feature = "provider-openai-compatible")]
pub mod providers;
pub mod runtime;
pub mod util;

pub use wchat;
pub use wcommon;
pub use wembed;
pub use wobserve;
pub use wprovider;
pub use wtooling;

pub use wchat::{
    ChatError, ChatErrorKind, ChatService, ChatServiceBuilder, ChatToolResponse, ChatTurnHooks,
    Invocation, InvocationRequest, MAX_TOOL_STEPS, MessageStore, ModelInvoker,
    NoopChatTurnHooks, PromptTemplate, ProviderInvoker, ResponseOptions, Step, TextGenerator,
    TextStream, ToolCallOutcome, TranscriptFormat, TurnKind, file_message,
};
pub use wcommon::{BoxFuture, GenerationOptions, MetadataMap, SessionId, TraceId};
pub use wembed::{
    EmbedError, EmbedErrorKind, Embedder, EmbeddingBatch, EmbeddingEntry, EmbeddingIndex,
    Neighbor, cosine_similarity,
};
pub use wobserve::{MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
pub use wprovider::{
    BoxedEventStream, ContentPart, EmbeddingProvider, ImageSource, Message, ModelEventStream,
    ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse, NoopOperationHooks,
    OutputItem, ProviderCall, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderOperation, ProviderOperationHooks, ResponseFormat, RetryPolicy, Role, SecretString, StopReason,
    StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult, ToolRound, VecEventStream,
    require_env,
};
#[cfg(feature = "provider-openai-compatible")]
pub use wprovider::{
    OpenAiCompatibleConfig, OpenAiCompatibleProvider, OpenAiHttpTransport, OpenAiTransport,
    ProviderPreset,
};
pub use wtooling::{
    DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks, Tool, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolExecutionReport, ToolExecutionResult, ToolFuture, ToolRuntime,
    ToolRuntimeHooks, ToolSet, parse_args, parse_json_object, required_string, to_output,
};

#[cfg(feature = "provider-openai-compatible")]
pub use providers::{
    build_provider, build_provider_with_client, build_provider_with_config, parse_preset,
};
#[cfg(feature = "provider-openai-compatible")]
pub use runtime::build_preset_runtime;
pub use runtime::{
    RuntimeBundle, build_runtime, chat_service, embedder, invoker, text_generator,
    traced_chat_service, traced_invoker,
};
pub use util::{
    assistant_message, image_url_message, system_message, tool_message, user_message,
};
