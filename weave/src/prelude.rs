//! Common imports for most weave applications.

#[cfg(feature = "provider-openai-compatible")]
pub use crate::{ProviderPreset, build_provider, build_provider_with_config};
pub use crate::{
    ChatError, ChatErrorKind, ChatService, ChatToolResponse, Embedder, EmbeddingIndex, Message,
    ModelInvoker, ModelProvider, PromptTemplate, ProviderError, ProviderInvoker, ResponseOptions,
    Role, SessionId, TextGenerator, Tool, ToolError, ToolExecutionContext, ToolSet,
};
pub use crate::{
    assistant_message, build_runtime, chat_service, system_message, text_generator, user_message,
};
pub use crate::{weave_messages, weave_msg};
