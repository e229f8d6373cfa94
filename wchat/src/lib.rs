//! Conversational orchestration over model providers.
//!
//! [`ChatService`] runs multi-turn chat over an owned [`MessageStore`];
//! [`TextGenerator`] covers single-shot calls. Both talk to the model through
//! a [`ModelInvoker`], normally a [`ProviderInvoker`] wrapping a
//! [`wprovider::ModelProvider`].

mod error;
mod generate;
mod hooks;
mod invoker;
mod service;
mod store;
mod template;
mod transcript;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatService, ChatServiceBuilder, ChatToolResponse,
        ChatTurnHooks, Invocation, MAX_TOOL_STEPS, ModelInvoker, PromptTemplate,
        ProviderInvoker, ResponseOptions, TextGenerator, ToolCallOutcome,
    };
    pub use wtooling::{Tool, ToolError, ToolExecutionContext, ToolSet};
}

pub use error::{ChatError, ChatErrorKind};
pub use generate::{TextGenerator, file_message};
pub use hooks::{ChatTurnHooks, NoopChatTurnHooks};
pub use invoker::{
    ChatFuture, Invocation, InvocationRequest, MAX_TOOL_STEPS, ModelInvoker, ProviderInvoker,
    Step, TextStream, text_chunks,
};
pub use service::{ChatService, ChatServiceBuilder};
pub use store::MessageStore;
pub use template::PromptTemplate;
pub use transcript::{
    TranscriptFormat, parse_transcript, read_transcript, render_json, render_markdown,
    save_transcript,
};
pub use types::{ChatToolResponse, ResponseOptions, ToolCallOutcome, TurnKind};
pub use wcommon::SessionId;
