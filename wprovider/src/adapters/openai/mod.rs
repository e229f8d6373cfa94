mod presets;
mod provider;
mod serde_api;
mod transport;
mod types;

pub use presets::{LOCAL_SERVER_API_KEY, OpenAiCompatibleConfig, ProviderPreset};
pub use provider::OpenAiCompatibleProvider;
pub use transport::{OpenAiChunkStream, OpenAiHttpTransport, OpenAiTransport};
pub use types::{
    OpenAiAssistantMessage, OpenAiEmbeddingRequest, OpenAiFinishReason, OpenAiMessage,
    OpenAiRequest, OpenAiResponse, OpenAiRole, OpenAiStreamChunk, OpenAiTool, OpenAiToolCall,
    OpenAiUsage,
};
