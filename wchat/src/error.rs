//! Chat-layer errors and classification.
//!
//! ```rust
//! use wchat::{ChatError, ChatErrorKind};
//! use wprovider::ProviderError;
//!
//! let err = ChatError::from(ProviderError::configuration("OPENAI_API_KEY is not set"));
//! assert_eq!(err.kind, ChatErrorKind::Configuration);
//!
//! let err = ChatError::from(ProviderError::rate_limited("slow down"));
//! assert_eq!(err.kind, ChatErrorKind::Provider);
//! assert!(err.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use wprovider::{ProviderError, ProviderErrorKind};
use wtooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Missing or unusable credentials and settings, raised before any call.
    Configuration,
    /// Bad save path, schema mismatch, or a label outside the allowed set.
    Validation,
    /// Transcript content that cannot be parsed.
    Format,
    Provider,
    Tooling,
    Cancelled,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Configuration, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Validation, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Format, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Cancelled, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Storage, message)
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::Configuration => ChatErrorKind::Configuration,
            ProviderErrorKind::Cancelled => ChatErrorKind::Cancelled,
            _ => ChatErrorKind::Provider,
        };

        ChatError::new(kind, value.to_string()).with_retryable(value.retryable)
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        ChatError::tooling(value.to_string()).with_retryable(value.retryable)
    }
}
