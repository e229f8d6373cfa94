//! Embedding-layer errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use wprovider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedErrorKind {
    Provider,
    /// Dimension mismatches and provider responses with the wrong vector count.
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedError {
    pub kind: EmbedErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl EmbedError {
    pub fn new(kind: EmbedErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(EmbedErrorKind::Provider, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(EmbedErrorKind::Validation, message)
    }
}

impl Display for EmbedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for EmbedError {}

impl From<ProviderError> for EmbedError {
    fn from(value: ProviderError) -> Self {
        let mut error = EmbedError::provider(value.to_string());
        error.retryable = value.retryable;
        error
    }
}
