//! Redacted secret storage and environment credential lookup.
//!
//! Credentials are resolved when a provider is constructed, so a missing key
//! fails with a configuration error before any request is attempted.
//!
//! ```rust
//! use wprovider::{ProviderErrorKind, require_var_with};
//!
//! let err = require_var_with("MISSING_KEY", |_| None).expect_err("must fail");
//! assert_eq!(err.kind, ProviderErrorKind::Configuration);
//!
//! let key = require_var_with("KEY", |_| Some("sk-123".to_string())).expect("present");
//! assert_eq!(key.expose(), "sk-123");
//! ```

use crate::ProviderError;

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8, so the string stays well formed.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Reads a required credential from the process environment.
pub fn require_env(key: &str) -> Result<SecretString, ProviderError> {
    require_var_with(key, |name| std::env::var(name).ok())
}

/// Same as [`require_env`] with an injectable lookup.
pub fn require_var_with(
    key: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ProviderError> {
    let secret = lookup(key)
        .map(SecretString::new)
        .ok_or_else(|| ProviderError::configuration(format!("{key} is not set")))?;

    if secret.is_empty() {
        return Err(ProviderError::configuration(format!("{key} is empty")));
    }

    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn secret_debug_output_is_redacted() {
        let secret = SecretString::new("sk-very-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-very-secret");
    }

    #[test]
    fn blank_credentials_are_configuration_errors() {
        let err = require_var_with("OPENAI_API_KEY", |_| Some("   ".to_string()))
            .expect_err("blank key must fail");
        assert_eq!(err.kind, ProviderErrorKind::Configuration);
        assert!(err.message.contains("OPENAI_API_KEY"));
    }
}
