#[cfg(feature = "provider-openai-compatible")]
pub mod openai;
