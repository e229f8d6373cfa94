//! Observability hooks for provider calls, tool executions and chat turns.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wobserve::{MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
//! use wprovider::ProviderOperationHooks;
//!
//! let provider_hooks: Arc<dyn ProviderOperationHooks> =
//!     Arc::new(SafeHooks::new(TracingObservabilityHooks));
//! let _metrics = SafeHooks::new(MetricsObservabilityHooks);
//! # let _ = provider_hooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::SafeHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
}

#[cfg(test)]
mod tests;
