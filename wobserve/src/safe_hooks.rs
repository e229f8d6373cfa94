//! Panic isolation for caller-supplied hooks.
//!
//! [`SafeHooks`] implements every hook trait its inner value implements. A
//! panic inside a callback is caught, logged as a `hook_panicked` warning and
//! dropped, so the chat turn, tool call or provider retry loop carries on.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wchat::ChatTurnHooks;
//! use wobserve::{SafeHooks, TracingObservabilityHooks};
//! use wprovider::ProviderOperationHooks;
//! use wtooling::ToolRuntimeHooks;
//!
//! let hooks = Arc::new(SafeHooks::new(TracingObservabilityHooks));
//! let _provider: Arc<dyn ProviderOperationHooks> = hooks.clone();
//! let _tools: Arc<dyn ToolRuntimeHooks> = hooks.clone();
//! let _turns: Arc<dyn ChatTurnHooks> = hooks;
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use wchat::{ChatError, ChatTurnHooks, Step, TurnKind};
use wcommon::SessionId;
use wprovider::{ProviderCall, ProviderError, ProviderOperationHooks, ToolCall};
use wtooling::{ToolExecutionContext, ToolExecutionReport, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct SafeHooks<H> {
    inner: H,
}

impl<H> SafeHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    fn guarded(&self, callback: &'static str, run: impl FnOnce(&H)) {
        if catch_unwind(AssertUnwindSafe(|| run(&self.inner))).is_err() {
            tracing::warn!(phase = "hooks", event = "hook_panicked", callback);
        }
    }
}

impl<H: ProviderOperationHooks> ProviderOperationHooks for SafeHooks<H> {
    fn on_attempt_start(&self, call: &ProviderCall, attempt: u32) {
        self.guarded("provider.attempt_start", |hooks| {
            hooks.on_attempt_start(call, attempt)
        });
    }

    fn on_retry_scheduled(
        &self,
        call: &ProviderCall,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        self.guarded("provider.retry_scheduled", |hooks| {
            hooks.on_retry_scheduled(call, attempt, delay, error)
        });
    }

    fn on_success(&self, call: &ProviderCall, attempts: u32) {
        self.guarded("provider.success", |hooks| hooks.on_success(call, attempts));
    }

    fn on_failure(&self, call: &ProviderCall, attempts: u32, error: &ProviderError) {
        self.guarded("provider.failure", |hooks| {
            hooks.on_failure(call, attempts, error)
        });
    }
}

impl<H: ToolRuntimeHooks> ToolRuntimeHooks for SafeHooks<H> {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        self.guarded("tool.execution_start", |hooks| {
            hooks.on_execution_start(tool_call, context)
        });
    }

    fn on_execution_finish(&self, report: &ToolExecutionReport<'_>) {
        self.guarded("tool.execution_finish", |hooks| {
            hooks.on_execution_finish(report)
        });
    }
}

impl<H: ChatTurnHooks> ChatTurnHooks for SafeHooks<H> {
    fn on_turn_start(&self, session_id: &SessionId, kind: TurnKind) {
        self.guarded("chat.turn_start", |hooks| hooks.on_turn_start(session_id, kind));
    }

    fn on_step(&self, session_id: &SessionId, step_number: usize, step: &Step) {
        self.guarded("chat.step", |hooks| {
            hooks.on_step(session_id, step_number, step)
        });
    }

    fn on_turn_complete(&self, session_id: &SessionId, kind: TurnKind, elapsed: Duration) {
        self.guarded("chat.turn_complete", |hooks| {
            hooks.on_turn_complete(session_id, kind, elapsed)
        });
    }

    fn on_turn_failure(
        &self,
        session_id: &SessionId,
        kind: TurnKind,
        error: &ChatError,
        elapsed: Duration,
    ) {
        self.guarded("chat.turn_failure", |hooks| {
            hooks.on_turn_failure(session_id, kind, error, elapsed)
        });
    }
}
