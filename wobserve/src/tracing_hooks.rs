//! Structured `tracing` events for provider calls, tool runs and chat turns.
//!
//! Every event carries `phase` (`provider`, `tool` or `chat`) and `event`.
//! Provider events add the model plus the session and tool-loop step that
//! issued the call, so one `session_id` filter follows a whole turn across
//! all three phases.
//!
//! ```rust
//! use wchat::ChatTurnHooks;
//! use wobserve::TracingObservabilityHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn ChatTurnHooks) {}
//!
//! accepts_turn_hooks(&TracingObservabilityHooks);
//! ```

use std::time::Duration;

use wchat::{ChatError, ChatTurnHooks, Step, TurnKind};
use wcommon::SessionId;
use wprovider::{ProviderCall, ProviderError, ProviderOperationHooks, ToolCall};
use wtooling::{ToolExecutionContext, ToolExecutionReport, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn session(call: &ProviderCall) -> Option<&str> {
    call.session_id.as_ref().map(SessionId::as_str)
}

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, call: &ProviderCall, attempt: u32) {
        tracing::debug!(
            phase = "provider",
            event = "attempt_start",
            provider = %call.provider,
            operation = call.operation.as_str(),
            model = call.model.as_str(),
            session_id = session(call),
            step = call.step,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        call: &ProviderCall,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %call.provider,
            operation = call.operation.as_str(),
            model = call.model.as_str(),
            session_id = session(call),
            step = call.step,
            attempt,
            delay_ms = millis(delay),
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_success(&self, call: &ProviderCall, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %call.provider,
            operation = call.operation.as_str(),
            model = call.model.as_str(),
            session_id = session(call),
            step = call.step,
            attempts
        );
    }

    fn on_failure(&self, call: &ProviderCall, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %call.provider,
            operation = call.operation.as_str(),
            model = call.model.as_str(),
            session_id = session(call),
            step = call.step,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::debug!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            step = context.step
        );
    }

    /// Success logs at info, a timeout at warn, any other failure at error.
    fn on_execution_finish(&self, report: &ToolExecutionReport<'_>) {
        let call = report.tool_call;
        let context = report.context;
        let elapsed_ms = millis(report.elapsed);

        match report.outcome {
            Ok(result) => tracing::info!(
                phase = "tool",
                event = "execution_finish",
                status = report.status(),
                tool_name = call.name,
                tool_call_id = call.id,
                session_id = %context.session_id,
                step = context.step,
                output_bytes = result.output.len(),
                elapsed_ms
            ),
            Err(error) if report.status() == "timeout" => tracing::warn!(
                phase = "tool",
                event = "execution_finish",
                status = report.status(),
                tool_name = call.name,
                tool_call_id = call.id,
                session_id = %context.session_id,
                step = context.step,
                elapsed_ms,
                error = %error
            ),
            Err(error) => tracing::error!(
                phase = "tool",
                event = "execution_finish",
                status = report.status(),
                tool_name = call.name,
                tool_call_id = call.id,
                session_id = %context.session_id,
                step = context.step,
                elapsed_ms,
                error_kind = ?error.kind,
                error = %error
            ),
        }
    }
}

impl ChatTurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, session_id: &SessionId, kind: TurnKind) {
        tracing::debug!(
            phase = "chat",
            event = "turn_start",
            session_id = %session_id,
            operation = kind.as_str()
        );
    }

    fn on_step(&self, session_id: &SessionId, step_number: usize, step: &Step) {
        tracing::debug!(
            phase = "chat",
            event = "step",
            session_id = %session_id,
            step = step_number,
            tool_calls = step.tool_calls.len(),
            stop_reason = ?step.stop_reason,
            total_tokens = step.usage.total_tokens
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, kind: TurnKind, elapsed: Duration) {
        tracing::info!(
            phase = "chat",
            event = "turn_complete",
            session_id = %session_id,
            operation = kind.as_str(),
            elapsed_ms = millis(elapsed)
        );
    }

    fn on_turn_failure(
        &self,
        session_id: &SessionId,
        kind: TurnKind,
        error: &ChatError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            session_id = %session_id,
            operation = kind.as_str(),
            elapsed_ms = millis(elapsed),
            error_kind = ?error.kind,
            error = %error
        );
    }
}
