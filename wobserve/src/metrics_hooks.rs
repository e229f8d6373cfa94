//! `metrics` series for provider calls, tool runs and chat turns.
//!
//! Every series is prefixed `weave_`. Install any `metrics` recorder to
//! collect them; without one the calls are no-ops.
//!
//! | series | kind | labels |
//! |--------|------|--------|
//! | `weave_provider_attempts_total` | counter | provider, operation |
//! | `weave_provider_retries_total` | counter | provider, operation, error_kind |
//! | `weave_provider_retry_delay_seconds` | histogram | provider, operation |
//! | `weave_provider_calls_total` | counter | provider, operation, status |
//! | `weave_provider_attempts_per_call` | histogram | provider, operation, status |
//! | `weave_tool_executions_total` | counter | tool_name, status |
//! | `weave_tool_execution_duration_seconds` | histogram | tool_name, status |
//! | `weave_tool_loop_step` | histogram | tool_name |
//! | `weave_chat_turns_total` | counter | operation, status |
//! | `weave_chat_turn_duration_seconds` | histogram | operation, status |
//! | `weave_chat_steps_total` | counter | |
//! | `weave_chat_tokens_total` | counter | direction |
//!
//! `status` is `success` or `failure`; tool executions also report `timeout`.
//!
//! ```rust
//! use wobserve::MetricsObservabilityHooks;
//! use wprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! accepts_provider_hooks(&MetricsObservabilityHooks);
//! ```

use std::time::Duration;

use wchat::{ChatError, ChatTurnHooks, Step, TurnKind};
use wcommon::SessionId;
use wprovider::{ProviderCall, ProviderError, ProviderOperationHooks};
use wtooling::{ToolExecutionReport, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

fn record_provider_call(call: &ProviderCall, attempts: u32, status: &'static str) {
    let provider = call.provider.to_string();
    let operation = call.operation.as_str();

    metrics::counter!(
        "weave_provider_calls_total",
        "provider" => provider.clone(),
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "weave_provider_attempts_per_call",
        "provider" => provider,
        "operation" => operation,
        "status" => status
    )
    .record(f64::from(attempts));
}

fn record_turn(kind: TurnKind, elapsed: Duration, status: &'static str) {
    metrics::counter!(
        "weave_chat_turns_total",
        "operation" => kind.as_str(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "weave_chat_turn_duration_seconds",
        "operation" => kind.as_str(),
        "status" => status
    )
    .record(elapsed.as_secs_f64());
}

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, call: &ProviderCall, _attempt: u32) {
        metrics::counter!(
            "weave_provider_attempts_total",
            "provider" => call.provider.to_string(),
            "operation" => call.operation.as_str()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        call: &ProviderCall,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "weave_provider_retries_total",
            "provider" => call.provider.to_string(),
            "operation" => call.operation.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "weave_provider_retry_delay_seconds",
            "provider" => call.provider.to_string(),
            "operation" => call.operation.as_str()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, call: &ProviderCall, attempts: u32) {
        record_provider_call(call, attempts, "success");
    }

    fn on_failure(&self, call: &ProviderCall, attempts: u32, _error: &ProviderError) {
        record_provider_call(call, attempts, "failure");
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_finish(&self, report: &ToolExecutionReport<'_>) {
        let tool_name = report.tool_call.name.clone();

        metrics::counter!(
            "weave_tool_executions_total",
            "tool_name" => tool_name.clone(),
            "status" => report.status()
        )
        .increment(1);
        metrics::histogram!(
            "weave_tool_execution_duration_seconds",
            "tool_name" => tool_name.clone(),
            "status" => report.status()
        )
        .record(report.elapsed.as_secs_f64());
        metrics::histogram!("weave_tool_loop_step", "tool_name" => tool_name)
            .record(report.context.step as f64);
    }
}

impl ChatTurnHooks for MetricsObservabilityHooks {
    fn on_step(&self, _session_id: &SessionId, _step_number: usize, step: &Step) {
        metrics::counter!("weave_chat_steps_total").increment(1);
        metrics::counter!("weave_chat_tokens_total", "direction" => "input")
            .increment(u64::from(step.usage.input_tokens));
        metrics::counter!("weave_chat_tokens_total", "direction" => "output")
            .increment(u64::from(step.usage.output_tokens));
    }

    fn on_turn_complete(&self, _session_id: &SessionId, kind: TurnKind, elapsed: Duration) {
        record_turn(kind, elapsed, "success");
    }

    fn on_turn_failure(
        &self,
        _session_id: &SessionId,
        kind: TurnKind,
        _error: &ChatError,
        elapsed: Duration,
    ) {
        record_turn(kind, elapsed, "failure");
    }
}
