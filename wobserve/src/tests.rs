use std::sync::{Arc, Mutex};
use std::time::Duration;

use wchat::{ChatError, ChatTurnHooks, Step, TurnKind};
use wcommon::SessionId;
use wprovider::{
    ProviderCall, ProviderError, ProviderId, ProviderOperation, ProviderOperationHooks,
    StopReason, TokenUsage, ToolCall,
};
use wtooling::{
    ToolError, ToolExecutionContext, ToolExecutionReport, ToolExecutionResult, ToolRuntimeHooks,
};

use crate::{MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};

fn sample_tool_call() -> ToolCall {
    ToolCall {
        id: "call-1".to_string(),
        name: "echo".to_string(),
        arguments: "{}".to_string(),
    }
}

fn sample_tool_context() -> ToolExecutionContext {
    ToolExecutionContext::new("session-1")
        .with_trace_id("trace-1")
        .with_step(2)
}

fn sample_provider_call() -> ProviderCall {
    ProviderCall::new(ProviderId::OpenAi, ProviderOperation::Complete, "gpt-4o-mini")
        .with_session(SessionId::from("session-1"))
        .with_step(2)
}

fn sample_step() -> Step {
    Step {
        text: "hello".to_string(),
        tool_calls: vec![sample_tool_call()],
        tool_results: Vec::new(),
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 4,
            total_tokens: 14,
        },
    }
}

fn drive_provider_hooks(hooks: &dyn ProviderOperationHooks) {
    let call = sample_provider_call();
    let provider_error = ProviderError::timeout("provider timeout");
    hooks.on_attempt_start(&call, 1);
    hooks.on_retry_scheduled(&call, 1, Duration::from_millis(10), &provider_error);
    hooks.on_success(&call, 2);
    hooks.on_failure(&call, 2, &provider_error);
}

fn drive_tool_hooks(hooks: &dyn ToolRuntimeHooks) {
    let call = sample_tool_call();
    let context = sample_tool_context();
    let result = ToolExecutionResult::from_call(&call, "ok");
    let failure = ToolError::execution("tool failed");
    let timeout = ToolError::timeout("tool timed out");

    hooks.on_execution_start(&call, &context);
    for outcome in [Ok(&result), Err(&failure), Err(&timeout)] {
        hooks.on_execution_finish(&ToolExecutionReport {
            tool_call: &call,
            context: &context,
            outcome,
            elapsed: Duration::from_millis(20),
        });
    }
}

fn drive_turn_hooks(hooks: &dyn ChatTurnHooks) {
    let session = SessionId::from("session-1");
    hooks.on_turn_start(&session, TurnKind::ChatWithTools);
    hooks.on_step(&session, 1, &sample_step());
    hooks.on_turn_complete(&session, TurnKind::ChatWithTools, Duration::from_millis(30));
    hooks.on_turn_failure(
        &session,
        TurnKind::Stream,
        &ChatError::cancelled("stream cancelled"),
        Duration::from_millis(30),
    );
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    let hooks = TracingObservabilityHooks;
    drive_provider_hooks(&hooks);
    drive_tool_hooks(&hooks);
    drive_turn_hooks(&hooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    let hooks = MetricsObservabilityHooks;
    drive_provider_hooks(&hooks);
    drive_tool_hooks(&hooks);
    drive_turn_hooks(&hooks);
}

#[derive(Default, Clone)]
struct Recording {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recording {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().expect("events lock").push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }
}

impl ProviderOperationHooks for Recording {
    fn on_attempt_start(&self, call: &ProviderCall, attempt: u32) {
        self.push(format!("attempt_start:{}:{attempt}", call.operation));
    }

    fn on_retry_scheduled(
        &self,
        call: &ProviderCall,
        attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
        self.push(format!("retry_scheduled:{}:{attempt}", call.operation));
    }

    fn on_success(&self, call: &ProviderCall, attempts: u32) {
        self.push(format!("success:{}:{attempts}", call.operation));
    }

    fn on_failure(&self, call: &ProviderCall, attempts: u32, _error: &ProviderError) {
        self.push(format!("failure:{}:{attempts}", call.operation));
    }
}

impl ToolRuntimeHooks for Recording {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        self.push(format!("start:{}", tool_call.name));
    }

    fn on_execution_finish(&self, report: &ToolExecutionReport<'_>) {
        self.push(format!("finish:{}:{}", report.tool_call.name, report.status()));
    }
}

impl ChatTurnHooks for Recording {
    fn on_turn_start(&self, _session_id: &SessionId, kind: TurnKind) {
        self.push(format!("turn_start:{}", kind.as_str()));
    }

    fn on_step(&self, _session_id: &SessionId, step_number: usize, _step: &Step) {
        self.push(format!("step:{step_number}"));
    }

    fn on_turn_complete(&self, _session_id: &SessionId, kind: TurnKind, _elapsed: Duration) {
        self.push(format!("turn_complete:{}", kind.as_str()));
    }

    fn on_turn_failure(
        &self,
        _session_id: &SessionId,
        kind: TurnKind,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
        self.push(format!("turn_failure:{}", kind.as_str()));
    }
}

/// Panics in every callback except tool starts, which it records.
#[derive(Default, Clone)]
struct Panicking {
    starts: Recording,
}

impl ProviderOperationHooks for Panicking {
    fn on_attempt_start(&self, _call: &ProviderCall, _attempt: u32) {
        panic!("attempt_start panic");
    }

    fn on_retry_scheduled(
        &self,
        _call: &ProviderCall,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
        panic!("retry_scheduled panic");
    }

    fn on_success(&self, _call: &ProviderCall, _attempts: u32) {
        panic!("success panic");
    }

    fn on_failure(&self, _call: &ProviderCall, _attempts: u32, _error: &ProviderError) {
        panic!("failure panic");
    }
}

impl ToolRuntimeHooks for Panicking {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        self.starts.push(format!("start:{}", tool_call.name));
    }

    fn on_execution_finish(&self, _report: &ToolExecutionReport<'_>) {
        panic!("finish panic");
    }
}

impl ChatTurnHooks for Panicking {
    fn on_turn_start(&self, _session_id: &SessionId, _kind: TurnKind) {
        panic!("turn_start panic");
    }

    fn on_step(&self, _session_id: &SessionId, _step_number: usize, _step: &Step) {
        panic!("step panic");
    }

    fn on_turn_complete(&self, _session_id: &SessionId, _kind: TurnKind, _elapsed: Duration) {
        panic!("turn_complete panic");
    }

    fn on_turn_failure(
        &self,
        _session_id: &SessionId,
        _kind: TurnKind,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
        panic!("turn_failure panic");
    }
}

#[test]
fn one_safe_wrapper_delegates_all_three_hook_families() {
    let recording = Recording::default();
    let hooks = SafeHooks::new(recording.clone());

    drive_provider_hooks(&hooks);
    drive_tool_hooks(&hooks);
    drive_turn_hooks(&hooks);

    assert_eq!(
        recording.events(),
        vec![
            "attempt_start:complete:1",
            "retry_scheduled:complete:1",
            "success:complete:2",
            "failure:complete:2",
            "start:echo",
            "finish:echo:success",
            "finish:echo:failure",
            "finish:echo:timeout",
            "turn_start:chat_with_tools",
            "step:1",
            "turn_complete:chat_with_tools",
            "turn_failure:stream",
        ]
    );
}

#[test]
fn safe_hooks_swallow_panics_and_keep_delegating() {
    let inner = Panicking::default();
    let hooks = SafeHooks::new(inner.clone());

    drive_provider_hooks(&hooks);
    drive_tool_hooks(&hooks);
    drive_turn_hooks(&hooks);
    drive_tool_hooks(&hooks);

    assert_eq!(inner.starts.events(), vec!["start:echo", "start:echo"]);
}
