//! Retry policy and provider operation hooks.
//!
//! Retries are off unless asked for: the default policy performs exactly one
//! attempt. Callers that want resilience opt in with
//! [`RetryPolicy::with_max_retries`].

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;

use wcommon::SessionId;

use crate::{ProviderError, ProviderId};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_attempts = max_retries.saturating_add(1);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }

    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        error.retryable && attempt < self.max_attempts
    }

    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = (attempt.saturating_sub(1)) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

/// Which provider endpoint a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
    Complete,
    Stream,
    Embed,
}

impl ProviderOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Stream => "stream",
            Self::Embed => "embed",
        }
    }
}

impl Display for ProviderOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical provider call as seen by hooks. Retries share the same call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub provider: ProviderId,
    pub operation: ProviderOperation,
    pub model: String,
    pub session_id: Option<SessionId>,
    /// Tool-loop step that issued the call, 1-based.
    pub step: Option<usize>,
}

impl ProviderCall {
    pub fn new(provider: ProviderId, operation: ProviderOperation, model: impl Into<String>) -> Self {
        Self {
            provider,
            operation,
            model: model.into(),
            session_id: None,
            step: None,
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }
}

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _call: &ProviderCall, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _call: &ProviderCall,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _call: &ProviderCall, _attempts: u32) {}

    fn on_failure(&self, _call: &ProviderCall, _attempts: u32, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    call: &ProviderCall,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(call, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(call, attempt);
                return Ok(value);
            }
            Err(error) if policy.should_retry(attempt, &error) => {
                let delay = policy.backoff_for_attempt(attempt);
                hooks.on_retry_scheduled(call, attempt, delay, &error);
                sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                hooks.on_failure(call, attempt, &error);
                return Err(error);
            }
        }
    }
}

/// [`execute_with_retry`] sleeping on a runtime-agnostic timer.
pub async fn execute_with_timer<T, Op, OpFuture>(
    call: &ProviderCall,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    execute: Op,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
{
    execute_with_retry(call, policy, hooks, execute, futures_timer::Delay::new).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::{ProviderError, ProviderErrorKind, ProviderId};

    #[test]
    fn default_policy_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 0);
        assert!(!policy.should_retry(1, &ProviderError::timeout("timed out")));

        let policy = RetryPolicy::none().with_max_retries(2);
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.should_retry(2, &ProviderError::timeout("timed out")));
        assert!(!policy.should_retry(3, &ProviderError::timeout("timed out")));
        assert!(!policy.should_retry(1, &ProviderError::invalid_request("bad")));
    }

    #[test]
    fn retry_policy_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        };

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(250));
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().expect("events lock").push(event);
        }
    }

    impl ProviderOperationHooks for RecordingHooks {
        fn on_attempt_start(&self, call: &ProviderCall, attempt: u32) {
            self.push(format!("start:{}:{}:{attempt}", call.provider, call.operation));
        }

        fn on_retry_scheduled(
            &self,
            call: &ProviderCall,
            attempt: u32,
            _delay: Duration,
            _error: &ProviderError,
        ) {
            self.push(format!("retry:{}:{}:{attempt}", call.provider, call.operation));
        }

        fn on_success(&self, call: &ProviderCall, attempts: u32) {
            self.push(format!(
                "success:{}:{}:{attempts}:step={:?}",
                call.provider, call.operation, call.step
            ));
        }

        fn on_failure(&self, call: &ProviderCall, attempts: u32, error: &ProviderError) {
            self.push(format!(
                "failure:{}:{}:{attempts}:{:?}",
                call.provider, call.operation, error.kind
            ));
        }
    }

    #[tokio::test]
    async fn execute_with_retry_retries_and_reports_hooks() {
        let policy = RetryPolicy::none().with_max_retries(2);
        let hooks = RecordingHooks::default();
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let call = ProviderCall::new(ProviderId::OpenAi, ProviderOperation::Complete, "gpt-4o-mini")
            .with_session(SessionId::from("session-1"))
            .with_step(2);

        let result = execute_with_retry(
            &call,
            &policy,
            &hooks,
            |attempt| async move {
                if attempt < 3 {
                    Err(ProviderError::new(
                        ProviderErrorKind::Transport,
                        "temporary",
                        true,
                    ))
                } else {
                    Ok("ok")
                }
            },
            {
                let sleeps = Arc::clone(&sleeps);
                move |delay| {
                    let sleeps = Arc::clone(&sleeps);
                    async move {
                        sleeps.lock().expect("sleep lock").push(delay);
                    }
                }
            },
        )
        .await;

        assert_eq!(result.expect("result should succeed"), "ok");
        assert_eq!(sleeps.lock().expect("sleep lock").len(), 2);

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(events.iter().filter(|e| e.starts_with("retry:")).count(), 2);
        assert!(events.contains(&"success:openai:complete:3:step=Some(2)".to_string()));
    }

    #[tokio::test]
    async fn default_policy_surfaces_first_failure() {
        let hooks = RecordingHooks::default();
        let call = ProviderCall::new(ProviderId::LmStudio, ProviderOperation::Embed, "nomic");

        let result = execute_with_timer::<(), _, _>(
            &call,
            &RetryPolicy::default(),
            &hooks,
            |_| async move { Err(ProviderError::unavailable("server down")) },
        )
        .await;

        let error = result.expect_err("result should fail");
        assert_eq!(error.kind, ProviderErrorKind::Unavailable);
        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "start:lmstudio:embed:1".to_string(),
                "failure:lmstudio:embed:1:Unavailable".to_string(),
            ]
        );
    }
}
