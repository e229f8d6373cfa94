//! Model invocation with a bounded tool-calling step loop.
//!
//! A step is one model response. When the response requests tools, the
//! invoker runs them in call order, replays calls and results to the model as
//! a [`ToolRound`], and asks again, until the model stops requesting tools or
//! the step budget runs out. Running out of steps is not an error; the
//! invocation simply ends with the last completed step.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use wcommon::{BoxFuture, GenerationOptions, SessionId};
use wprovider::{
    BoxedEventStream, Message, ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks,
    ProviderCall, ProviderError, ProviderOperation, ProviderOperationHooks, ResponseFormat,
    RetryPolicy, StopReason, StreamEvent, TokenUsage, ToolCall, ToolResult, ToolRound,
    execute_with_timer,
};
use wtooling::{ToolExecutionContext, ToolRuntime};

use crate::ChatError;

/// Hard ceiling on model responses per tool-enabled turn.
pub const MAX_TOOL_STEPS: usize = 3;

pub type ChatFuture<'a, T> = BoxFuture<'a, T>;

/// Text chunks in delivery order. Ends with an error if the provider fails,
/// reports cancellation or stops before completing the response.
pub type TextStream<'a> = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invocation {
    /// Text of every step, concatenated in step order.
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    pub steps: Vec<Step>,
    pub usage: TokenUsage,
}

impl Invocation {
    pub fn from_steps(steps: Vec<Step>) -> Self {
        let mut invocation = Self::default();
        for step in &steps {
            invocation.text.push_str(&step.text);
            invocation.tool_calls.extend(step.tool_calls.iter().cloned());
            invocation.tool_results.extend(step.tool_results.iter().cloned());
            invocation.usage.accumulate(step.usage);
        }
        invocation.steps = steps;
        invocation
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }
}

pub struct InvocationRequest<'a> {
    pub history: &'a [Message],
    pub tools: Option<&'a dyn ToolRuntime>,
    pub max_steps: usize,
    pub response_format: ResponseFormat,
    pub session_id: SessionId,
}

impl<'a> InvocationRequest<'a> {
    pub fn new(history: &'a [Message]) -> Self {
        Self {
            history,
            tools: None,
            max_steps: 1,
            response_format: ResponseFormat::Text,
            session_id: SessionId::default(),
        }
    }

    pub fn with_tools(mut self, tools: &'a dyn ToolRuntime, max_steps: usize) -> Self {
        self.tools = Some(tools);
        self.max_steps = max_steps;
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Produces model output for a message history.
pub trait ModelInvoker: Send + Sync {
    fn invoke<'a>(
        &'a self,
        request: InvocationRequest<'a>,
    ) -> ChatFuture<'a, Result<Invocation, ChatError>>;

    fn invoke_streaming<'a>(
        &'a self,
        history: Vec<Message>,
    ) -> ChatFuture<'a, Result<TextStream<'a>, ChatError>>;
}

/// [`ModelInvoker`] over any [`ModelProvider`].
#[derive(Clone)]
pub struct ProviderInvoker {
    provider: Arc<dyn ModelProvider>,
    model: String,
    options: GenerationOptions,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl ProviderInvoker {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            options: GenerationOptions::default(),
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Arc<dyn ModelProvider> {
        Arc::clone(&self.provider)
    }

    fn request(&self, history: Vec<Message>) -> ModelRequest {
        ModelRequest::new(self.model.clone(), history).with_options(self.options)
    }

    fn call(&self, operation: ProviderOperation) -> ProviderCall {
        ProviderCall::new(self.provider.id(), operation, self.model.clone())
    }

    async fn complete(
        &self,
        call: &ProviderCall,
        request: ModelRequest,
    ) -> Result<ModelResponse, ProviderError> {
        execute_with_timer(call, &self.retry_policy, self.hooks.as_ref(), |_| {
            self.provider.complete(request.clone())
        })
        .await
    }

    async fn open_stream(&self, request: ModelRequest) -> Result<BoxedEventStream<'_>, ProviderError> {
        let call = self.call(ProviderOperation::Stream);
        execute_with_timer(&call, &self.retry_policy, self.hooks.as_ref(), |_| {
            self.provider.stream(request.clone())
        })
        .await
    }

    async fn run_steps(&self, request: InvocationRequest<'_>) -> Result<Invocation, ChatError> {
        let InvocationRequest {
            history,
            tools,
            max_steps,
            response_format,
            session_id,
        } = request;

        let definitions = tools.map(|runtime| runtime.definitions()).unwrap_or_default();
        let mut rounds = Vec::<ToolRound>::new();
        let mut steps = Vec::new();

        for step_number in 1..=max_steps.max(1) {
            let model_request = self
                .request(history.to_vec())
                .with_tools(definitions.clone())
                .with_tool_rounds(rounds.clone())
                .with_response_format(response_format.clone());

            let call = self
                .call(ProviderOperation::Complete)
                .with_session(session_id.clone())
                .with_step(step_number);
            let response = self.complete(&call, model_request).await?;
            let text = response.text();
            let tool_calls = response.tool_calls();

            let mut tool_results = Vec::with_capacity(tool_calls.len());
            if let Some(runtime) = tools {
                for call in &tool_calls {
                    let context = ToolExecutionContext::new(session_id.clone()).with_step(step_number);
                    let result = runtime.execute(call.clone(), context).await?;
                    tool_results.push(result.into_tool_result());
                }
            }

            let wants_follow_up = tools.is_some() && !tool_calls.is_empty();
            steps.push(Step {
                text: text.clone(),
                tool_calls: tool_calls.clone(),
                tool_results: tool_results.clone(),
                stop_reason: response.stop_reason,
                usage: response.usage,
            });

            if !wants_follow_up {
                break;
            }

            rounds.push(ToolRound {
                assistant_text: text,
                tool_calls,
                tool_results,
            });
        }

        Ok(Invocation::from_steps(steps))
    }
}

impl std::fmt::Debug for ProviderInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderInvoker")
            .field("provider", &self.provider.id())
            .field("model", &self.model)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl ModelInvoker for ProviderInvoker {
    fn invoke<'a>(
        &'a self,
        request: InvocationRequest<'a>,
    ) -> ChatFuture<'a, Result<Invocation, ChatError>> {
        Box::pin(self.run_steps(request))
    }

    fn invoke_streaming<'a>(
        &'a self,
        history: Vec<Message>,
    ) -> ChatFuture<'a, Result<TextStream<'a>, ChatError>> {
        Box::pin(async move {
            let events = self.open_stream(self.request(history)).await?;
            Ok(Box::pin(text_chunks(events)) as TextStream<'a>)
        })
    }
}

/// Reduces provider events to text chunks.
///
/// A completion that carries text nobody saw as a delta (providers that do not
/// stream incrementally) is delivered as one final chunk. Events that run out
/// before a `ResponseComplete` end the stream with a Cancelled error.
pub fn text_chunks<'a>(
    mut events: BoxedEventStream<'a>,
) -> impl Stream<Item = Result<String, ChatError>> + Send + 'a {
    try_stream! {
        let mut delivered = false;
        let mut completed = false;

        while let Some(event) = events.next().await {
            match event.map_err(ChatError::from)? {
                StreamEvent::TextDelta(delta) => {
                    if !delta.is_empty() {
                        delivered = true;
                        yield delta;
                    }
                }
                StreamEvent::ToolCallDelta(_) => {}
                StreamEvent::ResponseComplete(response) => {
                    if response.stop_reason == StopReason::Cancelled {
                        Err::<(), _>(ChatError::cancelled("provider cancelled the response stream"))?;
                    }

                    let text = response.text();
                    if !delivered && !text.is_empty() {
                        yield text;
                    }
                    completed = true;
                    break;
                }
            }
        }

        if !completed {
            Err::<(), _>(ChatError::cancelled("response stream ended before completion"))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures_util::StreamExt;
    use wprovider::{OutputItem, ProviderFuture, ProviderId, VecEventStream};
    use wtooling::{DefaultToolRuntime, ToolSet};

    use super::*;
    use crate::ChatErrorKind;

    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<Vec<ModelResponse>>,
        requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<ModelResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    fn response(text: &str, calls: &[(&str, &str)]) -> ModelResponse {
        let mut output = Vec::new();
        if !text.is_empty() {
            output.push(OutputItem::Message(Message::assistant(text)));
        }
        output.extend(calls.iter().map(|(id, name)| {
            OutputItem::ToolCall(ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: "{}".to_string(),
            })
        }));

        ModelResponse {
            provider: ProviderId::Custom,
            model: "test-model".to_string(),
            stop_reason: if calls.is_empty() {
                StopReason::EndTurn
            } else {
                StopReason::ToolUse
            },
            output,
            usage: TokenUsage {
                input_tokens: 1,
                output_tokens: 1,
                total_tokens: 2,
            },
        }
    }

    impl ModelProvider for ScriptedProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Custom
        }

        fn complete<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                self.responses
                    .lock()
                    .expect("responses lock")
                    .pop()
                    .ok_or_else(|| ProviderError::other("script exhausted"))
            })
        }

        fn stream<'a>(
            &'a self,
            _request: ModelRequest,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async move {
                let stream = VecEventStream::new(vec![Ok(StreamEvent::ResponseComplete(
                    response("whole answer", &[]),
                ))]);
                Ok(Box::pin(stream) as BoxedEventStream<'a>)
            })
        }
    }

    fn counter_tools() -> ToolSet {
        let mut tools = ToolSet::new();
        tools
            .register_sync_fn("count", "Counts", r#"{"type":"object"}"#, |_, context| {
                Ok(format!(r#"{{"step":{}}}"#, context.step))
            })
            .expect("register count");
        tools
    }

    #[tokio::test]
    async fn step_loop_feeds_tool_rounds_back_to_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            response("looking ", &[("c1", "count")]),
            response("found it", &[]),
        ]));
        let invoker = ProviderInvoker::new(provider.clone(), "test-model");
        let runtime = DefaultToolRuntime::new(Arc::new(counter_tools()));
        let history = vec![Message::user("count please")];

        let invocation = invoker
            .invoke(InvocationRequest::new(&history).with_tools(&runtime, MAX_TOOL_STEPS))
            .await
            .expect("invocation should succeed");

        assert_eq!(invocation.steps.len(), 2);
        assert_eq!(invocation.text, "looking found it");
        assert_eq!(invocation.tool_results[0].output, r#"{"step":1}"#);
        assert_eq!(invocation.usage.total_tokens, 4);

        let requests = provider.requests.lock().expect("requests lock");
        assert!(requests[0].tool_rounds.is_empty());
        assert_eq!(requests[1].tool_rounds.len(), 1);
        assert_eq!(requests[1].tool_rounds[0].tool_calls[0].id, "c1");
        assert_eq!(requests[1].tools.len(), 1);
    }

    #[tokio::test]
    async fn step_loop_stops_at_budget_without_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            response("", &[("c1", "count")]),
            response("", &[("c2", "count")]),
            response("still going", &[("c3", "count")]),
            response("never reached", &[]),
        ]));
        let invoker = ProviderInvoker::new(provider.clone(), "test-model");
        let runtime = DefaultToolRuntime::new(Arc::new(counter_tools()));
        let history = vec![Message::user("loop")];

        let invocation = invoker
            .invoke(InvocationRequest::new(&history).with_tools(&runtime, MAX_TOOL_STEPS))
            .await
            .expect("hitting the cap is not an error");

        assert_eq!(invocation.steps.len(), MAX_TOOL_STEPS);
        let last = invocation.last_step().expect("last step");
        assert_eq!(last.text, "still going");
        assert_eq!(last.tool_results[0].output, r#"{"step":3}"#);
        assert_eq!(provider.requests.lock().expect("requests lock").len(), 3);
    }

    #[tokio::test]
    async fn unknown_tool_fails_the_invocation() {
        let provider = Arc::new(ScriptedProvider::new(vec![response("", &[("c1", "nope")])]));
        let invoker = ProviderInvoker::new(provider, "test-model");
        let runtime = DefaultToolRuntime::new(Arc::new(counter_tools()));
        let history = vec![Message::user("call nope")];

        let err = invoker
            .invoke(InvocationRequest::new(&history).with_tools(&runtime, MAX_TOOL_STEPS))
            .await
            .expect_err("missing tool must fail");
        assert_eq!(err.kind, ChatErrorKind::Tooling);
    }

    #[tokio::test]
    async fn non_incremental_stream_yields_completed_text_once() {
        let invoker = ProviderInvoker::new(Arc::new(ScriptedProvider::default()), "test-model");

        let chunks: Vec<_> = invoker
            .invoke_streaming(vec![Message::user("hi")])
            .await
            .expect("stream should open")
            .collect()
            .await;

        let chunks = chunks
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("chunks should be ok");
        assert_eq!(chunks, vec!["whole answer".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_completion_surfaces_as_error() {
        let mut cancelled = response("partial", &[]);
        cancelled.stop_reason = StopReason::Cancelled;
        let events: BoxedEventStream<'static> = Box::pin(VecEventStream::new(vec![
            Ok(StreamEvent::TextDelta("part".to_string())),
            Ok(StreamEvent::ResponseComplete(cancelled)),
        ]));

        let items: Vec<_> = text_chunks(events).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref(), Ok("part"));
        let err = items[1].clone().expect_err("cancel is an error");
        assert_eq!(err.kind, ChatErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn stream_without_completion_is_cancelled() {
        let events: BoxedEventStream<'static> = Box::pin(VecEventStream::new(vec![Ok(
            StreamEvent::TextDelta("Hel".to_string()),
        )]));

        let items: Vec<_> = text_chunks(events).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref(), Ok("Hel"));
        let err = items[1].clone().expect_err("a cut-off stream is not a reply");
        assert_eq!(err.kind, ChatErrorKind::Cancelled);
    }
}
