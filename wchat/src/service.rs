//! Multi-turn chat orchestration over a [`ModelInvoker`].
//!
//! A [`ChatService`] owns its [`MessageStore`]. Every turn appends the user
//! message first; the assistant message is appended only once the model
//! answered. A failed non-streaming turn therefore leaves the user message in
//! place, while a failed streaming turn leaves no assistant message behind.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use wcommon::SessionId;
use wprovider::Message;
use wtooling::{DefaultToolRuntime, NoopToolRuntimeHooks, ToolRuntimeHooks, ToolSet};

use crate::{
    ChatError, ChatToolResponse, ChatTurnHooks, Invocation, InvocationRequest, MAX_TOOL_STEPS,
    MessageStore, ModelInvoker, NoopChatTurnHooks, TurnKind, parse_transcript, read_transcript,
    save_transcript,
};

pub struct ChatService {
    invoker: Arc<dyn ModelInvoker>,
    store: MessageStore,
    session_id: SessionId,
    hooks: Arc<dyn ChatTurnHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    tool_timeout: Option<Duration>,
}

impl ChatService {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self::builder(invoker).build()
    }

    pub fn builder(invoker: Arc<dyn ModelInvoker>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(invoker)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn add_system_message(&mut self, text: impl Into<String>) {
        self.store.push(Message::system(text));
    }

    pub async fn chat(&mut self, text: impl Into<String>) -> Result<String, ChatError> {
        self.chat_with_message(Message::user(text)).await
    }

    /// Like [`ChatService::chat`] with a caller-built message, appended verbatim.
    pub async fn chat_with_message(&mut self, message: Message) -> Result<String, ChatError> {
        let started = self.begin(TurnKind::Chat);
        self.store.push(message);

        let result = self
            .invoke(InvocationRequest::new(self.store.messages()))
            .await
            .map(|invocation| invocation.text);

        if let Ok(text) = &result {
            self.store.push(Message::assistant(text.clone()));
        }

        self.finish(TurnKind::Chat, started, result)
    }

    /// Runs a turn with tools available for up to [`MAX_TOOL_STEPS`] model steps.
    pub async fn chat_with_tools(
        &mut self,
        text: impl Into<String>,
        tools: &ToolSet,
    ) -> Result<ChatToolResponse, ChatError> {
        let started = self.begin(TurnKind::ChatWithTools);
        self.store.push(Message::user(text));

        let mut runtime = DefaultToolRuntime::new(Arc::new(tools.clone()))
            .with_hooks(Arc::clone(&self.tool_hooks));
        if let Some(timeout) = self.tool_timeout {
            runtime = runtime.with_timeout(timeout);
        }

        let request =
            InvocationRequest::new(self.store.messages()).with_tools(&runtime, MAX_TOOL_STEPS);
        let result = self.invoke(request).await;

        let result = result.map(|invocation| {
            let (response, append) = tool_response(invocation);
            if append {
                self.store.push(Message::assistant(response.text.clone()));
            }
            response
        });

        self.finish(TurnKind::ChatWithTools, started, result)
    }

    /// Streams the assistant reply chunk by chunk.
    ///
    /// `on_chunk` is awaited before the next chunk is pulled. The assistant
    /// message is appended only after the stream completed and every callback
    /// succeeded.
    pub async fn stream_chat<F, Fut>(
        &mut self,
        text: impl Into<String>,
        mut on_chunk: F,
    ) -> Result<String, ChatError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<(), ChatError>>,
    {
        let started = self.begin(TurnKind::Stream);
        self.store.push(Message::user(text));

        let invoker = Arc::clone(&self.invoker);
        let history = self.store.snapshot();
        let result = async {
            let mut stream = invoker.invoke_streaming(history).await?;
            let mut aggregated = String::new();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                aggregated.push_str(&chunk);
                on_chunk(chunk).await?;
            }

            Ok::<_, ChatError>(aggregated)
        }
        .await;

        if let Ok(text) = &result {
            self.store.push(Message::assistant(text.clone()));
        }

        self.finish(TurnKind::Stream, started, result)
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn restore(&mut self, snapshot: Vec<Message>) {
        self.store.restore(snapshot);
    }

    /// Clears the history and hands back what was there.
    pub fn reset(&mut self) -> Vec<Message> {
        self.store.replace(Vec::new())
    }

    pub fn save_chat(&self, path: impl AsRef<Path>) -> Result<(), ChatError> {
        save_transcript(path, self.store.messages())
    }

    /// Replaces the history with a JSON transcript. On any parse failure the
    /// current history is left untouched.
    pub fn load_chat(&mut self, content: &str) -> Result<(), ChatError> {
        let messages = parse_transcript(content)?;
        self.store.replace(messages);
        Ok(())
    }

    pub fn load_chat_file(&mut self, path: impl AsRef<Path>) -> Result<(), ChatError> {
        let messages = read_transcript(path)?;
        self.store.replace(messages);
        Ok(())
    }

    async fn invoke(&self, request: InvocationRequest<'_>) -> Result<Invocation, ChatError> {
        let request = request.with_session_id(self.session_id.clone());
        let invocation = self.invoker.invoke(request).await?;

        for (index, step) in invocation.steps.iter().enumerate() {
            self.hooks.on_step(&self.session_id, index + 1, step);
        }

        Ok(invocation)
    }

    fn begin(&self, kind: TurnKind) -> Instant {
        self.hooks.on_turn_start(&self.session_id, kind);
        Instant::now()
    }

    fn finish<T>(
        &self,
        kind: TurnKind,
        started: Instant,
        result: Result<T, ChatError>,
    ) -> Result<T, ChatError> {
        match &result {
            Ok(_) => self
                .hooks
                .on_turn_complete(&self.session_id, kind, started.elapsed()),
            Err(error) => {
                self.hooks
                    .on_turn_failure(&self.session_id, kind, error, started.elapsed())
            }
        }
        result
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("session_id", &self.session_id)
            .field("messages", &self.store.len())
            .field("tool_timeout", &self.tool_timeout)
            .finish_non_exhaustive()
    }
}

/// Picks the reply for a tool-enabled turn and whether it joins the history.
fn tool_response(invocation: Invocation) -> (ChatToolResponse, bool) {
    if invocation.tool_calls.is_empty() {
        return (
            ChatToolResponse {
                text: invocation.text,
                tool_result: None,
            },
            true,
        );
    }

    match invocation.steps.last() {
        Some(last) => (
            ChatToolResponse {
                text: last.text.clone(),
                tool_result: last.tool_results.last().cloned(),
            },
            true,
        ),
        None => (
            ChatToolResponse {
                text: invocation.text,
                tool_result: None,
            },
            false,
        ),
    }
}

pub struct ChatServiceBuilder {
    invoker: Arc<dyn ModelInvoker>,
    messages: Vec<Message>,
    session_id: SessionId,
    hooks: Arc<dyn ChatTurnHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    tool_timeout: Option<Duration>,
}

impl ChatServiceBuilder {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            invoker,
            messages: Vec::new(),
            session_id: SessionId::default(),
            hooks: Arc::new(NoopChatTurnHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            tool_timeout: None,
        }
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.messages.push(Message::system(system_prompt));
        self
    }

    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatTurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, tool_hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = tool_hooks;
        self
    }

    pub fn tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = Some(tool_timeout);
        self
    }

    pub fn build(self) -> ChatService {
        ChatService {
            invoker: self.invoker,
            store: MessageStore::from_messages(self.messages),
            session_id: self.session_id,
            hooks: self.hooks,
            tool_hooks: self.tool_hooks,
            tool_timeout: self.tool_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use wprovider::{StopReason, TokenUsage, ToolCall, ToolResult};

    use super::*;
    use crate::{ChatErrorKind, ChatFuture, Step, TextStream};

    struct FixedInvoker {
        invocation: Invocation,
    }

    impl ModelInvoker for FixedInvoker {
        fn invoke<'a>(
            &'a self,
            _request: InvocationRequest<'a>,
        ) -> ChatFuture<'a, Result<Invocation, ChatError>> {
            Box::pin(async move { Ok(self.invocation.clone()) })
        }

        fn invoke_streaming<'a>(
            &'a self,
            _history: Vec<Message>,
        ) -> ChatFuture<'a, Result<TextStream<'a>, ChatError>> {
            Box::pin(async move { Err(ChatError::provider("streaming not scripted")) })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ChatTurnHooks for RecordingHooks {
        fn on_turn_start(&self, _session_id: &SessionId, kind: TurnKind) {
            self.push(format!("start:{}", kind.as_str()));
        }

        fn on_step(&self, _session_id: &SessionId, step_number: usize, _step: &Step) {
            self.push(format!("step:{step_number}"));
        }

        fn on_turn_complete(&self, _session_id: &SessionId, kind: TurnKind, _elapsed: Duration) {
            self.push(format!("complete:{}", kind.as_str()));
        }

        fn on_turn_failure(
            &self,
            _session_id: &SessionId,
            kind: TurnKind,
            error: &ChatError,
            _elapsed: Duration,
        ) {
            self.push(format!("failure:{}:{:?}", kind.as_str(), error.kind));
        }
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().expect("events lock").push(event);
        }
    }

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "lookup".to_string(),
            arguments: "{}".to_string(),
        }
    }

    #[test]
    fn tool_calls_without_steps_are_not_appended() {
        let invocation = Invocation {
            text: "orphan".to_string(),
            tool_calls: vec![call("c1")],
            ..Invocation::default()
        };

        let (response, append) = tool_response(invocation);
        assert_eq!(response.text, "orphan");
        assert_eq!(response.tool_result, None);
        assert!(!append);
    }

    #[tokio::test]
    async fn hooks_observe_steps_and_completion() {
        let step = Step {
            text: "done".to_string(),
            tool_calls: vec![call("c1")],
            tool_results: vec![ToolResult {
                tool_call_id: "c1".to_string(),
                tool_name: "lookup".to_string(),
                output: "1".to_string(),
            }],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        };
        let invoker = FixedInvoker {
            invocation: Invocation::from_steps(vec![step]),
        };
        let hooks = Arc::new(RecordingHooks::default());
        let mut service = ChatService::builder(Arc::new(invoker))
            .session_id("s-1")
            .hooks(hooks.clone())
            .build();

        let response = service
            .chat_with_tools("look it up", &ToolSet::new())
            .await
            .expect("turn should succeed");
        assert_eq!(response.text, "done");
        assert_eq!(response.tool_result.map(|result| result.output).as_deref(), Some("1"));

        let err = service
            .stream_chat("stream", |_| async { Ok(()) })
            .await
            .expect_err("streaming is not scripted");
        assert_eq!(err.kind, ChatErrorKind::Provider);

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "start:chat_with_tools",
                "step:1",
                "complete:chat_with_tools",
                "start:stream",
                "failure:stream:Provider",
            ]
        );
        assert_eq!(service.messages().len(), 3);
    }
}
