use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use wchat::prelude::*;
use wchat::{ChatFuture, InvocationRequest, TextStream};
use wprovider::{
    BoxedEventStream, Message, ModelProvider, ModelRequest, ModelResponse, OutputItem,
    ProviderError, ProviderFuture, ProviderId, Role, StopReason, StreamEvent, TokenUsage,
    ToolCall, VecEventStream,
};

/// Replays one scripted response per `complete` call and one scripted event
/// list per `stream` call.
#[derive(Default)]
struct ScriptedProvider {
    responses: Mutex<Vec<Result<ModelResponse, ProviderError>>>,
    streams: Mutex<Vec<Vec<Result<StreamEvent, ProviderError>>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn with_responses(responses: Vec<Result<ModelResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().rev().collect()),
            ..Self::default()
        }
    }

    fn with_stream(events: Vec<Result<StreamEvent, ProviderError>>) -> Self {
        Self {
            streams: Mutex::new(vec![events]),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
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
                .unwrap_or_else(|| Err(ProviderError::other("no scripted response left")))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let events = self
                .streams
                .lock()
                .expect("streams lock")
                .pop()
                .ok_or_else(|| ProviderError::other("no scripted stream left"))?;
            Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
        })
    }
}

fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        provider: ProviderId::Custom,
        model: "scripted".to_string(),
        output: vec![OutputItem::Message(Message::assistant(text))],
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

fn tool_response(text: &str, id: &str, name: &str, arguments: &str) -> ModelResponse {
    let mut output = Vec::new();
    if !text.is_empty() {
        output.push(OutputItem::Message(Message::assistant(text)));
    }
    output.push(OutputItem::ToolCall(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }));

    ModelResponse {
        provider: ProviderId::Custom,
        model: "scripted".to_string(),
        output,
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage::default(),
    }
}

fn service_over(provider: Arc<ScriptedProvider>) -> ChatService {
    ChatService::new(Arc::new(ProviderInvoker::new(provider, "scripted")))
}

fn weather_tools() -> ToolSet {
    let mut tools = ToolSet::new();
    tools
        .register_sync_fn(
            "weather",
            "Current weather for a city",
            r#"{"type":"object","properties":{"city":{"type":"string"}}}"#,
            |args, _| {
                let city = wtooling::parse_json_object(&args)
                    .and_then(|object| wtooling::required_string(&object, "city"))?;
                Ok(format!(r#"{{"city":"{city}","temp":21}}"#))
            },
        )
        .expect("register weather");
    tools
}

#[tokio::test]
async fn chat_appends_user_and_assistant_messages() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![Ok(text_response(
        "Hello!",
    ))]));
    let mut service = service_over(provider.clone());
    service.add_system_message("be friendly");

    let reply = service.chat("Hi").await.expect("chat should succeed");

    assert_eq!(reply, "Hello!");
    let roles: Vec<_> = service.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(provider.requests()[0].messages.len(), 2);
    assert!(provider.requests()[0].tools.is_empty());
}

#[tokio::test]
async fn failed_chat_keeps_the_user_message() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![Err(
        ProviderError::unavailable("down"),
    )]));
    let mut service = service_over(provider);

    let err = service.chat("Hi").await.expect_err("provider is down");

    assert_eq!(err.kind, ChatErrorKind::Provider);
    assert_eq!(service.messages(), &[Message::user("Hi")]);
}

#[tokio::test]
async fn snapshot_restores_history_after_failure() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![Err(
        ProviderError::timeout("slow"),
    )]));
    let mut service = service_over(provider);
    let snapshot = service.snapshot();

    assert!(service.chat("Hi").await.is_err());
    service.restore(snapshot);

    assert!(service.messages().is_empty());
}

#[tokio::test]
async fn chat_with_tools_without_calls_appends_text() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![Ok(text_response(
        "No tools needed",
    ))]));
    let mut service = service_over(provider.clone());

    let response = service
        .chat_with_tools("Hello", &weather_tools())
        .await
        .expect("turn should succeed");

    assert_eq!(response.text, "No tools needed");
    assert_eq!(response.tool_result, None);
    assert_eq!(service.messages().len(), 2);
    assert_eq!(provider.requests()[0].tools[0].name, "weather");
}

#[tokio::test]
async fn chat_with_tools_returns_last_step_text_and_result() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![
        Ok(tool_response("Checking. ", "call_1", "weather", r#"{"city":"Oslo"}"#)),
        Ok(text_response("It is 21 degrees in Oslo.")),
    ]));
    let mut service = service_over(provider.clone());

    let response = service
        .chat_with_tools("Weather in Oslo?", &weather_tools())
        .await
        .expect("turn should succeed");

    assert_eq!(response.text, "It is 21 degrees in Oslo.");
    assert_eq!(response.tool_result, None);
    assert_eq!(
        service.messages().last(),
        Some(&Message::assistant("It is 21 degrees in Oslo."))
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let round = &requests[1].tool_rounds[0];
    assert_eq!(round.assistant_text, "Checking. ");
    assert_eq!(round.tool_results[0].output, r#"{"city":"Oslo","temp":21}"#);
}

#[tokio::test]
async fn chat_with_tools_stops_after_three_steps() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![
        Ok(tool_response("", "call_1", "weather", r#"{"city":"A"}"#)),
        Ok(tool_response("", "call_2", "weather", r#"{"city":"B"}"#)),
        Ok(tool_response("last", "call_3", "weather", r#"{"city":"C"}"#)),
        Ok(text_response("unreachable")),
    ]));
    let mut service = service_over(provider.clone());

    let response = service
        .chat_with_tools("loop", &weather_tools())
        .await
        .expect("the step cap is not an error");

    assert_eq!(provider.requests().len(), MAX_TOOL_STEPS);
    assert_eq!(response.text, "last");
    let result = response.tool_result.expect("last step ran a tool");
    assert_eq!(result.tool_call_id, "call_3");
    assert_eq!(result.value()["city"], "C");
}

#[tokio::test]
async fn chat_with_tools_surfaces_tool_failures() {
    let provider = Arc::new(ScriptedProvider::with_responses(vec![Ok(tool_response(
        "",
        "call_1",
        "weather",
        r#"{"town":"Oslo"}"#,
    ))]));
    let mut service = service_over(provider);

    let err = service
        .chat_with_tools("Weather?", &weather_tools())
        .await
        .expect_err("missing city argument");

    assert_eq!(err.kind, ChatErrorKind::Tooling);
    assert_eq!(service.messages().len(), 1);
}

#[tokio::test]
async fn stream_chat_delivers_chunks_in_order_then_appends() {
    let provider = Arc::new(ScriptedProvider::with_stream(vec![
        Ok(StreamEvent::TextDelta("Hel".to_string())),
        Ok(StreamEvent::TextDelta("lo".to_string())),
        Ok(StreamEvent::ResponseComplete(text_response("Hello"))),
    ]));
    let mut service = service_over(provider);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let text = service
        .stream_chat("Hi", move |chunk| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().expect("seen lock").push(chunk);
                Ok(())
            }
        })
        .await
        .expect("stream should succeed");

    assert_eq!(text, "Hello");
    assert_eq!(*seen.lock().expect("seen lock"), vec!["Hel", "lo"]);
    assert_eq!(service.messages().last(), Some(&Message::assistant("Hello")));
}

#[tokio::test]
async fn stream_chat_appends_nothing_when_callback_fails() {
    let provider = Arc::new(ScriptedProvider::with_stream(vec![
        Ok(StreamEvent::TextDelta("a".to_string())),
        Ok(StreamEvent::TextDelta("b".to_string())),
    ]));
    let mut service = service_over(provider);
    let mut calls = 0;

    let err = service
        .stream_chat("Hi", |_| {
            calls += 1;
            async { Err(ChatError::validation("client went away")) }
        })
        .await
        .expect_err("callback failure aborts the turn");

    assert_eq!(err.kind, ChatErrorKind::Validation);
    assert_eq!(calls, 1);
    assert_eq!(service.messages(), &[Message::user("Hi")]);
}

#[tokio::test]
async fn stream_chat_treats_cancellation_as_failure() {
    let mut cancelled = text_response("partial");
    cancelled.stop_reason = StopReason::Cancelled;
    let provider = Arc::new(ScriptedProvider::with_stream(vec![
        Ok(StreamEvent::TextDelta("partial".to_string())),
        Ok(StreamEvent::ResponseComplete(cancelled)),
    ]));
    let mut service = service_over(provider);

    let err = service
        .stream_chat("Hi", |_| async { Ok(()) })
        .await
        .expect_err("cancelled stream");

    assert_eq!(err.kind, ChatErrorKind::Cancelled);
    assert_eq!(service.messages().len(), 1);
}

#[tokio::test]
async fn stream_chat_does_not_commit_a_stream_that_never_completes() {
    let provider = Arc::new(ScriptedProvider::with_stream(vec![Ok(
        StreamEvent::TextDelta("Hel".to_string()),
    )]));
    let mut service = service_over(provider);
    let mut seen = Vec::new();

    let err = service
        .stream_chat("Hi", |chunk| {
            seen.push(chunk);
            async { Ok(()) }
        })
        .await
        .expect_err("a truncated stream is not a reply");

    assert_eq!(err.kind, ChatErrorKind::Cancelled);
    assert_eq!(seen, vec!["Hel"]);
    assert_eq!(service.messages(), &[Message::user("Hi")]);
}

struct EchoInvoker;

impl ModelInvoker for EchoInvoker {
    fn invoke<'a>(
        &'a self,
        request: InvocationRequest<'a>,
    ) -> ChatFuture<'a, Result<Invocation, ChatError>> {
        Box::pin(async move {
            let last = request.history.last().map(|m| m.content.clone());
            Ok(Invocation {
                text: format!("echo: {}", last.unwrap_or_default()),
                ..Invocation::default()
            })
        })
    }

    fn invoke_streaming<'a>(
        &'a self,
        history: Vec<Message>,
    ) -> ChatFuture<'a, Result<TextStream<'a>, ChatError>> {
        Box::pin(async move {
            let words: Vec<Result<String, ChatError>> = history
                .last()
                .map(|m| m.content.split(' ').map(|w| Ok(w.to_string())).collect())
                .unwrap_or_default();
            Ok(Box::pin(futures_util::stream::iter(words)) as TextStream<'a>)
        })
    }
}

#[tokio::test]
async fn custom_invokers_plug_into_the_service() {
    let mut service = ChatService::builder(Arc::new(EchoInvoker))
        .system_prompt("system")
        .session_id("custom")
        .build();

    assert_eq!(service.chat("ping").await.expect("chat"), "echo: ping");
    assert_eq!(service.session_id().as_str(), "custom");

    let mut stream = EchoInvoker
        .invoke_streaming(vec![Message::user("a b")])
        .await
        .expect("stream");
    assert_eq!(stream.next().await.and_then(Result::ok).as_deref(), Some("a"));
}

fn temp_dir(prefix: &str) -> std::path::PathBuf {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("wchat-it-{prefix}-{unique}"))
}

#[tokio::test]
async fn save_and_load_round_trip_through_disk() {
    let root = temp_dir("persist");
    let path = root.join("chat.json");
    let mut service = ChatService::builder(Arc::new(EchoInvoker))
        .messages([Message::user("Hi"), Message::assistant("Hello")])
        .build();

    service.save_chat(&path).expect("save");
    service.reset();
    service.load_chat_file(&path).expect("load");
    assert_eq!(service.messages().len(), 2);

    let err = service.save_chat(root.join("chat.txt")).expect_err("bad extension");
    assert_eq!(err.kind, ChatErrorKind::Validation);

    std::fs::remove_dir_all(root).expect("cleanup");
}

#[tokio::test]
async fn invalid_transcript_leaves_history_untouched() {
    let mut service = ChatService::builder(Arc::new(EchoInvoker))
        .messages([Message::user("keep me")])
        .build();

    let err = service
        .load_chat(r#"[{"role":"user","content":"ok"},{"role":"user"}]"#)
        .expect_err("second entry lacks content");

    assert_eq!(err.kind, ChatErrorKind::Format);
    assert_eq!(service.messages(), &[Message::user("keep me")]);

    service
        .load_chat(r#"[{"role":"assistant","content":"fresh"}]"#)
        .expect("valid transcript");
    assert_eq!(service.messages(), &[Message::assistant("fresh")]);
}
