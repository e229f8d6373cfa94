//! Single-shot generation: plain text, tool calls, streaming, structured JSON
//! and classification.
//!
//! Unlike [`crate::ChatService`], a [`TextGenerator`] keeps no history. Each
//! call builds a fresh one from the prompt and optional system prompt.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use wcommon::MetadataMap;
use wprovider::{ContentPart, Message, ResponseFormat, Role};
use wtooling::{DefaultToolRuntime, NoopToolRuntimeHooks, ToolRuntimeHooks, ToolSet};

use crate::{
    ChatError, InvocationRequest, MAX_TOOL_STEPS, ModelInvoker, PromptTemplate, ResponseOptions,
    TextStream, ToolCallOutcome,
};

#[derive(Clone)]
pub struct TextGenerator {
    invoker: Arc<dyn ModelInvoker>,
    response_options: ResponseOptions,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    tool_timeout: Option<Duration>,
}

impl TextGenerator {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            invoker,
            response_options: ResponseOptions::default(),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            tool_timeout: None,
        }
    }

    pub fn with_response_options(mut self, response_options: ResponseOptions) -> Self {
        self.response_options = response_options;
        self
    }

    pub fn with_tool_hooks(mut self, tool_hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = tool_hooks;
        self
    }

    pub fn with_tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = Some(tool_timeout);
        self
    }

    pub async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ChatError> {
        let history = prompt_history(prompt, system_prompt);
        let invocation = self.invoker.invoke(InvocationRequest::new(&history)).await?;
        Ok(self.response_options.apply(invocation.text))
    }

    /// One call over a caller-built message, typically one carrying attachments.
    pub async fn generate_text_with_file(&self, message: Message) -> Result<String, ChatError> {
        let history = [message];
        let invocation = self.invoker.invoke(InvocationRequest::new(&history)).await?;
        Ok(self.response_options.apply(invocation.text))
    }

    /// One call over caller-supplied `(role, content)` pairs, in order.
    pub async fn generate_from_messages<S>(
        &self,
        messages: &[(Role, S)],
    ) -> Result<String, ChatError>
    where
        S: AsRef<str>,
    {
        if messages.is_empty() {
            return Err(ChatError::validation("at least one message is required"));
        }

        let history: Vec<Message> = messages
            .iter()
            .map(|(role, content)| Message::new(*role, content.as_ref()))
            .collect();
        self.generate_over(&history).await
    }

    /// Renders `template` with `values` and sends the result as one call.
    pub async fn generate_from_template(
        &self,
        template: &PromptTemplate,
        values: &MetadataMap,
    ) -> Result<String, ChatError> {
        let history = template.render(values)?;
        self.generate_over(&history).await
    }

    pub async fn generate_text_stream(&self, prompt: &str) -> Result<TextStream<'_>, ChatError> {
        self.invoker
            .invoke_streaming(vec![Message::user(prompt)])
            .await
    }

    pub async fn call_with_tools(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        tools: &ToolSet,
    ) -> Result<ToolCallOutcome, ChatError> {
        let mut runtime = DefaultToolRuntime::new(Arc::new(tools.clone()))
            .with_hooks(Arc::clone(&self.tool_hooks));
        if let Some(timeout) = self.tool_timeout {
            runtime = runtime.with_timeout(timeout);
        }

        let history = prompt_history(prompt, system_prompt);
        let invocation = self
            .invoker
            .invoke(InvocationRequest::new(&history).with_tools(&runtime, MAX_TOOL_STEPS))
            .await?;

        let final_tool_result = invocation
            .last_step()
            .and_then(|step| step.tool_results.last().cloned());

        Ok(ToolCallOutcome {
            text: invocation.text,
            final_tool_result,
            tool_calls: invocation.tool_calls,
            tool_results: invocation.tool_results,
        })
    }

    /// Asks for output constrained by `schema` and deserializes it into `T`.
    ///
    /// The schema is forwarded to the provider as a response format. Locally,
    /// only the schema's top-level `required` keys are checked; `T` does the
    /// rest of the validation, so `T = Value` accepts any object carrying the
    /// required keys. Output that fails either check is a Validation error.
    /// The call is not retried.
    pub async fn get_json_from_prompt<T>(
        &self,
        schema: Value,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<T, ChatError>
    where
        T: DeserializeOwned,
    {
        let required = required_keys(&schema);
        let text = self
            .structured_call("response", schema, prompt, system_prompt)
            .await?;

        let value = serde_json::from_str::<Value>(strip_code_fence(&text)).map_err(|err| {
            ChatError::validation(format!("model output is not valid JSON: {err}"))
        })?;

        let missing: Vec<&str> = required
            .iter()
            .filter(|key| value.get(key.as_str()).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ChatError::validation(format!(
                "model output is missing required keys: {}",
                missing.join(", ")
            )));
        }

        serde_json::from_value::<T>(value).map_err(|err| {
            ChatError::validation(format!("model output does not match the schema: {err}"))
        })
    }

    /// Asks the model to pick one of `enum_values` and returns the chosen label.
    pub async fn get_classification_from_prompt<S>(
        &self,
        enum_values: &[S],
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ChatError>
    where
        S: AsRef<str>,
    {
        if enum_values.is_empty() {
            return Err(ChatError::validation(
                "classification needs at least one allowed value",
            ));
        }

        let labels: Vec<&str> = enum_values.iter().map(AsRef::as_ref).collect();
        let schema = json!({
            "type": "object",
            "properties": {
                "result": { "type": "string", "enum": labels }
            },
            "required": ["result"],
            "additionalProperties": false
        });

        let text = self
            .structured_call("classification", schema, prompt, system_prompt)
            .await?;
        let label = classification_label(&text);

        if labels.contains(&label.as_str()) {
            Ok(label)
        } else {
            Err(ChatError::validation(format!(
                "model returned '{label}', expected one of: {}",
                labels.join(", ")
            )))
        }
    }

    async fn generate_over(&self, history: &[Message]) -> Result<String, ChatError> {
        let invocation = self.invoker.invoke(InvocationRequest::new(history)).await?;
        Ok(self.response_options.apply(invocation.text))
    }

    async fn structured_call(
        &self,
        name: &str,
        schema: Value,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, ChatError> {
        let history = prompt_history(prompt, system_prompt);
        let request = InvocationRequest::new(&history).with_response_format(
            ResponseFormat::JsonSchema {
                name: name.to_string(),
                schema,
            },
        );
        let invocation = self.invoker.invoke(request).await?;
        Ok(invocation.text)
    }
}

impl std::fmt::Debug for TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("response_options", &self.response_options)
            .field("tool_timeout", &self.tool_timeout)
            .finish_non_exhaustive()
    }
}

/// Builds a user message carrying one file attachment.
pub fn file_message(
    text: impl Into<String>,
    data: impl Into<Vec<u8>>,
    filename: impl Into<String>,
    mime_type: impl Into<String>,
) -> Message {
    Message::user(text).with_part(ContentPart::file(data, filename, mime_type))
}

fn prompt_history(prompt: &str, system_prompt: Option<&str>) -> Vec<Message> {
    let mut history = Vec::with_capacity(2);
    if let Some(system_prompt) = system_prompt {
        history.push(Message::system(system_prompt));
    }
    history.push(Message::user(prompt));
    history
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = body.strip_suffix("```").unwrap_or(body);
    match body.split_once('\n') {
        Some((_language, rest)) => rest.trim(),
        None => strip_language_tag(body.trim()),
    }
}

/// Drops a leading info string such as `json` from a single-line fence body.
fn strip_language_tag(body: &str) -> &str {
    let tag_len = body
        .find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_')
        .unwrap_or(body.len());
    if !body.starts_with(|ch: char| ch.is_ascii_alphabetic()) || tag_len == body.len() {
        return body;
    }
    body[tag_len..].trim_start()
}

fn required_keys(schema: &Value) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| {
            keys.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts `{"result": "x"}`, `"x"` or a bare `x`.
fn classification_label(text: &str) -> String {
    let text = strip_code_fence(text);
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(mut object)) => match object.remove("result") {
            Some(Value::String(label)) => label,
            _ => text.to_string(),
        },
        Ok(Value::String(label)) => label,
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json_blocks() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
    }

    #[test]
    fn strips_language_tag_from_single_line_fences() {
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```42```"), "42");
        assert_eq!(strip_code_fence("```spam```"), "spam");
    }

    #[test]
    fn required_keys_come_from_the_top_level_schema() {
        let schema = json!({"type": "object", "required": ["name", "population"]});
        assert_eq!(required_keys(&schema), vec!["name", "population"]);
        assert!(required_keys(&json!({"type": "object"})).is_empty());
    }

    #[test]
    fn classification_accepts_wrapped_quoted_and_bare_labels() {
        assert_eq!(classification_label(r#"{"result":"spam"}"#), "spam");
        assert_eq!(classification_label(r#""spam""#), "spam");
        assert_eq!(classification_label(" spam\n"), "spam");
        assert_eq!(classification_label(r#"{"label":"spam"}"#), r#"{"label":"spam"}"#);
    }

    #[test]
    fn prompt_history_puts_system_first() {
        let history = prompt_history("q", Some("be brief"));
        assert_eq!(history, vec![Message::system("be brief"), Message::user("q")]);
        assert_eq!(prompt_history("q", None).len(), 1);
    }
}
