//! Turn results and response post-processing options.

use wprovider::{ToolCall, ToolResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatToolResponse {
    pub text: String,
    /// Last result of the last step, if that step ran any tool.
    pub tool_result: Option<ToolResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallOutcome {
    pub text: String,
    pub final_tool_result: Option<ToolResult>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseOptions {
    pub hide_thinking: bool,
}

impl ResponseOptions {
    pub fn with_hide_thinking(mut self, hide_thinking: bool) -> Self {
        self.hide_thinking = hide_thinking;
        self
    }

    /// Applies the configured post-processing to generated text.
    ///
    /// ```rust
    /// use wchat::ResponseOptions;
    ///
    /// let options = ResponseOptions::default().with_hide_thinking(true);
    /// assert_eq!(options.apply("<think>hmm</think>42"), "hmm42");
    /// assert_eq!(ResponseOptions::default().apply("<think>x</think>"), "<think>x</think>");
    /// ```
    pub fn apply(&self, text: impl Into<String>) -> String {
        let text = text.into();
        if !self.hide_thinking {
            return text;
        }

        text.replacen("<think>", "", 1).replacen("</think>", "", 1)
    }
}

/// Which orchestrator operation a turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnKind {
    Chat,
    ChatWithTools,
    Stream,
}

impl TurnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::ChatWithTools => "chat_with_tools",
            Self::Stream => "stream",
        }
    }
}
