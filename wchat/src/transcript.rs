//! Transcript rendering, parsing, and atomic file persistence.
//!
//! The output format follows the file extension: `.json` writes the message
//! list pretty-printed, `.md` writes one `**role**:` block per message. Any
//! other extension is rejected before the filesystem is touched.
//!
//! ```rust
//! use wchat::{TranscriptFormat, render_markdown};
//! use wprovider::Message;
//!
//! assert_eq!(
//!     TranscriptFormat::from_path("notes/chat.md").expect("md is supported"),
//!     TranscriptFormat::Markdown
//! );
//! assert!(TranscriptFormat::from_path("chat.txt").is_err());
//!
//! let rendered = render_markdown(&[Message::user("Hi"), Message::assistant("Hello")]);
//! assert_eq!(rendered, "\n**user**: \n\nHi\n\n**assistant**: \n\nHello");
//! ```

use std::fs;
use std::path::Path;

use wprovider::Message;

use crate::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Json,
    Markdown,
}

impl TranscriptFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| ChatError::validation("transcript path must be valid UTF-8"))?;

        if name.ends_with(".json") {
            Ok(Self::Json)
        } else if name.ends_with(".md") {
            Ok(Self::Markdown)
        } else {
            Err(ChatError::validation(format!(
                "transcript path '{name}' must end in .json or .md"
            )))
        }
    }

    pub fn render(self, messages: &[Message]) -> Result<String, ChatError> {
        match self {
            Self::Json => render_json(messages),
            Self::Markdown => Ok(render_markdown(messages)),
        }
    }
}

pub fn render_json(messages: &[Message]) -> Result<String, ChatError> {
    serde_json::to_string_pretty(messages)
        .map_err(|err| ChatError::storage(format!("failed to encode transcript: {err}")))
}

pub fn render_markdown(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| format!("\n**{}**: \n\n{}", message.role, message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a JSON array of `{role, content}` objects; unknown fields are ignored.
pub fn parse_transcript(content: &str) -> Result<Vec<Message>, ChatError> {
    serde_json::from_str::<Vec<Message>>(content)
        .map_err(|err| ChatError::format(format!("invalid chat format: {err}")))
}

pub fn save_transcript(path: impl AsRef<Path>, messages: &[Message]) -> Result<(), ChatError> {
    let path = path.as_ref();
    let format = TranscriptFormat::from_path(path)?;
    let rendered = format.render(messages)?;
    write_atomic(path, rendered.as_bytes())
}

pub fn read_transcript(path: impl AsRef<Path>) -> Result<Vec<Message>, ChatError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|err| {
        ChatError::storage(format!(
            "failed to read transcript '{}': {err}",
            path.display()
        ))
    })?;
    parse_transcript(&content)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ChatError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| {
            ChatError::storage(format!("failed to create transcript directory: {err}"))
        })?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    fs::write(tmp, bytes)
        .map_err(|err| ChatError::storage(format!("failed to write temporary transcript: {err}")))?;

    fs::rename(tmp, path).map_err(|err| {
        let _ = fs::remove_file(tmp);
        ChatError::storage(format!("failed to finalize transcript: {err}"))
    })
}
