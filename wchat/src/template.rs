//! Role-tagged prompt templates with `{variable}` placeholders.
//!
//! `{{` and `}}` render as literal braces. Rendering fails when a placeholder
//! has no value; values nobody references are ignored.
//!
//! ```rust
//! use wchat::PromptTemplate;
//! use wcommon::MetadataMap;
//! use wprovider::{Message, Role};
//!
//! let template = PromptTemplate::from_messages(&[
//!     (Role::System, "You translate into {language}."),
//!     (Role::User, "{text}"),
//! ])
//! .expect("template should parse");
//! assert_eq!(template.variables(), vec!["language", "text"]);
//!
//! let mut values = MetadataMap::new();
//! values.insert("language".to_string(), "French".to_string());
//! values.insert("text".to_string(), "Good morning".to_string());
//!
//! assert_eq!(
//!     template.render(&values).expect("all variables are bound"),
//!     vec![
//!         Message::system("You translate into French."),
//!         Message::user("Good morning"),
//!     ]
//! );
//! ```

use std::collections::BTreeSet;

use wcommon::MetadataMap;
use wprovider::{Message, Role};

use crate::ChatError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateMessage {
    role: Role,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    messages: Vec<TemplateMessage>,
}

impl PromptTemplate {
    /// Parses every `(role, template)` pair up front.
    pub fn from_messages<S>(messages: &[(Role, S)]) -> Result<Self, ChatError>
    where
        S: AsRef<str>,
    {
        if messages.is_empty() {
            return Err(ChatError::validation(
                "prompt template needs at least one message",
            ));
        }

        let messages = messages
            .iter()
            .map(|(role, template)| {
                Ok(TemplateMessage {
                    role: *role,
                    segments: parse_segments(template.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, ChatError>>()?;

        Ok(Self { messages })
    }

    /// Placeholder names in sorted order, without duplicates.
    pub fn variables(&self) -> Vec<&str> {
        self.messages
            .iter()
            .flat_map(|message| message.segments.iter())
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn render(&self, values: &MetadataMap) -> Result<Vec<Message>, ChatError> {
        self.messages
            .iter()
            .map(|message| {
                let mut content = String::new();
                for segment in &message.segments {
                    match segment {
                        Segment::Literal(text) => content.push_str(text),
                        Segment::Variable(name) => {
                            let value = values.get(name).ok_or_else(|| {
                                ChatError::validation(format!(
                                    "missing value for template variable '{name}'"
                                ))
                            })?;
                            content.push_str(value);
                        }
                    }
                }
                Ok(Message::new(message.role, content))
            })
            .collect()
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, ChatError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => break,
                        other => name.push(other),
                    }
                }

                let name = name.trim();
                if !closed || name.is_empty() {
                    return Err(ChatError::validation(format!(
                        "malformed placeholder in prompt template: {template}"
                    )));
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' => {
                return Err(ChatError::validation(format!(
                    "unmatched '}}' in prompt template: {template}"
                )));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
