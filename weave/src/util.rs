//! Small convenience constructors for common types.

use crate::{ContentPart, Message, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn tool_message(content: impl Into<String>) -> Message {
    Message::new(Role::Tool, content)
}

/// User message with an image referenced by URL.
pub fn image_url_message(content: impl Into<String>, url: impl Into<String>) -> Message {
    user_message(content).with_part(ContentPart::image_url(url))
}

#[cfg(test)]
mod tests {
    use crate::{ContentPart, ImageSource, Role};

    use super::{image_url_message, tool_message};

    #[test]
    fn helpers_set_role_and_parts() {
        assert_eq!(tool_message("{}").role, Role::Tool);

        let message = image_url_message("what is this?", "https://example.com/a.png");
        assert_eq!(message.role, Role::User);
        assert!(matches!(
            &message.parts[0],
            ContentPart::Image { source: ImageSource::Url(url) } if url.ends_with("a.png")
        ));
    }
}
