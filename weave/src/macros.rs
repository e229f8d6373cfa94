/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use weave::{Role, weave_msg};
///
/// let message = weave_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! weave_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    (tool => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Tool, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or tool");
    };
}

/// Creates a `Vec<Message>` from role/content pairs, e.g. to seed a
/// [`ChatServiceBuilder`](crate::ChatServiceBuilder).
///
/// ```rust
/// use weave::{Role, weave_messages};
///
/// let messages = weave_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! weave_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::weave_msg!($role => $content)),+]
    };
}
