//! Ordered conversation log owned by a single chat service.
//!
//! The store only grows during a turn. Wholesale replacement goes through
//! [`MessageStore::replace`], which callers invoke only after the incoming
//! history has been fully validated.
//!
//! ```rust
//! use wchat::MessageStore;
//! use wprovider::{Message, Role};
//!
//! let mut store = MessageStore::new();
//! store.push(Message::user("Hi"));
//! store.push(Message::assistant("Hello!"));
//!
//! let snapshot = store.snapshot();
//! store.push(Message::user("and then?"));
//! store.restore(snapshot);
//!
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.last().map(|m| m.role), Some(Role::Assistant));
//! ```

use wprovider::Message;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<Message>) {
        self.messages = snapshot;
    }

    /// Swaps in a new history and hands back the previous one.
    pub fn replace(&mut self, messages: Vec<Message>) -> Vec<Message> {
        std::mem::replace(&mut self.messages, messages)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<Message>> for MessageStore {
    fn from(messages: Vec<Message>) -> Self {
        Self::from_messages(messages)
    }
}
