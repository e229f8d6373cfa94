//! Model event streams and the completion guard every adapter wraps them in.
//!
//! A well-formed stream is any number of deltas followed by exactly one
//! [`StreamEvent::ResponseComplete`]. [`CompletedEventStream`] enforces that
//! shape on whatever an adapter produces: it ends right after the completion
//! or the first error, and turns a source that runs dry without completing
//! into a transport error.
//!
//! ```rust
//! use futures_util::StreamExt;
//! use wprovider::{CompletedEventStream, ProviderErrorKind, StreamEvent, VecEventStream};
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
//! # runtime.block_on(async {
//! let cut_off = VecEventStream::new(vec![Ok(StreamEvent::TextDelta("Hel".into()))]);
//! let events: Vec<_> = CompletedEventStream::new(cut_off).collect().await;
//!
//! assert_eq!(events.len(), 2);
//! assert_eq!(
//!     events[1].as_ref().map_err(|error| error.kind).err(),
//!     Some(ProviderErrorKind::Transport)
//! );
//! # });
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{ModelResponse, ProviderError, ToolCall};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextDelta(String),
    ToolCallDelta(ToolCall),
    /// Terminal; carries the assembled output, usage and stop reason.
    ResponseComplete(ModelResponse),
}

impl StreamEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::ResponseComplete(_))
    }
}

/// Any `Send` stream of provider events.
pub trait ModelEventStream: Stream<Item = Result<StreamEvent, ProviderError>> + Send {}

impl<T> ModelEventStream for T where T: Stream<Item = Result<StreamEvent, ProviderError>> + Send {}

pub type BoxedEventStream<'a> = Pin<Box<dyn ModelEventStream + 'a>>;

/// Ends after `ResponseComplete` or the first error, and reports a source
/// that finishes without either as [`ProviderErrorKind::Transport`](crate::ProviderErrorKind).
#[derive(Debug)]
pub struct CompletedEventStream<S> {
    inner: S,
    done: bool,
}

impl<S> CompletedEventStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, done: false }
    }
}

impl<S> Stream for CompletedEventStream<S>
where
    S: Stream<Item = Result<StreamEvent, ProviderError>> + Unpin,
{
    type Item = Result<StreamEvent, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamEvent, ProviderError>>> {
        if self.done {
            return Poll::Ready(None);
        }

        let item = match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(item) => item,
        };

        match item {
            Some(Ok(event)) => {
                self.done = event.is_complete();
                Poll::Ready(Some(Ok(event)))
            }
            Some(Err(error)) => {
                self.done = true;
                Poll::Ready(Some(Err(error)))
            }
            None => {
                self.done = true;
                Poll::Ready(Some(Err(ProviderError::transport(
                    "model stream ended without a completed response",
                ))))
            }
        }
    }
}

/// Replays a fixed list of events; used by fakes and tests.
#[derive(Debug)]
pub struct VecEventStream {
    events: VecDeque<Result<StreamEvent, ProviderError>>,
}

impl VecEventStream {
    pub fn new(events: Vec<Result<StreamEvent, ProviderError>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Stream for VecEventStream {
    type Item = Result<StreamEvent, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamEvent, ProviderError>>> {
        Poll::Ready(self.events.pop_front())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.events.len(), Some(self.events.len()))
    }
}
