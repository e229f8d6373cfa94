//! Vector embeddings and cosine-similarity search.
//!
//! An [`Embedder`] turns texts into vectors through any
//! [`wprovider::EmbeddingProvider`]; an [`EmbeddingIndex`] ranks stored
//! entries against a query vector. The index is immutable once built, so it
//! can be shared across tasks and replaced wholesale when the corpus changes.

mod embedder;
mod error;
mod index;
mod similarity;

pub use embedder::{Embedder, EmbeddingBatch};
pub use error::{EmbedError, EmbedErrorKind};
pub use index::{EmbeddingEntry, EmbeddingIndex, Neighbor};
pub use similarity::cosine_similarity;
