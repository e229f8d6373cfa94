//! Immutable embedding index with k-nearest-neighbour ranking.
//!
//! ```rust
//! use wembed::{EmbeddingEntry, EmbeddingIndex};
//!
//! let index = EmbeddingIndex::new(vec![
//!     EmbeddingEntry::new("cat", vec![1.0, 0.0]),
//!     EmbeddingEntry::new("dog", vec![0.9, 0.1]),
//!     EmbeddingEntry::new("car", vec![0.0, 1.0]),
//! ]);
//!
//! let top = index.nearest(&[1.0, 0.0], 2).expect("same dimension");
//! assert_eq!(top[0].value, "cat");
//! assert_eq!(top[1].value, "dog");
//! ```

use crate::{EmbedError, cosine_similarity};

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingEntry {
    /// Source text the vector was computed from.
    pub value: String,
    pub embedding: Vec<f32>,
}

impl EmbeddingEntry {
    pub fn new(value: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            value: value.into(),
            embedding,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub value: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingIndex {
    entries: Vec<EmbeddingEntry>,
}

impl EmbeddingIndex {
    pub fn new(entries: Vec<EmbeddingEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[EmbeddingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `min(k, len)` entries by descending similarity; ties keep index order.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, EmbedError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored = self
            .entries
            .iter()
            .map(|entry| Ok((entry, cosine_similarity(query, &entry.embedding)?)))
            .collect::<Result<Vec<_>, EmbedError>>()?;

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|(_, left), (_, right)| right.total_cmp(left));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(entry, similarity)| Neighbor {
                value: entry.value.clone(),
                similarity,
            })
            .collect())
    }
}

impl FromIterator<EmbeddingEntry> for EmbeddingIndex {
    fn from_iter<T: IntoIterator<Item = EmbeddingEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
