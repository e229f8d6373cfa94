//! Cosine similarity between embedding vectors.
//!
//! ```rust
//! use wembed::cosine_similarity;
//!
//! let same = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).expect("same dimension");
//! assert!((same - 1.0).abs() < 1e-6);
//! assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), Ok(0.0));
//! assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).is_err());
//! ```

use crate::EmbedError;

/// Returns a value in `[-1, 1]`; a zero-magnitude vector on either side yields `0`.
///
/// NaN or infinite components are rejected, since they have no position on
/// that scale.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Result<f32, EmbedError> {
    if left.len() != right.len() {
        return Err(EmbedError::validation(format!(
            "vector dimensions differ: {} vs {}",
            left.len(),
            right.len()
        )));
    }

    if left.iter().chain(right).any(|value| !value.is_finite()) {
        return Err(EmbedError::validation(
            "vectors must not contain NaN or infinite components",
        ));
    }

    let mut dot = 0.0_f64;
    let mut left_norm = 0.0_f64;
    let mut right_norm = 0.0_f64;
    for (&l, &r) in left.iter().zip(right) {
        let (l, r) = (f64::from(l), f64::from(r));
        dot += l * r;
        left_norm += l * l;
        right_norm += r * r;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (left_norm.sqrt() * right_norm.sqrt());
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}
