//! Cosine similarity over dense `f32` embeddings.

mod error;


pub use error::SimilarityError;

/// Computes `dot(a, b) / (|a| * |b|)`, clamped to `[-1, 1]`.
///
/// Accumulates in `f64` so long vectors do not drift. Zero-magnitude inputs are rejected
/// instead of producing `NaN`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(SimilarityError::EmptyVector);
    }
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (index, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
        if !x.is_finite() || !y.is_finite() {
            return Err(SimilarityError::NonFinite { index });
        }
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(cosine.clamp(-1.0, 1.0) as f32)
}
