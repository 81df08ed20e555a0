//! Cosine similarity over embedding vectors.

/// Cosine similarity between two vectors of equal width: the dot product
/// divided by the product of the Euclidean norms, range [-1, 1].
///
/// An all-zero vector has no direction, so similarity against it is defined
/// as 0 rather than dividing by zero. Width agreement is the caller's
/// responsibility; the retrieval engine rejects mismatched widths before
/// scoring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
