//! Cosine similarity between embedding vectors.

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// A zero-norm vector compares as `0.0` ("unrelated") instead of dividing by
/// zero. Vectors of different lengths pair element-wise up to the shorter
/// length; norms are taken over each full vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
