//! Cosine similarity over embedding vectors.
//!
//! This is the one similarity primitive in the engine; search, the
//! near-duplicate probe, and the feedback matcher all call it. Any future
//! SIMD work belongs here and nowhere else.

/// Computes the cosine of the angle between two vectors.
///
/// Returns a value in `[-1, 1]`: `1.0` means identical direction, `0.0`
/// orthogonal, `-1.0` opposite. In practice embedding vectors are mostly
/// positive, so scores land in `[0, 1]`.
///
/// Degenerate inputs are mapped to `0.0` rather than an error: mismatched
/// lengths, empty vectors, and zero-magnitude vectors (which would divide
/// by zero). The two magnitude square roots go through f64 so very small
/// vectors do not underflow to a zero denominator.
#[inline]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let denom = ((mag_a as f64).sqrt() * (mag_b as f64).sqrt()) as f32;
    if denom == 0.0 {
        return 0.0;
    }

    dot / denom
}
