//! Cosine similarity kernels.
//!
//! Dot products run eight lanes at a time through `wide::f32x8` with a scalar
//! tail. Vectors whose L2 norm is effectively zero normalize to the zero
//! vector, so their similarity with anything is 0 instead of NaN.

use wide::f32x8;

/// Norms at or below this value are treated as zero.
pub const ZERO_NORM_EPSILON: f32 = 1e-10;

/// Dot product of two equally sized slices.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let chunks_a = a.chunks_exact(8);
    let chunks_b = b.chunks_exact(8);
    let tail: f32 = chunks_a
        .remainder()
        .iter()
        .zip(chunks_b.remainder())
        .map(|(x, y)| x * y)
        .sum();

    let mut acc = f32x8::ZERO;
    for (ca, cb) in chunks_a.zip(chunks_b) {
        let mut la = [0.0_f32; 8];
        let mut lb = [0.0_f32; 8];
        la.copy_from_slice(ca);
        lb.copy_from_slice(cb);
        acc = acc + f32x8::new(la) * f32x8::new(lb);
    }

    acc.reduce_add() + tail
}

/// L2 norm.
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Unit-length copy of `v`; the zero vector when the norm is ~0.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n <= ZERO_NORM_EPSILON {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / n).collect()
}

/// Cosine similarity in `[-1, 1]`; 0 if either vector has a ~0 norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a <= ZERO_NORM_EPSILON || norm_b <= ZERO_NORM_EPSILON {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Cosine similarity of two vectors already normalized by [`normalized`].
pub fn unit_similarity(a: &[f32], b: &[f32]) -> f32 {
    dot(a, b).clamp(-1.0, 1.0)
}

/// Cosine distance `1 - similarity`, clamped to `[0, 2]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_matches_scalar() {
        let a: Vec<f32> = (0..19).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..19).map(|i| 1.0 - i as f32 * 0.1).collect();
        let expected: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        assert!((dot(&a, &b) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_is_zero_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(normalized(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_normalized_has_unit_norm() {
        let v = normalized(&[3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 12.0]);
        assert!((norm(&v) - 1.0).abs() < 1e-6);
        assert!((unit_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }
}
