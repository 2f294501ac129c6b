//! SIMD helpers for windowed statistics.
//!
//! These use the `wide` crate for portable SIMD; the scalar tail handles
//! lengths that are not a multiple of four.

use wide::f64x4;

/// SIMD-optimized sum of a slice.
pub fn sum_simd(data: &[f64]) -> f64 {
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();

    let mut simd_sum = f64x4::splat(0.0);
    for chunk in chunks {
        simd_sum += f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    simd_sum.reduce_add() + tail.iter().sum::<f64>()
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean_simd(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(sum_simd(data) / data.len() as f64)
}

/// Population mean and standard deviation of a window.
pub fn mean_std_simd(window: &[f64]) -> Option<(f64, f64)> {
    let mean = mean_simd(window)?;

    let chunks = window.chunks_exact(4);
    let tail = chunks.remainder();
    let mean_vec = f64x4::splat(mean);

    let mut sum_sq = 0.0;
    for chunk in chunks {
        let diff = f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]) - mean_vec;
        sum_sq += (diff * diff).reduce_add();
    }
    for &value in tail {
        let diff = value - mean;
        sum_sq += diff * diff;
    }

    Some((mean, (sum_sq / window.len() as f64).sqrt()))
}

/// SIMD-optimized min/max finder.
pub fn minmax_simd(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }

    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    let mut min_vec = f64x4::splat(f64::INFINITY);
    let mut max_vec = f64x4::splat(f64::NEG_INFINITY);

    for chunk in chunks {
        let values = f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]);
        min_vec = min_vec.min(values);
        max_vec = max_vec.max(values);
    }

    let min = min_vec
        .to_array()
        .into_iter()
        .chain(tail.iter().copied())
        .fold(f64::INFINITY, f64::min);
    let max = max_vec
        .to_array()
        .into_iter()
        .chain(tail.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);

    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_simd() {
        let data: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert!((sum_simd(&data) - 5050.0).abs() < 1e-10);
        assert_eq!(sum_simd(&[]), 0.0);
        assert!((sum_simd(&[1.5, 2.5, 3.0]) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_std_simd() {
        // Population std dev of [2,4,4,4,5,5,7,9] is exactly 2
        let (mean, std) = mean_std_simd(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);

        assert!(mean_std_simd(&[]).is_none());
        assert_eq!(mean_std_simd(&[3.0, 3.0, 3.0]), Some((3.0, 0.0)));
    }

    #[test]
    fn test_minmax_simd() {
        let data = vec![5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 0.5];
        let (min, max) = minmax_simd(&data).unwrap();

        assert!((min - 0.5).abs() < 1e-10);
        assert!((max - 9.0).abs() < 1e-10);
        assert!(minmax_simd(&[]).is_none());
    }
}
