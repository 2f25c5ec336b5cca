//! # Explained variance
//!
//! Per-component variance and its share of the total sample variance of the
//! data, following the usual `s² / (n - 1)` convention.

use log::debug;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Explained variance of a set of components.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainedVariance {
    /// `s[i]² / max(1, n - 1)` per component.
    pub variance: Array1<f32>,
    /// `variance[i] / total_variance`.
    pub ratio: Array1<f32>,
    /// Sum of the column sample variances, floored to `1.0` when it is not
    /// positive.
    pub total_variance: f64,
}

impl ExplainedVariance {
    /// Computes the statistics for singular values `s` of the row-major
    /// `n x m` matrix `x`.
    ///
    /// Column means are recomputed from `x`; it does not have to be centered.
    /// `x` must be the matrix the singular values were computed from (the
    /// centered one for PCA), otherwise the ratios are meaningless.
    pub fn compute(x: ArrayView2<f32>, s: ArrayView1<f32>) -> Self {
        let n = x.nrows();
        let denom = n.saturating_sub(1).max(1) as f64;

        let variance = s.mapv(|v| ((v as f64) * (v as f64) / denom) as f32);

        let mut total_variance = total_sample_variance(x, denom);
        if total_variance <= 0.0 {
            debug!(
                "total variance {} is not positive, using 1.0 instead",
                total_variance
            );
            total_variance = 1.0;
        }

        let ratio = variance.mapv(|v| (v as f64 / total_variance) as f32);

        ExplainedVariance {
            variance,
            ratio,
            total_variance,
        }
    }

    /// Running sum of the ratios, useful to pick the number of components
    /// needed to reach a variance target.
    pub fn cumulative_ratio(&self) -> Array1<f32> {
        let mut sum = 0.0f32;
        self.ratio.mapv(|r| {
            sum += r;
            sum
        })
    }

    pub fn len(&self) -> usize {
        self.variance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variance.is_empty()
    }
}

/// Column means of a row-major matrix, accumulated in `f64`.
pub fn column_means(x: ArrayView2<f32>) -> Array1<f64> {
    let n = x.nrows().max(1) as f64;
    x.columns()
        .into_iter()
        .map(|col| col.iter().map(|&v| v as f64).sum::<f64>() / n)
        .collect()
}

fn total_sample_variance(x: ArrayView2<f32>, denom: f64) -> f64 {
    let means = column_means(x);
    x.columns()
        .into_iter()
        .zip(means.iter())
        .map(|(col, &mean)| {
            col.iter()
                .map(|&v| {
                    let d = v as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / denom
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_hand_computed_statistics() {
        // column variances: 1.0 and 4.0
        let x = array![[1.0f32, 0.0], [2.0, 2.0], [3.0, 4.0]];
        let s = array![3.0f32, 1.0];
        let ev = ExplainedVariance::compute(x.view(), s.view());

        assert_relative_eq!(ev.total_variance, 5.0, epsilon = 1e-12);
        assert_relative_eq!(ev.variance[0], 4.5, epsilon = 1e-6);
        assert_relative_eq!(ev.variance[1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(ev.ratio[0], 0.9, epsilon = 1e-6);
        assert_relative_eq!(ev.ratio[1], 0.1, epsilon = 1e-6);
        assert_eq!(ev.len(), 2);
    }

    #[test]
    fn test_means_are_recomputed() {
        let x = array![[1.0f32, 0.0], [2.0, 2.0], [3.0, 4.0]];
        let shifted = x.mapv(|v| v + 100.0);
        let s = array![3.0f32];

        let a = ExplainedVariance::compute(x.view(), s.view());
        let b = ExplainedVariance::compute(shifted.view(), s.view());
        assert_relative_eq!(a.total_variance, b.total_variance, epsilon = 1e-6);
    }

    #[test]
    fn test_constant_column_is_finite() {
        let x = array![[1.0f32, 5.0], [2.0, 5.0], [4.0, 5.0]];
        let s = array![2.0f32, 0.0];
        let ev = ExplainedVariance::compute(x.view(), s.view());

        assert!(ev.ratio.iter().all(|r| r.is_finite()));
        assert!(ev.total_variance > 0.0);
    }

    #[test]
    fn test_variance_floor() {
        let x = array![[3.0f32, -1.0], [3.0, -1.0], [3.0, -1.0]];
        let s = array![0.5f32];
        let ev = ExplainedVariance::compute(x.view(), s.view());

        assert_eq!(ev.total_variance, 1.0);
        assert_relative_eq!(ev.ratio[0], ev.variance[0]);
        assert!(ev.ratio.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_single_row_denominator() {
        let x = array![[1.0f32, 2.0, 3.0]];
        let s = array![2.0f32];
        let ev = ExplainedVariance::compute(x.view(), s.view());

        // n - 1 = 0 is clamped to 1
        assert_relative_eq!(ev.variance[0], 4.0);
        assert_eq!(ev.total_variance, 1.0);
    }

    #[test]
    fn test_cumulative_ratio() {
        let x = array![[1.0f32, 0.0], [2.0, 2.0], [3.0, 4.0]];
        let s = array![3.0f32, 1.0];
        let cumulative = ExplainedVariance::compute(x.view(), s.view()).cumulative_ratio();

        assert_relative_eq!(cumulative[0], 0.9, epsilon = 1e-6);
        assert_relative_eq!(cumulative[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_column_means() {
        let x = array![[1.0f32, 10.0], [3.0, 20.0]];
        let means = column_means(x.view());
        assert_eq!(means, array![2.0f64, 15.0]);
    }
}
