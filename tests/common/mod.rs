//! Common test utilities
#![allow(dead_code)]

use skops::prelude::*;

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// n x n identity; the buffer is the same in either layout
pub fn eye(n: usize) -> Vec<f64> {
    let mut m = vec![0.0; n * n];
    for i in 0..n {
        m[i * n + i] = 1.0;
    }
    m
}

/// Row-major densification of a sparse operator's nonzero structure
pub fn densify_sparse_skop(s: &SparseSkOp<f64>) -> Vec<f64> {
    let view = s.coo_view().expect("operator must be materialized");
    let mut dense = vec![0.0; s.n_rows() * s.n_cols()];
    for ((&r, &c), &v) in view.rows().iter().zip(view.cols()).zip(view.vals()) {
        dense[r as usize * s.n_cols() + c as usize] = v;
    }
    dense
}

/// A reproducible dense matrix with roughly `prob_of_zero` of its entries
/// zeroed, row-major
pub fn sparsify_random_dense(
    n_rows: usize,
    n_cols: usize,
    prob_of_zero: f64,
    seed: u64,
) -> Vec<f64> {
    let dist = DenseDist::new(n_rows, n_cols, DenseDistName::Uniform);
    let state: RngState = RngState::new(seed);
    let mut mask = vec![0.0; n_rows * n_cols];
    let next = skops::dense::fill_dense_unpacked(&dist, state, &mut mask).unwrap();
    let mut vals = vec![0.0; n_rows * n_cols];
    skops::dense::fill_dense_unpacked(&dist, next, &mut vals).unwrap();
    for (v, m) in vals.iter_mut().zip(mask.iter()) {
        if (m + 1.0) / 2.0 < prob_of_zero {
            *v = 0.0;
        }
    }
    vals
}

/// Asymptotic two-sided Kolmogorov-Smirnov critical value
pub fn ks_critical_value(num_samples: usize, significance: f64) -> f64 {
    (-0.5 * (significance / 2.0).ln()).sqrt() / (num_samples as f64).sqrt()
}

/// Check an index sample against a reference CDF at every support point
pub fn index_set_ks_check(samples: &[i64], true_cdf: &[f64], critical_value: f64) {
    let n = true_cdf.len();
    let mut sample_cdf = vec![0.0f64; n];
    for &s in samples {
        sample_cdf[s as usize] += 1.0;
    }
    weights_to_cdf(&mut sample_cdf).unwrap();
    for i in 0..n {
        let diff = (sample_cdf[i] - true_cdf[i]).abs();
        assert!(
            diff < critical_value,
            "KS check failed at index {}: |{} - {}| = {} >= {}",
            i,
            sample_cdf[i],
            true_cdf[i],
            diff,
            critical_value
        );
    }
}
