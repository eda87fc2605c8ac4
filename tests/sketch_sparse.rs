//! Integration tests for the sparse sketch kernels
//!
//! Every scenario cross-checks the sparse path against the dense path
//! applied to a densified copy of the same operator, so the two kernel
//! families must agree on the full layout/transpose/offset/alpha/beta
//! contract.

mod common;

use common::{assert_allclose, densify_sparse_skop};
use skops::dense::fill_dense_unpacked;
use skops::prelude::*;

fn random_dense(rows: usize, cols: usize, seed: u64) -> Vec<f64> {
    let mut m = vec![0.0; rows * cols];
    fill_dense_unpacked(&DenseDist::gaussian(rows, cols), RngState::<Philox4x32>::new(seed), &mut m).unwrap();
    m
}

/// Dense twin of a sparse operator, sharing shape and entries
fn dense_twin(s: &SparseSkOp<f64>) -> DenseSkOp<f64> {
    let dist = DenseDist::new(s.n_rows(), s.n_cols(), DenseDistName::Rademacher);
    DenseSkOp::with_buffer(dist, RngState::new(0), densify_sparse_skop(s)).unwrap()
}

fn filled(dist: SparseDist, seed: u64) -> SparseSkOp<f64> {
    let mut s = SparseSkOp::new(dist, RngState::new(seed)).unwrap();
    fill_sparse(&mut s).unwrap();
    s
}

#[test]
fn left_sketch_agrees_with_dense_path() {
    let (d, m, n) = (6, 15, 5);
    let a_rm = random_dense(m, n, 7);
    let a_cm = random_dense(m, n, 7); // reused as col-major content

    for layout in [Layout::RowMajor, Layout::ColMajor] {
        let (a, lda) = match layout {
            Layout::RowMajor => (&a_rm, n),
            Layout::ColMajor => (&a_cm, m),
        };
        let ldb = match layout {
            Layout::RowMajor => n,
            Layout::ColMajor => d,
        };
        let s = filled(SparseDist::new(d, m, 4), 11);
        let twin = dense_twin(&s);

        let mut b_sparse = vec![0.0; d * n];
        lskges(
            layout,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &s,
            0,
            0,
            a,
            lda,
            0.0,
            &mut b_sparse,
            ldb,
        )
        .unwrap();

        let mut b_dense = vec![0.0; d * n];
        lskge3(
            layout,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &twin,
            0,
            0,
            a,
            lda,
            0.0,
            &mut b_dense,
            ldb,
        )
        .unwrap();

        assert_allclose(&b_sparse, &b_dense, 1e-12, 1e-14, "left sketch");
    }
}

#[test]
fn transposed_operator_agrees_with_dense_path() {
    // a tall operator applied as op(S) = S^T
    let (d, m, n) = (6, 15, 4);
    let a = random_dense(m, n, 3);
    let s = filled(SparseDist::new(m, d, 3), 17);
    let twin = dense_twin(&s);

    let mut b_sparse = vec![0.0; d * n];
    lskges(
        Layout::RowMajor,
        Op::Trans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &s,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b_sparse,
        n,
    )
    .unwrap();

    let mut b_dense = vec![0.0; d * n];
    lskge3(
        Layout::RowMajor,
        Op::Trans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &twin,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b_dense,
        n,
    )
    .unwrap();

    assert_allclose(&b_sparse, &b_dense, 1e-12, 1e-14, "transposed sketch");
}

#[test]
fn submatrix_window_agrees_with_dense_path() {
    let (d0, m0) = (8, 20);
    let (d, m, n) = (5, 12, 6);
    let (ro, co) = (2, 4);
    let a = random_dense(m, n, 5);
    let s = filled(SparseDist::new(d0, m0, 3), 23);
    let twin = dense_twin(&s);

    for layout in [Layout::RowMajor, Layout::ColMajor] {
        let (a_buf, lda, ldb) = match layout {
            Layout::RowMajor => (a.clone(), n, n),
            Layout::ColMajor => (a.clone(), m, d),
        };
        let mut b_sparse = vec![0.0; d * n];
        lskges(
            layout,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &s,
            ro,
            co,
            &a_buf,
            lda,
            0.0,
            &mut b_sparse,
            ldb,
        )
        .unwrap();

        let mut b_dense = vec![0.0; d * n];
        lskge3(
            layout,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &twin,
            ro,
            co,
            &a_buf,
            lda,
            0.0,
            &mut b_dense,
            ldb,
        )
        .unwrap();

        assert_allclose(&b_sparse, &b_dense, 1e-12, 1e-14, "window sketch");
    }
}

#[test]
fn beta_accumulation_matches_dense_path() {
    let (d, m, n) = (4, 10, 3);
    let a = random_dense(m, n, 31);
    let s = filled(SparseDist::new(d, m, 2), 37);
    let twin = dense_twin(&s);

    let mut b_sparse = vec![1.0; d * n];
    let mut b_dense = vec![1.0; d * n];
    lskges(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        0.7,
        &s,
        0,
        0,
        &a,
        n,
        2.0,
        &mut b_sparse,
        n,
    )
    .unwrap();
    lskge3(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        0.7,
        &twin,
        0,
        0,
        &a,
        n,
        2.0,
        &mut b_dense,
        n,
    )
    .unwrap();
    assert_allclose(&b_sparse, &b_dense, 1e-12, 1e-14, "beta accumulate");

    // beta = 0 must overwrite stale contents, including NaN
    let mut b_nan = vec![f64::NAN; d * n];
    lskges(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        0.7,
        &s,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b_nan,
        n,
    )
    .unwrap();
    assert!(b_nan.iter().all(|v| v.is_finite()));
}

#[test]
fn alpha_zero_only_scales_b() {
    let (d, m, n) = (4, 10, 3);
    let a = vec![f64::NAN; m * n]; // must never be read
    let s = SparseSkOp::<f64>::new(SparseDist::new(d, m, 2), RngState::new(2)).unwrap();

    let mut b = vec![3.0; d * n];
    lskges(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        0.0,
        &s,
        0,
        0,
        &a,
        n,
        0.5,
        &mut b,
        n,
    )
    .unwrap();
    assert!(b.iter().all(|&v| v == 1.5));
}

#[test]
fn lazy_operator_agrees_with_filled() {
    let (d, m, n) = (5, 14, 4);
    let dist = SparseDist::new(d, m, 3);
    let a = random_dense(m, n, 41);

    let lazy = SparseSkOp::<f64>::new(dist, RngState::new(43)).unwrap();
    assert!(!lazy.is_materialized());
    let mut b_lazy = vec![0.0; d * n];
    lskges(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &lazy,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b_lazy,
        n,
    )
    .unwrap();
    // lazy application never mutates the operator itself
    assert!(!lazy.is_materialized());

    let s = filled(dist, 43);
    let mut b_filled = vec![0.0; d * n];
    lskges(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &s,
        0,
        0,
        &a,
        n,
        0.0,
        &mut b_filled,
        n,
    )
    .unwrap();
    assert_eq!(b_lazy, b_filled);
}

#[test]
fn right_sketch_agrees_with_dense_path() {
    let (m, d, n) = (9, 5, 12);
    let a = random_dense(m, n, 51);
    let s = filled(SparseDist::new(n, d, 4), 53);
    let twin = dense_twin(&s);

    for layout in [Layout::RowMajor, Layout::ColMajor] {
        let (lda, ldb) = match layout {
            Layout::RowMajor => (n, d),
            Layout::ColMajor => (m, m),
        };
        let mut b_sparse = vec![0.0; m * d];
        rskges(
            layout,
            Op::NoTrans,
            Op::NoTrans,
            m,
            d,
            n,
            1.0,
            &a,
            lda,
            &s,
            0,
            0,
            0.0,
            &mut b_sparse,
            ldb,
        )
        .unwrap();

        let mut b_dense = vec![0.0; m * d];
        rskge3(
            layout,
            Op::NoTrans,
            Op::NoTrans,
            m,
            d,
            n,
            1.0,
            &a,
            lda,
            &twin,
            0,
            0,
            0.0,
            &mut b_dense,
            ldb,
        )
        .unwrap();

        assert_allclose(&b_sparse, &b_dense, 1e-12, 1e-14, "right sketch");
    }
}

#[test]
fn general_dispatch_routes_both_kinds() {
    let (d, m, n) = (4, 12, 3);
    let a = random_dense(m, n, 61);
    let sparse = filled(SparseDist::new(d, m, 2), 67);
    let twin = dense_twin(&sparse);

    let mut b1 = vec![0.0; d * n];
    sketch_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &sparse,
        &a,
        n,
        0.0,
        &mut b1,
        n,
    )
    .unwrap();

    let mut b2 = vec![0.0; d * n];
    sketch_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d,
        n,
        m,
        1.0,
        &twin,
        &a,
        n,
        0.0,
        &mut b2,
        n,
    )
    .unwrap();
    assert_allclose(&b1, &b2, 1e-12, 1e-14, "dispatch");

    // shape-pinned wrapper rejects a mismatched operator
    let r = sketch_left(
        Layout::RowMajor,
        Op::NoTrans,
        Op::NoTrans,
        d + 1,
        n,
        m,
        1.0,
        &sparse,
        &a,
        n,
        0.0,
        &mut b1,
        n,
    );
    assert!(r.is_err());
}
