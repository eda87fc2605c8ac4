//! Sketch-multiply entry points
//!
//! The concrete kernels are [`lskge3`]/[`rskge3`] (dense operators, GEMM
//! effort) and [`lskges`]/[`rskges`] (sparse operators, scatter effort).
//! [`sketch_general_left`] and [`sketch_general_right`] dispatch once over
//! the closed operator set; the offset-free wrappers additionally pin the
//! operator's declared shape to the multiply dimensions.

mod dense;
mod sparse;

pub use dense::{lskge3, rskge3};
pub use sparse::{lskges, rskges};

use crate::dense::DenseSkOp;
use crate::error::{Error, Result};
use crate::layout::{dims_before_op, Layout, Op};
use crate::rng::CounterRng;
use crate::scalar::Scalar;
use crate::sparse_skop::SparseSkOp;

/// Borrowed reference to any sketching operator the general entry points
/// accept
///
/// A closed set: each variant has exactly one kernel pair, chosen once at
/// dispatch.
#[derive(Debug, Clone, Copy)]
pub enum SketchOp<'a, T: Scalar, G: CounterRng> {
    /// Dense operator, applied with GEMM effort
    Dense(&'a DenseSkOp<T, G>),
    /// Sparse operator, applied with scatter effort
    Sparse(&'a SparseSkOp<T, G>),
}

impl<T: Scalar, G: CounterRng> SketchOp<'_, T, G> {
    /// Declared shape of the operator
    pub fn dims(&self) -> (usize, usize) {
        match self {
            SketchOp::Dense(s) => (s.n_rows(), s.n_cols()),
            SketchOp::Sparse(s) => (s.n_rows(), s.n_cols()),
        }
    }
}

impl<'a, T: Scalar, G: CounterRng> From<&'a DenseSkOp<T, G>> for SketchOp<'a, T, G> {
    fn from(s: &'a DenseSkOp<T, G>) -> Self {
        SketchOp::Dense(s)
    }
}

impl<'a, T: Scalar, G: CounterRng> From<&'a SparseSkOp<T, G>> for SketchOp<'a, T, G> {
    fn from(s: &'a SparseSkOp<T, G>) -> Self {
        SketchOp::Sparse(s)
    }
}

/// Sketch from the left: `B := alpha * op(submat(S)) * op(A) + beta * B`
///
/// Dispatches to [`lskge3`] or [`lskges`] according to the operator kind.
#[allow(clippy::too_many_arguments)]
pub fn sketch_general_left<'a, T: Scalar, G: CounterRng>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: impl Into<SketchOp<'a, T, G>>,
    ro_s: usize,
    co_s: usize,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    match s.into() {
        SketchOp::Dense(s) => lskge3(
            layout, op_s, op_a, d, n, m, alpha, s, ro_s, co_s, a, lda, beta, b, ldb,
        ),
        SketchOp::Sparse(s) => lskges(
            layout, op_s, op_a, d, n, m, alpha, s, ro_s, co_s, a, lda, beta, b, ldb,
        ),
    }
}

/// Sketch from the right: `B := alpha * op(A) * op(submat(S)) + beta * B`
///
/// Dispatches to [`rskge3`] or [`rskges`] according to the operator kind.
#[allow(clippy::too_many_arguments)]
pub fn sketch_general_right<'a, T: Scalar, G: CounterRng>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: impl Into<SketchOp<'a, T, G>>,
    ro_s: usize,
    co_s: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    match s.into() {
        SketchOp::Dense(s) => rskge3(
            layout, op_a, op_s, m, d, n, alpha, a, lda, s, ro_s, co_s, beta, b, ldb,
        ),
        SketchOp::Sparse(s) => rskges(
            layout, op_a, op_s, m, d, n, alpha, a, lda, s, ro_s, co_s, beta, b, ldb,
        ),
    }
}

/// Sketch from the left with the whole operator
///
/// Like [`sketch_general_left`] with zero offsets, after checking that the
/// operator's declared shape matches `op(S) = d x m` exactly.
#[allow(clippy::too_many_arguments)]
pub fn sketch_left<'a, T: Scalar, G: CounterRng>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: impl Into<SketchOp<'a, T, G>>,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    let s = s.into();
    let expected = dims_before_op(d, m, op_s);
    if s.dims() != expected {
        return Err(Error::shape_mismatch(
            &[expected.0, expected.1],
            &[s.dims().0, s.dims().1],
        ));
    }
    sketch_general_left(layout, op_s, op_a, d, n, m, alpha, s, 0, 0, a, lda, beta, b, ldb)
}

/// Sketch from the right with the whole operator
///
/// Like [`sketch_general_right`] with zero offsets, after checking that the
/// operator's declared shape matches `op(S) = n x d` exactly.
#[allow(clippy::too_many_arguments)]
pub fn sketch_right<'a, T: Scalar, G: CounterRng>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: impl Into<SketchOp<'a, T, G>>,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    let s = s.into();
    let expected = dims_before_op(n, d, op_s);
    if s.dims() != expected {
        return Err(Error::shape_mismatch(
            &[expected.0, expected.1],
            &[s.dims().0, s.dims().1],
        ));
    }
    sketch_general_right(layout, op_a, op_s, m, d, n, alpha, a, lda, s, 0, 0, beta, b, ldb)
}
