//! Sparse sketch kernels: lazy materialization plus the spmm contract

use crate::error::Result;
use crate::layout::{Layout, Op};
use crate::rng::CounterRng;
use crate::scalar::Scalar;
use crate::sparse::{left_spmm, right_spmm};
use crate::sparse_skop::{fill_sparse, SparseSkOp};

/// LSKGES: `B := alpha * op(submat(S)) * op(A) + beta * B`
///
/// Same contract as [`crate::sketch::lskge3`] with a sparse operator. An
/// unmaterialized operator is filled into a transparent temporary; the
/// operator passed by the caller is never mutated.
#[allow(clippy::too_many_arguments)]
pub fn lskges<T: Scalar, G: CounterRng>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: &SparseSkOp<T, G>,
    ro_s: usize,
    co_s: usize,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    match s.coo_view() {
        Some(view) => left_spmm(
            layout, op_s, op_a, d, n, m, alpha, &view, ro_s, co_s, a, lda, beta, b, ldb,
        ),
        None => {
            let mut tmp = SparseSkOp::new(s.dist(), s.seed_state())?;
            fill_sparse(&mut tmp)?;
            lskges(
                layout, op_s, op_a, d, n, m, alpha, &tmp, ro_s, co_s, a, lda, beta, b, ldb,
            )
        }
    }
}

/// RSKGES: `B := alpha * op(A) * op(submat(S)) + beta * B`
///
/// Mirror image of [`lskges`] with the operator on the right.
#[allow(clippy::too_many_arguments)]
pub fn rskges<T: Scalar, G: CounterRng>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: &SparseSkOp<T, G>,
    ro_s: usize,
    co_s: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    match s.coo_view() {
        Some(view) => right_spmm(
            layout, op_a, op_s, m, d, n, alpha, a, lda, &view, ro_s, co_s, beta, b, ldb,
        ),
        None => {
            let mut tmp = SparseSkOp::new(s.dist(), s.seed_state())?;
            fill_sparse(&mut tmp)?;
            rskges(
                layout, op_a, op_s, m, d, n, alpha, a, lda, &tmp, ro_s, co_s, beta, b, ldb,
            )
        }
    }
}
