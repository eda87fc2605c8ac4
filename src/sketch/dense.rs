//! GEMM-backed sketch kernels for dense operators

use crate::blas;
use crate::dense::{fill_dense_submat, DenseSkOp};
use crate::error::{Error, Result};
use crate::layout::{check_dense_operand, dims_before_op, submatrix_offset, Layout, Op};
use crate::rng::CounterRng;
use crate::scalar::Scalar;

/// Validate the operator window and hand the multiply to GEMM, flipping the
/// transpose flag when the operator's storage layout differs from the
/// multiply layout
#[allow(clippy::too_many_arguments)]
fn gemm_with_operator<T: Scalar>(
    layout: Layout,
    op_s: Op,
    s_buf: &[T],
    s_layout: Layout,
    s_rows: usize,
    s_cols: usize,
    rows_w: usize,
    cols_w: usize,
    ro_s: usize,
    co_s: usize,
    side_args: SideArgs<'_, '_, T>,
) -> Result<()> {
    if s_rows < rows_w + ro_s || s_cols < cols_w + co_s {
        return Err(Error::SubmatrixOutOfBounds {
            op_rows: s_rows,
            op_cols: s_cols,
            ro: ro_s,
            co: co_s,
            rows: rows_w,
            cols: cols_w,
        });
    }
    let (pos, lds) = submatrix_offset(s_layout, s_rows, s_cols, ro_s, co_s);
    // Layout and transposition are interchangeable for a 2D buffer: a
    // mismatch flips the flag instead of copying the operator.
    let op_s = if s_layout != layout { op_s.flipped() } else { op_s };
    // An empty window at a maximal offset may start past the buffer end.
    let s_window = s_buf.get(pos..).unwrap_or(&[]);

    match side_args {
        SideArgs::Left {
            op_a,
            d,
            n,
            m,
            alpha,
            a,
            lda,
            beta,
            b,
            ldb,
        } => blas::gemm(
            layout, op_s, op_a, d, n, m, alpha, s_window, lds, a, lda, beta, b, ldb,
        ),
        SideArgs::Right {
            op_a,
            m,
            d,
            n,
            alpha,
            a,
            lda,
            beta,
            b,
            ldb,
        } => blas::gemm(
            layout, op_a, op_s, m, d, n, alpha, a, lda, s_window, lds, beta, b, ldb,
        ),
    }
}

enum SideArgs<'a, 'b, T> {
    Left {
        op_a: Op,
        d: usize,
        n: usize,
        m: usize,
        alpha: T,
        a: &'a [T],
        lda: usize,
        beta: T,
        b: &'b mut [T],
        ldb: usize,
    },
    Right {
        op_a: Op,
        m: usize,
        d: usize,
        n: usize,
        alpha: T,
        a: &'a [T],
        lda: usize,
        beta: T,
        b: &'b mut [T],
        ldb: usize,
    },
}

/// LSKGE3: `B := alpha * op(submat(S)) * op(A) + beta * B`
///
/// `op(submat(S))` is `d x m` anchored at `(ro_s, co_s)` of the dense
/// operator `S`, `op(A)` is `m x n`, `B` is `d x n`. `A` and `B` share
/// `layout` and their leading dimensions must reach the minor-axis extent
/// under it. An unmaterialized operator never triggers a full
/// materialization: only the requested window is synthesized into a
/// temporary and discarded after the multiply.
#[allow(clippy::too_many_arguments)]
pub fn lskge3<T: Scalar, G: CounterRng>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: &DenseSkOp<T, G>,
    ro_s: usize,
    co_s: usize,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    let (rows_w, cols_w) = dims_before_op(d, m, op_s);
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    check_dense_operand("A", layout, rows_a, cols_a, a, lda)?;
    check_dense_operand("B", layout, d, n, b, ldb)?;

    match s.buffer() {
        Some(s_buf) => gemm_with_operator(
            layout,
            op_s,
            s_buf,
            s.layout(),
            s.n_rows(),
            s.n_cols(),
            rows_w,
            cols_w,
            ro_s,
            co_s,
            SideArgs::Left {
                op_a,
                d,
                n,
                m,
                alpha,
                a,
                lda,
                beta,
                b,
                ldb,
            },
        ),
        None => {
            let dist = s.dist();
            let mut window = vec![T::zero(); rows_w * cols_w];
            fill_dense_submat(&dist, s.seed_state(), &mut window, rows_w, cols_w, ro_s, co_s)?;
            gemm_with_operator(
                layout,
                op_s,
                &window,
                Layout::RowMajor,
                rows_w,
                cols_w,
                rows_w,
                cols_w,
                0,
                0,
                SideArgs::Left {
                    op_a,
                    d,
                    n,
                    m,
                    alpha,
                    a,
                    lda,
                    beta,
                    b,
                    ldb,
                },
            )
        }
    }
}

/// RSKGE3: `B := alpha * op(A) * op(submat(S)) + beta * B`
///
/// `op(A)` is `m x n`, `op(submat(S))` is `n x d` anchored at
/// `(ro_s, co_s)`, `B` is `m x d`. Mirror image of [`lskge3`] with the
/// operator on the right; the same windowed-synthesis and layout-flip rules
/// apply.
#[allow(clippy::too_many_arguments)]
pub fn rskge3<T: Scalar, G: CounterRng>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: &DenseSkOp<T, G>,
    ro_s: usize,
    co_s: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    let (rows_w, cols_w) = dims_before_op(n, d, op_s);
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    check_dense_operand("A", layout, rows_a, cols_a, a, lda)?;
    check_dense_operand("B", layout, m, d, b, ldb)?;

    match s.buffer() {
        Some(s_buf) => gemm_with_operator(
            layout,
            op_s,
            s_buf,
            s.layout(),
            s.n_rows(),
            s.n_cols(),
            rows_w,
            cols_w,
            ro_s,
            co_s,
            SideArgs::Right {
                op_a,
                m,
                d,
                n,
                alpha,
                a,
                lda,
                beta,
                b,
                ldb,
            },
        ),
        None => {
            let dist = s.dist();
            let mut window = vec![T::zero(); rows_w * cols_w];
            fill_dense_submat(&dist, s.seed_state(), &mut window, rows_w, cols_w, ro_s, co_s)?;
            gemm_with_operator(
                layout,
                op_s,
                &window,
                Layout::RowMajor,
                rows_w,
                cols_w,
                rows_w,
                cols_w,
                0,
                0,
                SideArgs::Right {
                    op_a,
                    m,
                    d,
                    n,
                    alpha,
                    a,
                    lda,
                    beta,
                    b,
                    ldb,
                },
            )
        }
    }
}
