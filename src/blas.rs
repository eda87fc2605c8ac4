//! Trusted dense kernels: GEMM, scaling, copy, strided swap
//!
//! Native implementations of the BLAS/LAPACK primitives the sketch kernels
//! delegate to. Layout and transposition are folded into element strides,
//! never resolved by copying, and the GEMM runs parallel over the output's
//! contiguous axis above a size threshold.

use crate::error::Result;
use crate::layout::{check_dense_operand, dims_before_op, op_strides, Layout, Op};
use crate::scalar::Scalar;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Approximate flop count below which kernels skip the thread pool
#[cfg(feature = "rayon")]
pub(crate) const PARALLEL_THRESHOLD: usize = 1 << 14;

/// Scale a contiguous output vector by beta
///
/// `beta == 0` writes zeros outright, so uninitialized or NaN contents of
/// the output never leak into the result. This matches the GEMM convention
/// that `B` need not be set on entry when `beta` is zero.
#[inline]
pub(crate) fn scale_out<T: Scalar>(out: &mut [T], beta: T) {
    if beta == T::zero() {
        for x in out.iter_mut() {
            *x = T::zero();
        }
    } else if beta != T::one() {
        for x in out.iter_mut() {
            *x = *x * beta;
        }
    }
}

/// Run `f` over the first `count` major vectors of a strided buffer
///
/// Each vector is a disjoint `&mut` chunk of length `ld` (the last may be
/// shorter), so the parallel path is race-free by construction.
pub(crate) fn for_each_major_vec<T, F>(
    buf: &mut [T],
    ld: usize,
    count: usize,
    #[allow(unused_variables)] work: usize,
    f: F,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if count == 0 || ld == 0 {
        return;
    }
    #[cfg(feature = "rayon")]
    if work >= PARALLEL_THRESHOLD {
        buf.par_chunks_mut(ld)
            .take(count)
            .enumerate()
            .for_each(|(j, chunk)| f(j, chunk));
        return;
    }
    for (j, chunk) in buf.chunks_mut(ld).take(count).enumerate() {
        f(j, chunk);
    }
}

/// General matrix multiply: `C := alpha * op(A) * op(B) + beta * C`
///
/// `op(A)` is `m x k`, `op(B)` is `k x n`, `C` is `m x n`. All three
/// matrices share `layout`; each has its own leading dimension, validated
/// against the minor-axis extent before any element is touched. `A` and `B`
/// are not accessed when `alpha` is zero; `C` need not be set on entry when
/// `beta` is zero.
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    layout: Layout,
    transa: Op,
    transb: Op,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) -> Result<()> {
    let (rows_a, cols_a) = dims_before_op(m, k, transa);
    check_dense_operand("A", layout, rows_a, cols_a, a, lda)?;
    let (rows_b, cols_b) = dims_before_op(k, n, transb);
    check_dense_operand("B", layout, rows_b, cols_b, b, ldb)?;
    check_dense_operand("C", layout, m, n, c, ldc)?;
    if m == 0 || n == 0 {
        return Ok(());
    }

    let (ars, acs) = op_strides(layout, transa, lda);
    let (brs, bcs) = op_strides(layout, transb, ldb);
    let work = m * n * k.max(1);

    match layout {
        Layout::ColMajor => {
            // Columns of C are contiguous: parallelize over j
            for_each_major_vec(c, ldc, n, work, |j, col| {
                scale_out(&mut col[..m], beta);
                if alpha == T::zero() {
                    return;
                }
                for kk in 0..k {
                    let bv = alpha * b[kk * brs + j * bcs];
                    for (i, out) in col.iter_mut().enumerate().take(m) {
                        *out = *out + a[i * ars + kk * acs] * bv;
                    }
                }
            });
        }
        Layout::RowMajor => {
            // Rows of C are contiguous: parallelize over i
            for_each_major_vec(c, ldc, m, work, |i, row| {
                scale_out(&mut row[..n], beta);
                if alpha == T::zero() {
                    return;
                }
                for kk in 0..k {
                    let av = alpha * a[i * ars + kk * acs];
                    for (j, out) in row.iter_mut().enumerate().take(n) {
                        *out = *out + av * b[kk * brs + j * bcs];
                    }
                }
            });
        }
    }
    Ok(())
}

/// Scale a contiguous vector in place: `x := alpha * x`
pub fn scal<T: Scalar>(alpha: T, x: &mut [T]) {
    for v in x.iter_mut() {
        *v = *v * alpha;
    }
}

/// Scale a strided vector in place
pub fn scal_strided<T: Scalar>(count: usize, alpha: T, x: &mut [T], start: usize, inc: usize) {
    for t in 0..count {
        let idx = start + t * inc;
        x[idx] = x[idx] * alpha;
    }
}

/// Copy `op(A)` (`m x n`) into `B`, both in `layout`
///
/// The lacpy-equivalent primitive, extended with a transpose flag folded
/// into the read strides.
#[allow(clippy::too_many_arguments)]
pub fn copy_mat<T: Scalar>(
    layout: Layout,
    op_a: Op,
    m: usize,
    n: usize,
    a: &[T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    check_dense_operand("A", layout, rows_a, cols_a, a, lda)?;
    check_dense_operand("B", layout, m, n, b, ldb)?;
    let (ars, acs) = op_strides(layout, op_a, lda);
    let (brs, bcs) = op_strides(layout, Op::NoTrans, ldb);
    for i in 0..m {
        for j in 0..n {
            b[i * brs + j * bcs] = a[i * ars + j * acs];
        }
    }
    Ok(())
}

/// Swap two equal-length strided vectors living in one buffer
///
/// Used to exchange rows of a matrix in place; the vectors must not
/// overlap.
pub fn swap_strided<T>(
    buf: &mut [T],
    count: usize,
    start_x: usize,
    inc_x: usize,
    start_y: usize,
    inc_y: usize,
) {
    for t in 0..count {
        buf.swap(start_x + t * inc_x, start_y + t * inc_y);
    }
}
