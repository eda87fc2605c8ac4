//! Sparse-times-dense multiply with the full GEMM contract
//!
//! `left_spmm` computes `B := alpha * op(submat(S)) * op(A) + beta * B` for
//! a COO-backed operator `S`; `right_spmm` is the mirrored product. The
//! requested window of `S` is extracted into a compressed structure by one
//! linear scan over sorted coordinates, with `alpha` folded into the values
//! so no separate scaling pass runs. The accumulation is parallel over the
//! output's contiguous axis; no two tasks ever touch the same output vector.

use std::borrow::Cow;

use crate::blas::{for_each_major_vec, scale_out};
use crate::error::{Error, Result};
use crate::layout::{check_dense_operand, dims_before_op, op_strides, Layout, Op};
use crate::scalar::Scalar;

use super::{sort_coo_data, CooView, IndexBase, NonzeroSort};

/// Compressed window of a COO operator with `alpha` folded into the values
///
/// `ptr` has one entry per major index of the window plus one; `idxs` holds
/// rebased minor indices.
struct CompressedWindow<T> {
    ptr: Vec<i64>,
    idxs: Vec<i64>,
    vals: Vec<T>,
}

/// Triples of `s` in the requested order, borrowing when the recorded sort
/// already matches and sorting a scratch copy otherwise
///
/// The original data is never mutated, which keeps the transient re-sort
/// invisible to the caller.
fn sorted_triples<'a, T: Scalar>(
    s: &CooView<'a, T>,
    order: NonzeroSort,
) -> (Cow<'a, [T]>, Cow<'a, [i64]>, Cow<'a, [i64]>) {
    if s.sort() == order {
        (
            Cow::Borrowed(s.vals()),
            Cow::Borrowed(s.rows()),
            Cow::Borrowed(s.cols()),
        )
    } else {
        let mut vals = s.vals().to_vec();
        let mut rows = s.rows().to_vec();
        let mut cols = s.cols().to_vec();
        sort_coo_data(order, &mut vals, &mut rows, &mut cols);
        (Cow::Owned(vals), Cow::Owned(rows), Cow::Owned(cols))
    }
}

/// Extract the window `[major_start, major_end) x [minor_start, minor_end)`
/// from major-sorted triples
///
/// One linear scan builds a pointer array into the source (O(nnz + width)),
/// then the kept entries are compacted with rebased minor indices and
/// `alpha`-scaled values.
#[allow(clippy::too_many_arguments)]
fn filtered_window<T: Scalar>(
    major: &[i64],
    minor: &[i64],
    vals: &[T],
    major_start: i64,
    major_end: i64,
    minor_start: i64,
    minor_end: i64,
    alpha: T,
) -> CompressedWindow<T> {
    let width = (major_end - major_start) as usize;
    let mut src_ptr = vec![0i64; width + 1];
    let mut ell = 0usize;
    while ell < major.len() && major[ell] < major_start {
        ell += 1;
    }
    src_ptr[0] = ell as i64;
    for j in 0..width {
        while ell < major.len() && major[ell] <= major_start + j as i64 {
            ell += 1;
        }
        src_ptr[j + 1] = ell as i64;
    }

    let mut ptr = vec![0i64; width + 1];
    let mut idxs = Vec::new();
    let mut out_vals = Vec::new();
    for j in 0..width {
        for k in src_ptr[j] as usize..src_ptr[j + 1] as usize {
            let i = minor[k];
            if i < minor_start || i >= minor_end {
                continue;
            }
            idxs.push(i - minor_start);
            out_vals.push(vals[k] * alpha);
        }
        ptr[j + 1] = idxs.len() as i64;
    }
    CompressedWindow {
        ptr,
        idxs,
        vals: out_vals,
    }
}

/// `B := alpha * op(submat(S)) * op(A) + beta * B`
///
/// `op(submat(S))` is `d x m` with the window anchored at `(ro_s, co_s)` of
/// `S`, `op(A)` is `m x n`, `B` is `d x n`. `A` and `B` share `layout`;
/// leading dimensions are validated against the layout's minor extent.
/// `beta` follows the GEMM contract exactly: each output vector is scaled
/// (or zeroed, for `beta == 0`) before any accumulation reaches it.
#[allow(clippy::too_many_arguments)]
pub fn left_spmm<T: Scalar>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: &CooView<'_, T>,
    ro_s: usize,
    co_s: usize,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    if s.index_base() != IndexBase::Zero {
        return Err(Error::UnsupportedIndexBase { op: "left_spmm" });
    }
    // Reduce to op_s == NoTrans: the transposed view swaps index buffers
    // and the window offsets, no data moves.
    let (s_eff, ro, co) = match op_s {
        Op::NoTrans => (*s, ro_s, co_s),
        Op::Trans => (s.transposed(), co_s, ro_s),
    };
    if s_eff.n_rows() < d + ro || s_eff.n_cols() < m + co {
        return Err(Error::SubmatrixOutOfBounds {
            op_rows: s_eff.n_rows(),
            op_cols: s_eff.n_cols(),
            ro,
            co,
            rows: d,
            cols: m,
        });
    }
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    check_dense_operand("A", layout, rows_a, cols_a, a, lda)?;
    check_dense_operand("B", layout, d, n, b, ldb)?;
    if d == 0 || n == 0 {
        return Ok(());
    }

    let (ars, acs) = op_strides(layout, op_a, lda);

    if alpha == T::zero() {
        // A is not accessed; only the beta scaling of B remains.
        let (count, len) = match layout {
            Layout::ColMajor => (n, d),
            Layout::RowMajor => (d, n),
        };
        for_each_major_vec(b, ldb, count, count * len, |_, out| {
            scale_out(&mut out[..len], beta);
        });
        return Ok(());
    }

    match layout {
        Layout::ColMajor => {
            // Columns of B are contiguous: column-parallel scatter over a
            // column-compressed window.
            let (vals, rows, cols) = sorted_triples(&s_eff, NonzeroSort::Csc);
            let w = filtered_window(
                &cols,
                &rows,
                &vals,
                co as i64,
                (co + m) as i64,
                ro as i64,
                (ro + d) as i64,
                alpha,
            );
            let work = (w.vals.len() + d) * n;
            for_each_major_vec(b, ldb, n, work, |j, b_col| {
                scale_out(&mut b_col[..d], beta);
                for c in 0..m {
                    let x = a[c * ars + j * acs];
                    for k in w.ptr[c] as usize..w.ptr[c + 1] as usize {
                        let i = w.idxs[k] as usize;
                        b_col[i] = b_col[i] + w.vals[k] * x;
                    }
                }
            });
        }
        Layout::RowMajor => {
            // Rows of B are contiguous: row-parallel accumulation over a
            // row-compressed window.
            let (vals, rows, cols) = sorted_triples(&s_eff, NonzeroSort::Csr);
            let w = filtered_window(
                &rows,
                &cols,
                &vals,
                ro as i64,
                (ro + d) as i64,
                co as i64,
                (co + m) as i64,
                alpha,
            );
            let work = (w.vals.len() + n) * d;
            for_each_major_vec(b, ldb, d, work, |r, b_row| {
                scale_out(&mut b_row[..n], beta);
                for k in w.ptr[r] as usize..w.ptr[r + 1] as usize {
                    let c = w.idxs[k] as usize;
                    let v = w.vals[k];
                    for (j, out) in b_row.iter_mut().enumerate().take(n) {
                        *out = *out + v * a[c * ars + j * acs];
                    }
                }
            });
        }
    }
    Ok(())
}

/// `B := alpha * op(A) * op(submat(S)) + beta * B`
///
/// `op(A)` is `m x n`, `op(submat(S))` is `n x d` anchored at
/// `(ro_s, co_s)`, `B` is `m x d`. Implemented on the transposed problem:
/// flipping the layout reinterprets `A` and `B` as their transposes in
/// place, and flipping `op_s` transposes the operator view, so the left
/// kernel computes `B^T = alpha * op(submat(S))^T * op(A)^T + beta * B^T`
/// over the very same buffers.
#[allow(clippy::too_many_arguments)]
pub fn right_spmm<T: Scalar>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: &CooView<'_, T>,
    ro_s: usize,
    co_s: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    left_spmm(
        layout.flipped(),
        op_s.flipped(),
        op_a,
        d,
        m,
        n,
        alpha,
        s,
        ro_s,
        co_s,
        a,
        lda,
        beta,
        b,
        ldb,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CooMatrix;

    // S = [1 0 2]
    //     [0 3 0]
    fn operator() -> CooMatrix<f64> {
        CooMatrix::from_triples(
            2,
            3,
            vec![0, 0, 1],
            vec![0, 2, 1],
            vec![1.0, 2.0, 3.0],
            IndexBase::Zero,
        )
        .unwrap()
    }

    #[test]
    fn window_extraction_rebases_and_scales() {
        let m = operator();
        let (vals, rows, cols) = sorted_triples(&m.view(), NonzeroSort::Csc);
        let w = filtered_window(&cols, &rows, &vals, 1, 3, 0, 2, 10.0);
        // columns 1..3, all rows: entries (1,1)=3 and (0,2)=2
        assert_eq!(w.ptr, vec![0, 1, 2]);
        assert_eq!(w.idxs, vec![1, 0]);
        assert_eq!(w.vals, vec![30.0, 20.0]);
    }

    #[test]
    fn left_spmm_matches_hand_product() {
        let s = operator();
        // A = [1 4; 2 5; 3 6], col-major
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut b = vec![0.0; 4];
        left_spmm(
            Layout::ColMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            2,
            3,
            1.0,
            &s.view(),
            0,
            0,
            &a,
            3,
            0.0,
            &mut b,
            2,
        )
        .unwrap();
        // S*A = [7 16; 6 15], col-major
        assert_eq!(b, vec![7.0, 6.0, 16.0, 15.0]);
    }

    #[test]
    fn left_spmm_row_major_agrees_with_col_major() {
        let s = operator();
        let a_cm = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 3x2 col-major
        let a_rm = vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]; // same matrix row-major
        let mut b_cm = vec![0.0; 4];
        let mut b_rm = vec![0.0; 4];
        left_spmm(
            Layout::ColMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            2,
            3,
            1.0,
            &s.view(),
            0,
            0,
            &a_cm,
            3,
            0.0,
            &mut b_cm,
            2,
        )
        .unwrap();
        left_spmm(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            2,
            3,
            1.0,
            &s.view(),
            0,
            0,
            &a_rm,
            2,
            0.0,
            &mut b_rm,
            2,
        )
        .unwrap();
        // b_cm col-major vs b_rm row-major of the same 2x2 product
        assert_eq!(b_cm[0], b_rm[0]);
        assert_eq!(b_cm[1], b_rm[2]);
        assert_eq!(b_cm[2], b_rm[1]);
        assert_eq!(b_cm[3], b_rm[3]);
    }

    #[test]
    fn transposed_operator_flips_roles() {
        let s = operator();
        // op(S) = S^T is 3x2; B = S^T * A with A = I_2
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let mut b = vec![0.0; 6];
        left_spmm(
            Layout::ColMajor,
            Op::Trans,
            Op::NoTrans,
            3,
            2,
            2,
            1.0,
            &s.view(),
            0,
            0,
            &a,
            2,
            0.0,
            &mut b,
            3,
        )
        .unwrap();
        // S^T = [1 0; 0 3; 2 0], col-major
        assert_eq!(b, vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn beta_scales_before_accumulation() {
        let s = operator();
        let a = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]; // I_3
        let mut b = vec![1.0; 6];
        left_spmm(
            Layout::ColMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            3,
            3,
            1.0,
            &s.view(),
            0,
            0,
            &a,
            3,
            2.0,
            &mut b,
            2,
        )
        .unwrap();
        // 2 * ones + S
        assert_eq!(b, vec![3.0, 2.0, 2.0, 5.0, 4.0, 2.0]);
    }

    #[test]
    fn right_spmm_multiplies_from_the_right() {
        let s = operator();
        // B = A * S^T with A = I_3 reads off S^T (3x2)
        let a = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut b = vec![0.0; 6];
        right_spmm(
            Layout::ColMajor,
            Op::NoTrans,
            Op::Trans,
            3,
            2,
            3,
            1.0,
            &a,
            3,
            &s.view(),
            0,
            0,
            0.0,
            &mut b,
            3,
        )
        .unwrap();
        assert_eq!(b, vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
    }
}
