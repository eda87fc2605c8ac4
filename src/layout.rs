//! Dense matrix addressing: layout, transposition, submatrix arithmetic
//!
//! All dense buffers in this crate follow the BLAS convention: a matrix is a
//! `(buffer, layout, leading dimension)` triple with
//! `M[i, j] = buffer[i + j * ld]` (column-major) or
//! `M[i, j] = buffer[i * ld + j]` (row-major).

use crate::error::{Error, Result};

/// Storage order of a dense matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `M[i, j] = buffer[i * ld + j]`
    RowMajor,
    /// `M[i, j] = buffer[i + j * ld]`
    ColMajor,
}

impl Layout {
    /// The opposite storage order
    ///
    /// Reinterpreting a buffer under the flipped layout transposes the
    /// matrix it represents, which is why layout and transposition are
    /// interchangeable for 2D buffers.
    #[inline]
    pub fn flipped(self) -> Layout {
        match self {
            Layout::RowMajor => Layout::ColMajor,
            Layout::ColMajor => Layout::RowMajor,
        }
    }
}

/// Whether an operand enters a multiply as itself or transposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `op(M) = M`
    NoTrans,
    /// `op(M) = M^T`
    Trans,
}

impl Op {
    /// The opposite transposition flag
    #[inline]
    pub fn flipped(self) -> Op {
        match self {
            Op::NoTrans => Op::Trans,
            Op::Trans => Op::NoTrans,
        }
    }
}

/// Shape of the stored operand, given the shape of `op(operand)`
///
/// If `op(M)` is `rows x cols`, the matrix `M` as stored is `rows x cols`
/// for `NoTrans` and `cols x rows` for `Trans`.
#[inline]
pub fn dims_before_op(rows: usize, cols: usize, op: Op) -> (usize, usize) {
    match op {
        Op::NoTrans => (rows, cols),
        Op::Trans => (cols, rows),
    }
}

/// Element strides `(row_stride, col_stride)` for reading `op(M)` out of a
/// buffer stored with the given layout and leading dimension
///
/// Folding both layout and transposition into two strides is what lets the
/// kernels reinterpret buffers instead of copying them.
#[inline]
pub fn op_strides(layout: Layout, op: Op, ld: usize) -> (usize, usize) {
    match (layout, op) {
        (Layout::ColMajor, Op::NoTrans) => (1, ld),
        (Layout::ColMajor, Op::Trans) => (ld, 1),
        (Layout::RowMajor, Op::NoTrans) => (ld, 1),
        (Layout::RowMajor, Op::Trans) => (1, ld),
    }
}

/// Buffer offset and leading dimension of the `(ro, co)` submatrix of a
/// fully materialized `n_rows x n_cols` operator stored in `layout`
///
/// The submatrix shares the parent's leading dimension; only the starting
/// offset moves.
#[inline]
pub fn submatrix_offset(layout: Layout, n_rows: usize, n_cols: usize, ro: usize, co: usize) -> (usize, usize) {
    match layout {
        Layout::ColMajor => (ro + n_rows * co, n_rows),
        Layout::RowMajor => (ro * n_cols + co, n_cols),
    }
}

/// Minimum buffer length for a `rows x cols` matrix stored with `layout`
/// and leading dimension `ld`
#[inline]
pub fn required_len(layout: Layout, rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        return 0;
    }
    match layout {
        Layout::ColMajor => ld * (cols - 1) + rows,
        Layout::RowMajor => ld * (rows - 1) + cols,
    }
}

/// Check a leading dimension against the minor-axis extent required by the
/// layout, then check the buffer is long enough
pub fn check_dense_operand<T>(
    name: &'static str,
    layout: Layout,
    rows: usize,
    cols: usize,
    buf: &[T],
    ld: usize,
) -> Result<()> {
    let min_ld = match layout {
        Layout::ColMajor => rows,
        Layout::RowMajor => cols,
    };
    if ld < min_ld {
        return Err(Error::leading_dim(name, ld, min_ld));
    }
    let required = required_len(layout, rows, cols, ld);
    if buf.len() < required {
        return Err(Error::buffer_too_small(name, buf.len(), required));
    }
    Ok(())
}
