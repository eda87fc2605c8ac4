//! CSR (compressed sparse row) storage and format conversions

use super::{coo_sort_type, sort_coo_data, CooMatrix, IndexBase, NonzeroSort};
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::scalar::Scalar;

/// Owned CSR sparse matrix
///
/// `rowptr` has `n_rows + 1` entries: non-decreasing zero-based offsets into
/// `vals`/`colidxs`, with `rowptr[0] == 0` and `rowptr[n_rows] == nnz`.
/// Entries within a row are not required to be column-sorted.
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: Scalar> {
    n_rows: usize,
    n_cols: usize,
    index_base: IndexBase,
    vals: Vec<T>,
    rowptr: Vec<i64>,
    colidxs: Vec<i64>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Empty matrix of the given shape
    pub fn new(n_rows: usize, n_cols: usize, index_base: IndexBase) -> Self {
        CsrMatrix {
            n_rows,
            n_cols,
            index_base,
            vals: Vec::new(),
            rowptr: vec![0; n_rows + 1],
            colidxs: Vec::new(),
        }
    }

    /// Build a matrix from validated CSR buffers
    pub fn from_parts(
        n_rows: usize,
        n_cols: usize,
        rowptr: Vec<i64>,
        colidxs: Vec<i64>,
        vals: Vec<T>,
        index_base: IndexBase,
    ) -> Result<Self> {
        if rowptr.len() != n_rows + 1 {
            return Err(Error::shape_mismatch(&[n_rows + 1], &[rowptr.len()]));
        }
        if colidxs.len() != vals.len() {
            return Err(Error::shape_mismatch(&[vals.len()], &[colidxs.len()]));
        }
        if rowptr[0] != 0 || rowptr[n_rows] != vals.len() as i64 {
            return Err(Error::invalid_arg(
                "rowptr",
                "rowptr must start at 0 and end at nnz",
            ));
        }
        if rowptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::invalid_arg("rowptr", "rowptr must be non-decreasing"));
        }
        let base = index_base.offset();
        for &c in &colidxs {
            if c < base || (c - base) as usize >= n_cols {
                return Err(Error::IndexOutOfBounds { index: c, size: n_cols });
            }
        }
        Ok(CsrMatrix {
            n_rows,
            n_cols,
            index_base,
            vals,
            rowptr,
            colidxs,
        })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored nonzeros
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Index convention of the stored column indices
    pub fn index_base(&self) -> IndexBase {
        self.index_base
    }

    /// Stored values
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Row offsets, length `n_rows + 1`
    pub fn rowptr(&self) -> &[i64] {
        &self.rowptr
    }

    /// Stored column indices
    pub fn colidxs(&self) -> &[i64] {
        &self.colidxs
    }
}

/// Convert a COO matrix to CSR
///
/// Works on a scratch copy of the triples sorted into row-major order, so
/// the input's recorded ordering is untouched.
pub fn coo_to_csr<T: Scalar>(coo: &CooMatrix<T>) -> Result<CsrMatrix<T>> {
    if coo.index_base() != IndexBase::Zero {
        return Err(Error::UnsupportedIndexBase { op: "coo_to_csr" });
    }
    let mut rows = coo.rows().to_vec();
    let mut cols = coo.cols().to_vec();
    let mut vals = coo.vals().to_vec();
    if coo.sort() != NonzeroSort::Csr && !coo_sort_type(&rows, &cols).is_csr_sorted() {
        sort_coo_data(NonzeroSort::Csr, &mut vals, &mut rows, &mut cols);
    }

    let mut rowptr = vec![0i64; coo.n_rows() + 1];
    for &r in &rows {
        rowptr[r as usize + 1] += 1;
    }
    for i in 0..coo.n_rows() {
        rowptr[i + 1] += rowptr[i];
    }
    Ok(CsrMatrix {
        n_rows: coo.n_rows(),
        n_cols: coo.n_cols(),
        index_base: IndexBase::Zero,
        vals,
        rowptr,
        colidxs: cols,
    })
}

/// Convert a CSR matrix to COO
///
/// Expands the row offsets into explicit row indices; the result is
/// row-major sorted by construction.
pub fn csr_to_coo<T: Scalar>(csr: &CsrMatrix<T>) -> Result<CooMatrix<T>> {
    if csr.index_base() != IndexBase::Zero {
        return Err(Error::UnsupportedIndexBase { op: "csr_to_coo" });
    }
    let mut rows = Vec::with_capacity(csr.nnz());
    for i in 0..csr.n_rows() {
        let start = csr.rowptr[i] as usize;
        let end = csr.rowptr[i + 1] as usize;
        for _ in start..end {
            rows.push(i as i64);
        }
    }
    Ok(CooMatrix::from_raw_parts_unchecked(
        csr.n_rows(),
        csr.n_cols(),
        rows,
        csr.colidxs.clone(),
        csr.vals.clone(),
        IndexBase::Zero,
        NonzeroSort::Csr,
    ))
}

fn csr_to_dense_strided<T: Scalar>(
    csr: &CsrMatrix<T>,
    stride_row: usize,
    stride_col: usize,
    mat: &mut [T],
) {
    for i in 0..csr.n_rows() {
        for j in 0..csr.n_cols() {
            mat[i * stride_row + j * stride_col] = T::zero();
        }
    }
    let base = csr.index_base.offset();
    for i in 0..csr.n_rows() {
        for ell in csr.rowptr[i] as usize..csr.rowptr[i + 1] as usize {
            let j = (csr.colidxs[ell] - base) as usize;
            mat[i * stride_row + j * stride_col] = csr.vals[ell];
        }
    }
}

/// Materialize a CSR matrix into a dense buffer
///
/// `mat` holds the `n_rows x n_cols` result in `layout` with a tight
/// leading dimension. One-based column indices are adjusted on the way out.
pub fn csr_to_dense<T: Scalar>(csr: &CsrMatrix<T>, layout: Layout, mat: &mut [T]) -> Result<()> {
    let required = csr.n_rows() * csr.n_cols();
    if mat.len() < required {
        return Err(Error::buffer_too_small("mat", mat.len(), required));
    }
    match layout {
        Layout::ColMajor => csr_to_dense_strided(csr, 1, csr.n_rows(), mat),
        Layout::RowMajor => csr_to_dense_strided(csr, csr.n_cols(), 1, mat),
    }
    Ok(())
}

/// Compress a dense buffer into CSR, keeping entries above a tolerance
///
/// Two passes over the input: one to count entries with absolute value
/// strictly greater than `abs_tol` (sizing the allocation exactly), one to
/// populate. `mat` holds an `n_rows x n_cols` matrix in `layout` with a
/// tight leading dimension.
pub fn dense_to_csr<T: Scalar>(
    layout: Layout,
    mat: &[T],
    abs_tol: T,
    n_rows: usize,
    n_cols: usize,
) -> Result<CsrMatrix<T>> {
    let required = n_rows * n_cols;
    if mat.len() < required {
        return Err(Error::buffer_too_small("mat", mat.len(), required));
    }
    let (stride_row, stride_col) = match layout {
        Layout::ColMajor => (1, n_rows),
        Layout::RowMajor => (n_cols, 1),
    };

    let nnz = (0..n_rows)
        .map(|i| {
            (0..n_cols)
                .filter(|&j| mat[i * stride_row + j * stride_col].abs() > abs_tol)
                .count()
        })
        .sum();

    let mut vals = Vec::with_capacity(nnz);
    let mut colidxs = Vec::with_capacity(nnz);
    let mut rowptr = vec![0i64; n_rows + 1];
    for i in 0..n_rows {
        for j in 0..n_cols {
            let v = mat[i * stride_row + j * stride_col];
            if v.abs() > abs_tol {
                vals.push(v);
                colidxs.push(j as i64);
            }
        }
        rowptr[i + 1] = vals.len() as i64;
    }
    Ok(CsrMatrix {
        n_rows,
        n_cols,
        index_base: IndexBase::Zero,
        vals,
        rowptr,
        colidxs,
    })
}

/// Build a CSR matrix holding `vals` on the diagonal at `offset`
///
/// Nonzero `ell` lands at `(ell, ell + offset)` for a non-negative offset
/// and at `(ell - offset, ell)` below the main diagonal.
pub fn csr_from_diag<T: Scalar>(
    vals: &[T],
    offset: i64,
    n_rows: usize,
    n_cols: usize,
) -> Result<CsrMatrix<T>> {
    let nnz = vals.len();
    let fits = if offset >= 0 {
        nnz <= n_rows && nnz + offset as usize <= n_cols
    } else {
        nnz + (-offset) as usize <= n_rows && nnz <= n_cols
    };
    if !fits {
        return Err(Error::invalid_arg(
            "vals",
            format!(
                "diagonal of length {} at offset {} does not fit in a {}x{} matrix",
                nnz, offset, n_rows, n_cols
            ),
        ));
    }

    let first_row = if offset >= 0 { 0 } else { (-offset) as usize };
    let col0 = if offset >= 0 { offset } else { 0 };
    let mut rowptr = vec![0i64; n_rows + 1];
    let mut colidxs = Vec::with_capacity(nnz);
    for ell in 0..nnz {
        rowptr[first_row + ell + 1] = ell as i64 + 1;
        colidxs.push(col0 + ell as i64);
    }
    for i in (first_row + nnz)..n_rows {
        rowptr[i + 1] = nnz as i64;
    }
    Ok(CsrMatrix {
        n_rows,
        n_cols,
        index_base: IndexBase::Zero,
        vals: vals.to_vec(),
        rowptr,
        colidxs,
    })
}
