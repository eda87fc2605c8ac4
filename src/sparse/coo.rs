//! COO (coordinate) sparse storage: owned matrix, borrowed view, sort utilities

use super::{CooOrder, IndexBase, NonzeroSort};
use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Classify the ordering already present in coordinate data
///
/// One linear scan over adjacent pairs, tracking a row-major and a
/// column-major flag and stopping early once both are ruled out.
pub fn coo_sort_type(rows: &[i64], cols: &[i64]) -> CooOrder {
    debug_assert_eq!(rows.len(), cols.len());
    let mut csr_okay = true;
    let mut csc_okay = true;
    for ell in 1..rows.len() {
        let (i0, j0) = (rows[ell - 1], cols[ell - 1]);
        let (i1, j1) = (rows[ell], cols[ell]);
        if csr_okay {
            csr_okay = i0 < i1 || (i0 == i1 && j0 <= j1);
        }
        if csc_okay {
            csc_okay = j0 < j1 || (j0 == j1 && i0 <= i1);
        }
        if !csr_okay && !csc_okay {
            break;
        }
    }
    match (csr_okay, csc_okay) {
        (true, true) => CooOrder::Both,
        (true, false) => CooOrder::Csr,
        (false, true) => CooOrder::Csc,
        (false, false) => CooOrder::Neither,
    }
}

/// Sort coordinate triples into the requested order, in place
///
/// Materializes `(row, col, val)` tuples, sorts, and unpacks. This path is
/// not the parallel hot loop, so the extra copies are acceptable.
/// `NonzeroSort::None` is a no-op.
pub fn sort_coo_data<T: Scalar>(
    order: NonzeroSort,
    vals: &mut [T],
    rows: &mut [i64],
    cols: &mut [i64],
) {
    if order == NonzeroSort::None {
        return;
    }
    let mut nonzeros: Vec<(i64, i64, T)> = rows
        .iter()
        .zip(cols.iter())
        .zip(vals.iter())
        .map(|((&r, &c), &v)| (r, c, v))
        .collect();
    match order {
        NonzeroSort::Csr => nonzeros.sort_by_key(|&(r, c, _)| (r, c)),
        NonzeroSort::Csc => nonzeros.sort_by_key(|&(r, c, _)| (c, r)),
        NonzeroSort::None => unreachable!(),
    }
    for (ell, (r, c, v)) in nonzeros.into_iter().enumerate() {
        rows[ell] = r;
        cols[ell] = c;
        vals[ell] = v;
    }
}

fn validate_triples(
    n_rows: usize,
    n_cols: usize,
    index_base: IndexBase,
    vals_len: usize,
    rows: &[i64],
    cols: &[i64],
) -> Result<()> {
    if rows.len() != vals_len || cols.len() != vals_len {
        return Err(Error::shape_mismatch(&[vals_len], &[rows.len(), cols.len()]));
    }
    let base = index_base.offset();
    for (&r, &c) in rows.iter().zip(cols.iter()) {
        if r < base || (r - base) as usize >= n_rows {
            return Err(Error::IndexOutOfBounds { index: r, size: n_rows });
        }
        if c < base || (c - base) as usize >= n_cols {
            return Err(Error::IndexOutOfBounds { index: c, size: n_cols });
        }
    }
    Ok(())
}

/// Owned COO sparse matrix
///
/// Dimensions and index convention are fixed at construction; the nonzero
/// buffers are exclusively owned and released with the matrix. The `sort`
/// tag records the current nonzero ordering.
#[derive(Debug, Clone)]
pub struct CooMatrix<T: Scalar> {
    n_rows: usize,
    n_cols: usize,
    index_base: IndexBase,
    vals: Vec<T>,
    rows: Vec<i64>,
    cols: Vec<i64>,
    sort: NonzeroSort,
}

impl<T: Scalar> CooMatrix<T> {
    /// Empty matrix of the given shape; nonzeros are added with
    /// [`CooMatrix::reserve`] or come from [`CooMatrix::from_triples`]
    pub fn new(n_rows: usize, n_cols: usize, index_base: IndexBase) -> Self {
        CooMatrix {
            n_rows,
            n_cols,
            index_base,
            vals: Vec::new(),
            rows: Vec::new(),
            cols: Vec::new(),
            sort: NonzeroSort::None,
        }
    }

    /// Allocate zeroed storage for exactly `nnz` nonzeros
    ///
    /// # Errors
    ///
    /// The matrix must still be empty; storage is sized once.
    pub fn reserve(&mut self, nnz: usize) -> Result<()> {
        if !self.vals.is_empty() {
            return Err(Error::invalid_arg(
                "nnz",
                "matrix storage has already been reserved",
            ));
        }
        self.vals = vec![T::zero(); nnz];
        self.rows = vec![self.index_base.offset(); nnz];
        self.cols = vec![self.index_base.offset(); nnz];
        Ok(())
    }

    /// Construct from buffers the caller already knows to be valid
    pub(crate) fn from_raw_parts_unchecked(
        n_rows: usize,
        n_cols: usize,
        rows: Vec<i64>,
        cols: Vec<i64>,
        vals: Vec<T>,
        index_base: IndexBase,
        sort: NonzeroSort,
    ) -> Self {
        CooMatrix {
            n_rows,
            n_cols,
            index_base,
            vals,
            rows,
            cols,
            sort,
        }
    }

    /// Build a matrix from validated coordinate triples
    ///
    /// Index bounds are checked against the shape under `index_base`, and
    /// the existing ordering of the data is classified and recorded.
    pub fn from_triples(
        n_rows: usize,
        n_cols: usize,
        rows: Vec<i64>,
        cols: Vec<i64>,
        vals: Vec<T>,
        index_base: IndexBase,
    ) -> Result<Self> {
        validate_triples(n_rows, n_cols, index_base, vals.len(), &rows, &cols)?;
        let sort = coo_sort_type(&rows, &cols).as_sort_tag(NonzeroSort::Csr);
        Ok(CooMatrix {
            n_rows,
            n_cols,
            index_base,
            vals,
            rows,
            cols,
            sort,
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

    /// Index convention of the stored indices
    pub fn index_base(&self) -> IndexBase {
        self.index_base
    }

    /// Recorded nonzero ordering
    pub fn sort(&self) -> NonzeroSort {
        self.sort
    }

    /// Stored values
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Stored row indices
    pub fn rows(&self) -> &[i64] {
        &self.rows
    }

    /// Stored column indices
    pub fn cols(&self) -> &[i64] {
        &self.cols
    }

    /// Mutable access to the triple buffers, invalidating the sort tag
    ///
    /// The tag drops to `None` because the caller may break any ordering.
    pub fn triples_mut(&mut self) -> (&mut [T], &mut [i64], &mut [i64]) {
        self.sort = NonzeroSort::None;
        (&mut self.vals, &mut self.rows, &mut self.cols)
    }

    /// Sort the nonzeros into the requested order and record it
    ///
    /// A no-op when the tag already matches.
    pub fn sort_to(&mut self, order: NonzeroSort) {
        if order == NonzeroSort::None || self.sort == order {
            return;
        }
        sort_coo_data(order, &mut self.vals, &mut self.rows, &mut self.cols);
        self.sort = order;
    }

    /// Borrowed view over this matrix
    pub fn view(&self) -> CooView<'_, T> {
        CooView {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            index_base: self.index_base,
            vals: &self.vals,
            rows: &self.rows,
            cols: &self.cols,
            sort: self.sort,
        }
    }

    /// Transposed view: index buffers swap roles, no data moves
    pub fn transposed(&self) -> CooView<'_, T> {
        self.view().transposed()
    }
}

/// Borrowed view over COO data owned elsewhere
///
/// The non-owning counterpart of [`CooMatrix`]: wraps three caller-provided
/// buffers and never frees them. Constructed over raw slices or borrowed
/// from an owned matrix.
#[derive(Debug, Clone, Copy)]
pub struct CooView<'a, T> {
    n_rows: usize,
    n_cols: usize,
    index_base: IndexBase,
    vals: &'a [T],
    rows: &'a [i64],
    cols: &'a [i64],
    sort: NonzeroSort,
}

impl<'a, T: Scalar> CooView<'a, T> {
    /// Wrap caller-provided triple buffers, classifying their ordering
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        vals: &'a [T],
        rows: &'a [i64],
        cols: &'a [i64],
        index_base: IndexBase,
    ) -> Result<Self> {
        validate_triples(n_rows, n_cols, index_base, vals.len(), rows, cols)?;
        let sort = coo_sort_type(rows, cols).as_sort_tag(NonzeroSort::Csr);
        Ok(CooView {
            n_rows,
            n_cols,
            index_base,
            vals,
            rows,
            cols,
            sort,
        })
    }

    /// Wrap buffers the caller already knows to be valid, with a known sort
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_raw_parts_unchecked(
        n_rows: usize,
        n_cols: usize,
        vals: &'a [T],
        rows: &'a [i64],
        cols: &'a [i64],
        index_base: IndexBase,
        sort: NonzeroSort,
    ) -> Self {
        CooView {
            n_rows,
            n_cols,
            index_base,
            vals,
            rows,
            cols,
            sort,
        }
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

    /// Index convention of the stored indices
    pub fn index_base(&self) -> IndexBase {
        self.index_base
    }

    /// Recorded nonzero ordering
    pub fn sort(&self) -> NonzeroSort {
        self.sort
    }

    /// Stored values
    pub fn vals(&self) -> &'a [T] {
        self.vals
    }

    /// Stored row indices
    pub fn rows(&self) -> &'a [i64] {
        self.rows
    }

    /// Stored column indices
    pub fn cols(&self) -> &'a [i64] {
        self.cols
    }

    /// Transposed view: rows and columns swap roles, the sort tag flips
    pub fn transposed(&self) -> CooView<'a, T> {
        CooView {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            index_base: self.index_base,
            vals: self.vals,
            rows: self.cols,
            cols: self.rows,
            sort: self.sort.transposed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_type_distinguishes_all_four_classes() {
        // Diagonal satisfies both orderings
        let rows = vec![0i64, 1, 2];
        let cols = vec![0i64, 1, 2];
        assert_eq!(coo_sort_type(&rows, &cols), CooOrder::Both);

        // Row-major only: ties in rows broken by increasing column
        let rows = vec![0i64, 0, 1];
        let cols = vec![0i64, 2, 1];
        assert_eq!(coo_sort_type(&rows, &cols), CooOrder::Csr);

        // Column-major only
        let rows = vec![0i64, 2, 1];
        let cols = vec![0i64, 0, 1];
        assert_eq!(coo_sort_type(&rows, &cols), CooOrder::Csc);

        // Neither
        let rows = vec![2i64, 0, 1];
        let cols = vec![1i64, 2, 0];
        assert_eq!(coo_sort_type(&rows, &cols), CooOrder::Neither);
    }

    #[test]
    fn sorting_sorted_data_is_identity() {
        let mut rows = vec![0i64, 0, 1, 2];
        let mut cols = vec![0i64, 2, 1, 0];
        let mut vals = vec![1.0f64, 2.0, 3.0, 4.0];
        let (r0, c0, v0) = (rows.clone(), cols.clone(), vals.clone());
        sort_coo_data(NonzeroSort::Csr, &mut vals, &mut rows, &mut cols);
        assert_eq!(rows, r0);
        assert_eq!(cols, c0);
        assert_eq!(vals, v0);
    }

    #[test]
    fn sorting_moves_values_with_indices() {
        let mut rows = vec![1i64, 0, 0];
        let mut cols = vec![0i64, 2, 1];
        let mut vals = vec![10.0f64, 30.0, 20.0];
        sort_coo_data(NonzeroSort::Csr, &mut vals, &mut rows, &mut cols);
        assert_eq!(rows, vec![0, 0, 1]);
        assert_eq!(cols, vec![1, 2, 0]);
        assert_eq!(vals, vec![20.0, 30.0, 10.0]);
        sort_coo_data(NonzeroSort::Csc, &mut vals, &mut rows, &mut cols);
        assert_eq!(cols, vec![0, 1, 2]);
        assert_eq!(vals, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn from_triples_validates_bounds() {
        let bad = CooMatrix::from_triples(
            3,
            3,
            vec![0, 5],
            vec![0, 0],
            vec![1.0f32, 2.0],
            IndexBase::Zero,
        );
        assert!(bad.is_err());

        let one_based = CooMatrix::from_triples(
            3,
            3,
            vec![1, 3],
            vec![1, 3],
            vec![1.0f32, 2.0],
            IndexBase::One,
        )
        .unwrap();
        assert_eq!(one_based.nnz(), 2);
    }

    #[test]
    fn transposed_view_flips_sort_tag() {
        let m = CooMatrix::from_triples(
            2,
            3,
            vec![0, 0, 1],
            vec![0, 2, 1],
            vec![1.0f64, 2.0, 3.0],
            IndexBase::Zero,
        )
        .unwrap();
        assert_eq!(m.sort(), NonzeroSort::Csr);
        let t = m.transposed();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_cols(), 2);
        assert_eq!(t.sort(), NonzeroSort::Csc);
        assert_eq!(t.rows(), m.cols());
    }

    #[test]
    fn reserve_is_single_shot() {
        let mut m = CooMatrix::<f64>::new(4, 4, IndexBase::Zero);
        m.reserve(3).unwrap();
        assert_eq!(m.nnz(), 3);
        assert!(m.reserve(5).is_err());
    }
}
