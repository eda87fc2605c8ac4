//! Sparse sketching operators with a fixed nonzero count per short-axis fiber
//!
//! A [`SparseSkOp`] places `vec_nnz` nonzeros, drawn without replacement
//! from the short axis via [`repeated_fisher_yates`], into every long-axis
//! vector of the operator; values are plus or minus one. Materialization is
//! lazy: the sketch kernels fill a transparent temporary when an
//! unmaterialized operator reaches them, leaving the operator itself
//! untouched.

use crate::error::{Error, Result};
use crate::rng::{CounterRng, Philox4x32, RngState};
use crate::sample::repeated_fisher_yates;
use crate::scalar::Scalar;
use crate::sparse::{coo_sort_type, CooView, IndexBase, NonzeroSort};

/// Shape and sparsity of a sparse sketching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseDist {
    /// Rows of the operator
    pub n_rows: usize,
    /// Columns of the operator
    pub n_cols: usize,
    /// Nonzeros per long-axis vector, drawn without replacement from the
    /// short axis
    pub vec_nnz: usize,
}

impl SparseDist {
    /// Distribution with the given shape and per-vector nonzero count
    pub fn new(n_rows: usize, n_cols: usize, vec_nnz: usize) -> Self {
        SparseDist {
            n_rows,
            n_cols,
            vec_nnz,
        }
    }

    /// Length of the short axis, the sampling domain
    pub fn dim_major(&self) -> usize {
        self.n_rows.min(self.n_cols)
    }

    /// Length of the long axis, one Fisher-Yates pass per entry
    pub fn dim_minor(&self) -> usize {
        self.n_rows.max(self.n_cols)
    }

    /// Total nonzeros of a materialized operator
    pub fn full_nnz(&self) -> usize {
        self.vec_nnz * self.dim_minor()
    }
}

#[derive(Debug, Clone)]
struct SparseTriples<T> {
    rows: Vec<i64>,
    cols: Vec<i64>,
    vals: Vec<T>,
    sort: NonzeroSort,
}

/// Sparse sketching operator: distribution, seed state, optional triples
#[derive(Debug, Clone)]
pub struct SparseSkOp<T: Scalar, G: CounterRng = Philox4x32> {
    dist: SparseDist,
    seed_state: RngState<G>,
    next_state: RngState<G>,
    data: Option<SparseTriples<T>>,
}

impl<T: Scalar, G: CounterRng> SparseSkOp<T, G> {
    /// Unmaterialized operator
    ///
    /// # Errors
    ///
    /// `vec_nnz` must lie in `[1, dim_major]`: zero nonzeros is not a
    /// sketching operator, and more than the short axis cannot be drawn
    /// without replacement.
    pub fn new(dist: SparseDist, seed_state: RngState<G>) -> Result<Self> {
        if dist.vec_nnz == 0 || dist.vec_nnz > dist.dim_major() {
            return Err(Error::invalid_arg(
                "vec_nnz",
                format!(
                    "vec_nnz = {} must lie in [1, {}] for a {}x{} operator",
                    dist.vec_nnz,
                    dist.dim_major(),
                    dist.n_rows,
                    dist.n_cols
                ),
            ));
        }
        let next_state = seed_state.advance(dist.full_nnz() as u64, G::WORDS_PER_BLOCK);
        Ok(SparseSkOp {
            dist,
            seed_state,
            next_state,
            data: None,
        })
    }

    /// The operator's distribution
    pub fn dist(&self) -> SparseDist {
        self.dist
    }

    /// Rows of the operator
    pub fn n_rows(&self) -> usize {
        self.dist.n_rows
    }

    /// Columns of the operator
    pub fn n_cols(&self) -> usize {
        self.dist.n_cols
    }

    /// The seed state this operator was constructed with
    pub fn seed_state(&self) -> RngState<G> {
        self.seed_state
    }

    /// The state a caller should use after this operator's fill
    pub fn next_state(&self) -> RngState<G> {
        self.next_state
    }

    /// Whether the nonzero structure has been generated
    pub fn is_materialized(&self) -> bool {
        self.data.is_some()
    }

    /// Nonzero count of the materialized structure, if any
    pub fn nnz(&self) -> Option<usize> {
        self.data.as_ref().map(|d| d.vals.len())
    }

    /// Coordinate view of the materialized structure, if any
    pub fn coo_view(&self) -> Option<CooView<'_, T>> {
        self.data.as_ref().map(|d| {
            CooView::from_raw_parts_unchecked(
                self.dist.n_rows,
                self.dist.n_cols,
                &d.vals,
                &d.rows,
                &d.cols,
                IndexBase::Zero,
                d.sort,
            )
        })
    }
}

/// Generate an operator's nonzero structure from its distribution and seed
///
/// Runs one Fisher-Yates pass per long-axis vector; the operator's
/// `next_state` already accounts for exactly this consumption.
///
/// # Errors
///
/// Returns [`Error::AlreadyMaterialized`] if the structure exists; the
/// unfilled to filled transition happens at most once.
pub fn fill_sparse<T: Scalar, G: CounterRng>(op: &mut SparseSkOp<T, G>) -> Result<()> {
    if op.data.is_some() {
        return Err(Error::AlreadyMaterialized);
    }
    let dist = op.dist;
    let total = dist.full_nnz();
    let mut idxs_major = vec![0i64; total];
    let mut idxs_minor = vec![0i64; total];
    let mut vals = vec![T::zero(); total];
    repeated_fisher_yates(
        op.seed_state,
        dist.vec_nnz,
        dist.dim_major(),
        dist.dim_minor(),
        &mut idxs_major,
        &mut idxs_minor,
        &mut vals,
    )?;

    // Wide operators sample rows for each column; tall operators sample
    // columns for each row.
    let (rows, cols) = if dist.n_rows <= dist.n_cols {
        (idxs_major, idxs_minor)
    } else {
        (idxs_minor, idxs_major)
    };
    let sort = coo_sort_type(&rows, &cols).as_sort_tag(NonzeroSort::Csr);
    op.data = Some(SparseTriples {
        rows,
        cols,
        vals,
        sort,
    });
    Ok(())
}
