//! Sparse matrix storage and utilities
//!
//! Two storage formats back the sparse sketching path:
//!
//! - **COO** (coordinate triples): construction format, cheap to transpose
//!   and re-sort, consumed directly by the sketch-multiply kernels.
//! - **CSR** (compressed sparse row): compressed interchange format with
//!   conversions to and from COO and dense buffers.
//!
//! Owned matrices ([`CooMatrix`], [`CsrMatrix`]) hold their buffers in
//! `Vec`s; [`CooView`] wraps caller-provided slices without taking
//! ownership, for interop with buffers managed elsewhere.

mod coo;
mod csr;
pub(crate) mod spmm;

pub use coo::{coo_sort_type, sort_coo_data, CooMatrix, CooView};
pub use csr::{coo_to_csr, csr_from_diag, csr_to_coo, csr_to_dense, dense_to_csr, CsrMatrix};
pub use spmm::{left_spmm, right_spmm};

/// Index convention of a sparse matrix's stored indices
///
/// `One` exists for interop with Fortran-convention callers; the compute
/// kernels themselves require `Zero`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    /// C convention, indices start at 0
    Zero,
    /// Fortran convention, indices start at 1
    One,
}

impl IndexBase {
    /// The additive offset implied by the convention
    #[inline]
    pub fn offset(self) -> i64 {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Recorded nonzero ordering of a COO matrix
///
/// The tag records, but does not enforce, the current ordering; operations
/// that need a particular order re-sort a scratch copy when the tag does not
/// already match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonzeroSort {
    /// Sorted by row, then by column within each row
    Csr,
    /// Sorted by column, then by row within each column
    Csc,
    /// No ordering is known
    None,
}

impl NonzeroSort {
    /// The ordering of the transposed matrix
    #[inline]
    pub fn transposed(self) -> NonzeroSort {
        match self {
            NonzeroSort::Csr => NonzeroSort::Csc,
            NonzeroSort::Csc => NonzeroSort::Csr,
            NonzeroSort::None => NonzeroSort::None,
        }
    }
}

/// Classification of the ordering already present in coordinate data
///
/// Produced by [`coo_sort_type`]; distinguishes data that satisfies both
/// orderings (for example a diagonal) from data that satisfies only one or
/// neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooOrder {
    /// Row-major sorted only
    Csr,
    /// Column-major sorted only
    Csc,
    /// Both orderings hold
    Both,
    /// Neither ordering holds
    Neither,
}

impl CooOrder {
    /// Whether the data can be used as CSR-ordered without re-sorting
    #[inline]
    pub fn is_csr_sorted(self) -> bool {
        matches!(self, CooOrder::Csr | CooOrder::Both)
    }

    /// Whether the data can be used as CSC-ordered without re-sorting
    #[inline]
    pub fn is_csc_sorted(self) -> bool {
        matches!(self, CooOrder::Csc | CooOrder::Both)
    }

    /// Collapse to the three-valued tag stored on a matrix, preferring
    /// `preferred` when both orderings hold
    #[inline]
    pub fn as_sort_tag(self, preferred: NonzeroSort) -> NonzeroSort {
        match self {
            CooOrder::Csr => NonzeroSort::Csr,
            CooOrder::Csc => NonzeroSort::Csc,
            CooOrder::Both => preferred,
            CooOrder::Neither => NonzeroSort::None,
        }
    }
}
