//! # skops
//!
//! **Randomized sketching operators for numerical linear algebra.**
//!
//! skops generates structured random matrices ("sketching operators") and
//! multiplies them into user data with BLAS-style kernels, reproducibly:
//! every random choice flows from an explicit counter-based generator state
//! that can be copied, advanced, forked, and resumed exactly.
//!
//! ## Why skops?
//!
//! - **Bit-reproducible**: all randomness is a pure function of a
//!   `(counter, key)` state; there is no global generator anywhere
//! - **Splittable**: sampling `k1 + k2` items in one call equals sampling
//!   `k1` then `k2` with the returned state threaded between calls
//! - **BLAS-shaped**: sketch kernels follow the GEMM contract exactly,
//!   with row/column-major layouts, transpose flags, leading dimensions,
//!   submatrix offsets, and `alpha`/`beta` accumulation
//! - **Lazy**: operators carry a distribution and a seed; buffers and
//!   nonzero structures appear on demand, windowed synthesis included
//!
//! ## Components
//!
//! - [`rng`]: counter-based generators ([`rng::Philox4x32`],
//!   [`rng::ThreeFry4x64`]) and the [`rng::RngState`] value type
//! - [`sample`]: CDF construction, iid index sampling, repeated
//!   Fisher-Yates sampling without replacement
//! - [`sparse`]: COO/CSR storage, sort classification, format conversions,
//!   and the sparse-times-dense multiply
//! - [`dense`], [`sparse_skop`], [`trig`]: the three operator families
//! - [`sketch`]: the `lskge3`/`rskge3`/`lskges`/`rskges` kernels and the
//!   `sketch_general_*` dispatchers
//! - [`blas`]: the native dense primitives the kernels delegate to
//!
//! ## Quick start
//!
//! ```
//! use skops::prelude::*;
//!
//! // A 4 x 100 Gaussian sketching operator from seed 42
//! let state = RngState::new(42);
//! let s: DenseSkOp<f64> = DenseSkOp::new(DenseDist::gaussian(4, 100), state);
//!
//! // Sketch a 100 x 3 data matrix down to 4 x 3: B = S * A
//! let a = vec![1.0f64; 100 * 3];
//! let mut b = vec![0.0f64; 4 * 3];
//! sketch_left(
//!     Layout::RowMajor, Op::NoTrans, Op::NoTrans,
//!     4, 3, 100,
//!     1.0, &s, &a, 3, 0.0, &mut b, 3,
//! )?;
//! # Ok::<(), skops::error::Error>(())
//! ```
//!
//! ## Feature flags
//!
//! - `rayon` (default): multi-threaded sparse apply and GEMM

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blas;
pub mod dense;
pub mod error;
pub mod layout;
pub mod rng;
pub mod sample;
pub mod scalar;
pub mod sketch;
pub mod sparse;
pub mod sparse_skop;
pub mod trig;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dense::{fill_dense, DenseDist, DenseDistName, DenseSkOp};
    pub use crate::error::{Error, Result};
    pub use crate::layout::{Layout, Op};
    pub use crate::rng::{CounterRng, Philox4x32, RngState, ThreeFry4x64};
    pub use crate::sample::{
        repeated_fisher_yates, sample_indices_iid, sample_indices_iid_uniform, weights_to_cdf,
    };
    pub use crate::scalar::Scalar;
    pub use crate::sketch::{
        lskge3, lskges, rskge3, rskges, sketch_general_left, sketch_general_right, sketch_left,
        sketch_right, SketchOp,
    };
    pub use crate::sparse::{
        coo_to_csr, csr_to_coo, csr_to_dense, dense_to_csr, CooMatrix, CooView, CsrMatrix,
        IndexBase, NonzeroSort,
    };
    pub use crate::sparse_skop::{fill_sparse, SparseDist, SparseSkOp};
    pub use crate::trig::{fill_trig, StructuredTransform, TrigDist, TrigDistName, TrigSkOp, WalshHadamard};
}
