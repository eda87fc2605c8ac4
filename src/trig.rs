//! Trigonometric (fast-transform) sketching operators
//!
//! A [`TrigSkOp`] composes three stages: a Rademacher diagonal, a
//! structured orthogonal-ish transform, and a row selection that keeps the
//! short axis. The transform itself is the [`StructuredTransform`]
//! extension point; the crate ships [`WalshHadamard`] as the reference
//! strategy and leaves Fourier and friends to implementors.

use crate::blas::{scal_strided, swap_strided};
use crate::error::{Error, Result};
use crate::layout::{check_dense_operand, dims_before_op, op_strides, Layout, Op};
use crate::rng::{CounterRng, Philox4x32, RngState};
use crate::sample::repeated_fisher_yates;
use crate::scalar::Scalar;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Transform family of a trigonometric sketching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrigDistName {
    /// Walsh-Hadamard transform
    Hadamard,
    /// Discrete Fourier transform
    Fourier,
}

/// Shape and transform family of a trigonometric sketching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrigDist {
    /// Rows of the operator, the sketch dimension
    pub n_rows: usize,
    /// Columns of the operator, the data dimension
    pub n_cols: usize,
    /// Transform family
    pub family: TrigDistName,
}

impl TrigDist {
    /// Distribution with the given shape and family
    pub fn new(n_rows: usize, n_cols: usize, family: TrigDistName) -> Self {
        TrigDist {
            n_rows,
            n_cols,
            family,
        }
    }

    /// The shorter extent
    pub fn dim_short(&self) -> usize {
        self.n_rows.min(self.n_cols)
    }

    /// The longer extent
    pub fn dim_long(&self) -> usize {
        self.n_rows.max(self.n_cols)
    }
}

/// The structured-transform stage of a trigonometric operator
///
/// Applies the transform from the left to every column of an
/// `n_rows x n_cols` buffer, in place. Implementations define their own
/// normalization; [`WalshHadamard`] is unnormalized.
pub trait StructuredTransform {
    /// Transform each column of the buffer in place
    fn apply<T: Scalar>(
        &self,
        layout: Layout,
        n_rows: usize,
        n_cols: usize,
        buf: &mut [T],
        ld: usize,
    ) -> Result<()>;
}

/// Unnormalized in-place Walsh-Hadamard butterfly, power-of-two sizes
#[derive(Debug, Clone, Copy, Default)]
pub struct WalshHadamard;

impl StructuredTransform for WalshHadamard {
    fn apply<T: Scalar>(
        &self,
        layout: Layout,
        n_rows: usize,
        n_cols: usize,
        buf: &mut [T],
        ld: usize,
    ) -> Result<()> {
        if !n_rows.is_power_of_two() {
            return Err(Error::invalid_arg(
                "n_rows",
                format!("Walsh-Hadamard needs a power-of-two extent, got {}", n_rows),
            ));
        }
        let (rs, cs) = op_strides(layout, Op::NoTrans, ld);
        for j in 0..n_cols {
            let mut h = 1;
            while h < n_rows {
                let mut i = 0;
                while i < n_rows {
                    for t in i..i + h {
                        let x = buf[t * rs + j * cs];
                        let y = buf[(t + h) * rs + j * cs];
                        buf[t * rs + j * cs] = x + y;
                        buf[(t + h) * rs + j * cs] = x - y;
                    }
                    i += 2 * h;
                }
                h *= 2;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct TrigData {
    diag: Vec<i8>,
    sampled_rows: Vec<i64>,
}

/// Trigonometric sketching operator: Rademacher diagonal, structured
/// transform, row selection
///
/// The operator is `n_rows x n_cols` with `n_rows <= n_cols`: it scales
/// the data's `n_cols` coordinates by random signs, runs the transform,
/// and keeps `n_rows` coordinates chosen without replacement.
#[derive(Debug, Clone)]
pub struct TrigSkOp<G: CounterRng = Philox4x32> {
    dist: TrigDist,
    seed_state: RngState<G>,
    next_state: RngState<G>,
    data: Option<TrigData>,
}

impl<G: CounterRng> TrigSkOp<G> {
    /// Unmaterialized operator
    pub fn new(dist: TrigDist, seed_state: RngState<G>) -> Result<Self> {
        if dist.n_rows > dist.n_cols {
            return Err(Error::invalid_arg(
                "dist",
                format!(
                    "trigonometric operators sketch down: need n_rows <= n_cols, got {}x{}",
                    dist.n_rows, dist.n_cols
                ),
            ));
        }
        // Diagonal consumes one word per sign, the row selection one block
        // per draw.
        let next_state = seed_state
            .advance(dist.n_cols as u64, 1)
            .advance(dist.n_rows as u64, G::WORDS_PER_BLOCK);
        Ok(TrigSkOp {
            dist,
            seed_state,
            next_state,
            data: None,
        })
    }

    /// The operator's distribution
    pub fn dist(&self) -> TrigDist {
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

    /// Whether the diagonal and row selection have been generated
    pub fn is_materialized(&self) -> bool {
        self.data.is_some()
    }

    /// The Rademacher diagonal, if materialized
    pub fn diag(&self) -> Option<&[i8]> {
        self.data.as_ref().map(|d| d.diag.as_slice())
    }

    /// The selected rows, if materialized
    pub fn sampled_rows(&self) -> Option<&[i64]> {
        self.data.as_ref().map(|d| d.sampled_rows.as_slice())
    }
}

/// Size of the sub-stream each parallel worker owns
const RADEMACHER_CHUNK: usize = 1024;

#[cfg(feature = "rayon")]
const RADEMACHER_PAR_THRESHOLD: usize = 4 * RADEMACHER_CHUNK;

fn rademacher_chunk<G: CounterRng>(state: RngState<G>, chunk_idx: usize, out: &mut [i8]) {
    // Chunk-indexed sub-streams keep the result independent of how many
    // workers run; salt 0 is reserved for the parent stream.
    let sub = state.fork(chunk_idx as u64 + 1);
    for (t, o) in out.iter_mut().enumerate() {
        let ctr = G::counter_add(sub.counter, (t / 4) as u64);
        let u = G::uniform_block(ctr, sub.key)[t % 4];
        *o = if u < 0.5 { -1 } else { 1 };
    }
}

/// Fill a sign vector from a counter-based state, in parallel
///
/// Deterministic given the state: each fixed-size chunk draws from its own
/// key-mixed sub-stream, so thread count and scheduling never change the
/// result. Returns the parent state advanced by one word per sign.
pub fn fill_rademacher_vector<G: CounterRng>(state: RngState<G>, out: &mut [i8]) -> RngState<G> {
    #[cfg(feature = "rayon")]
    if out.len() >= RADEMACHER_PAR_THRESHOLD {
        out.par_chunks_mut(RADEMACHER_CHUNK)
            .enumerate()
            .for_each(|(c, chunk)| rademacher_chunk(state, c, chunk));
        return state.advance(out.len() as u64, 1);
    }
    for (c, chunk) in out.chunks_mut(RADEMACHER_CHUNK).enumerate() {
        rademacher_chunk(state, c, chunk);
    }
    state.advance(out.len() as u64, 1)
}

/// Fill a sign vector from the process-global entropy source
///
/// Convenience for callers that explicitly do not need reproducibility.
pub fn fill_rademacher_nonreproducible(out: &mut [i8]) {
    use rand::Rng;
    let mut rng = rand::rng();
    for o in out.iter_mut() {
        *o = if rng.random::<f64>() < 0.5 { -1 } else { 1 };
    }
}

/// Generate an operator's diagonal and row selection from its seed
///
/// # Errors
///
/// Returns [`Error::AlreadyMaterialized`] if the operator is filled.
pub fn fill_trig<G: CounterRng>(op: &mut TrigSkOp<G>) -> Result<()> {
    if op.data.is_some() {
        return Err(Error::AlreadyMaterialized);
    }
    let dist = op.dist;
    let mut diag = vec![0i8; dist.n_cols];
    let state = fill_rademacher_vector(op.seed_state, &mut diag);

    let k = dist.n_rows;
    let mut sampled_rows = vec![0i64; k];
    let mut idxs_minor = vec![0i64; k];
    let mut vals = vec![0.0f64; k];
    let end = repeated_fisher_yates(
        state,
        k,
        dist.n_cols,
        1,
        &mut sampled_rows,
        &mut idxs_minor,
        &mut vals,
    )?;
    debug_assert_eq!(end, op.next_state);

    op.data = Some(TrigData { diag, sampled_rows });
    Ok(())
}

fn permute_rows_to_top<T: Scalar>(
    selected: &[i64],
    m: usize,
    n: usize,
    buf: &mut [T],
    rs: usize,
    cs: usize,
) {
    let mut orig_of_current: Vec<usize> = (0..m).collect();
    let mut current_of_orig: Vec<usize> = (0..m).collect();
    for (top, &sel) in selected.iter().enumerate() {
        let sel = sel as usize;
        let cur = current_of_orig[sel];
        if cur != top {
            swap_strided(buf, n, top * rs, cs, cur * rs, cs);
            let displaced = orig_of_current[top];
            orig_of_current[top] = sel;
            orig_of_current[cur] = displaced;
            current_of_orig[sel] = top;
            current_of_orig[displaced] = cur;
        }
    }
}

/// Apply a trigonometric operator from the left:
/// `B := alpha * (P * H * D * op(A)) + beta * B`
///
/// `op(A)` is `m x n` with `m` equal to the operator's column count, `B` is
/// `d x n` with `d` equal to the operator's row count. `D` scales the data
/// coordinates by the Rademacher diagonal, `H` is the caller's
/// [`StructuredTransform`], and `P` moves the selected coordinates to the
/// top. Unmaterialized operators are filled into a transparent temporary.
#[allow(clippy::too_many_arguments)]
pub fn lskget<T: Scalar, G: CounterRng, F: StructuredTransform>(
    layout: Layout,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    tr: &TrigSkOp<G>,
    transform: &F,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()> {
    let data = match &tr.data {
        Some(data) => data,
        None => {
            let mut tmp = TrigSkOp::new(tr.dist, tr.seed_state)?;
            fill_trig(&mut tmp)?;
            return lskget(
                layout, op_a, d, n, m, alpha, &tmp, transform, a, lda, beta, b, ldb,
            );
        }
    };
    if d != tr.n_rows() || m != tr.n_cols() {
        return Err(Error::shape_mismatch(&[tr.n_rows(), tr.n_cols()], &[d, m]));
    }
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    check_dense_operand("A", layout, rows_a, cols_a, a, lda)?;
    check_dense_operand("B", layout, d, n, b, ldb)?;
    if n == 0 || d == 0 {
        return Ok(());
    }

    let (brs, bcs) = op_strides(layout, Op::NoTrans, ldb);
    if alpha == T::zero() {
        for i in 0..d {
            if beta == T::zero() {
                for j in 0..n {
                    b[i * brs + j * bcs] = T::zero();
                }
            } else {
                scal_strided(n, beta, b, i * brs, bcs);
            }
        }
        return Ok(());
    }

    // Scratch holds H * D * op(A), full height, in the caller's layout.
    let ldc = match layout {
        Layout::ColMajor => m,
        Layout::RowMajor => n,
    };
    let mut scratch = vec![T::zero(); m * n];
    crate::blas::copy_mat(layout, op_a, m, n, a, lda, &mut scratch, ldc)?;
    let (crs, ccs) = op_strides(layout, Op::NoTrans, ldc);

    // Diagonal stage: flip the sign of every row with a negative sign
    for (i, &sign) in data.diag.iter().enumerate() {
        if sign < 0 {
            scal_strided(n, -T::one(), &mut scratch, i * crs, ccs);
        }
    }

    transform.apply(layout, m, n, &mut scratch, ldc)?;

    permute_rows_to_top(&data.sampled_rows, m, n, &mut scratch, crs, ccs);

    for i in 0..d {
        for j in 0..n {
            let src = alpha * scratch[i * crs + j * ccs];
            let dst = i * brs + j * bcs;
            b[dst] = if beta == T::zero() {
                src
            } else {
                src + beta * b[dst]
            };
        }
    }
    Ok(())
}
