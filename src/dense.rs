//! Dense sketching operators: distributions, lazy materialization, windowed fills
//!
//! A [`DenseSkOp`] pairs a [`DenseDist`] (shape plus entry family) with a
//! counter-based seed state. Construction allocates nothing: the buffer is
//! produced by [`fill_dense`], or synthesized one window at a time by the
//! sketch kernels when only a submatrix is needed. Windowed synthesis reads
//! the generator at the exact counter positions a full fill would use, so a
//! window is bit-identical to the matching slice of a full materialization.

use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::rng::{box_muller, CounterRng, Philox4x32, RngState};
use crate::scalar::Scalar;

/// Entry distribution of a dense sketching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenseDistName {
    /// Independent standard normal entries
    Gaussian,
    /// Independent uniform entries on `[-1, 1)`
    Uniform,
    /// Independent entries equal to plus or minus one
    Rademacher,
}

/// Shape and entry family of a dense sketching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseDist {
    /// Rows of the operator
    pub n_rows: usize,
    /// Columns of the operator
    pub n_cols: usize,
    /// Entry distribution
    pub family: DenseDistName,
}

impl DenseDist {
    /// Distribution with the given shape and family
    pub fn new(n_rows: usize, n_cols: usize, family: DenseDistName) -> Self {
        DenseDist {
            n_rows,
            n_cols,
            family,
        }
    }

    /// Gaussian distribution of the given shape
    pub fn gaussian(n_rows: usize, n_cols: usize) -> Self {
        Self::new(n_rows, n_cols, DenseDistName::Gaussian)
    }

    /// Total number of entries
    pub fn n_elems(&self) -> usize {
        self.n_rows * self.n_cols
    }

    /// Generator words a full fill consumes
    ///
    /// Gaussian entries are produced in Box-Muller pairs, so an odd element
    /// count still consumes an even number of words.
    pub fn words_consumed(&self) -> u64 {
        let n = self.n_elems() as u64;
        match self.family {
            DenseDistName::Gaussian => n + (n & 1),
            DenseDistName::Uniform | DenseDistName::Rademacher => n,
        }
    }
}

/// Dense sketching operator: distribution, seed state, optional buffer
///
/// The buffer is row-major over the full operator shape. The unfilled to
/// filled transition happens at most once; both [`fill_dense`] on a filled
/// operator and supplying a wrong-sized buffer are errors.
#[derive(Debug, Clone)]
pub struct DenseSkOp<T: Scalar, G: CounterRng = Philox4x32> {
    dist: DenseDist,
    seed_state: RngState<G>,
    next_state: RngState<G>,
    buffer: Option<Vec<T>>,
}

impl<T: Scalar, G: CounterRng> DenseSkOp<T, G> {
    /// Unmaterialized operator
    ///
    /// The post-fill state is a pure function of the distribution and seed,
    /// so it is available immediately: callers may seed follow-up operators
    /// before this one is ever filled.
    pub fn new(dist: DenseDist, seed_state: RngState<G>) -> Self {
        let next_state = seed_state.advance(dist.words_consumed(), 1);
        DenseSkOp {
            dist,
            seed_state,
            next_state,
            buffer: None,
        }
    }

    /// Operator wrapping a caller-supplied, already-filled buffer
    ///
    /// The buffer must hold the full operator row-major.
    pub fn with_buffer(dist: DenseDist, seed_state: RngState<G>, buffer: Vec<T>) -> Result<Self> {
        if buffer.len() != dist.n_elems() {
            return Err(Error::buffer_too_small(
                "buffer",
                buffer.len(),
                dist.n_elems(),
            ));
        }
        let next_state = seed_state.advance(dist.words_consumed(), 1);
        Ok(DenseSkOp {
            dist,
            seed_state,
            next_state,
            buffer: Some(buffer),
        })
    }

    /// The operator's distribution
    pub fn dist(&self) -> DenseDist {
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

    /// Storage layout of the materialized buffer
    pub fn layout(&self) -> Layout {
        Layout::RowMajor
    }

    /// The seed state this operator was constructed with
    pub fn seed_state(&self) -> RngState<G> {
        self.seed_state
    }

    /// The state a caller should use after this operator's fill
    pub fn next_state(&self) -> RngState<G> {
        self.next_state
    }

    /// The materialized buffer, if any
    pub fn buffer(&self) -> Option<&[T]> {
        self.buffer.as_deref()
    }

    pub(crate) fn set_buffer(&mut self, buffer: Vec<T>) {
        self.buffer = Some(buffer);
    }
}

/// One entry of the operator, addressed by its linear index in the
/// row-major full buffer
///
/// Entry `l` reads uniform word `l` (counter block `l / 4`, lane `l % 4`);
/// Gaussian entries read the Box-Muller pair at words `2*(l/2)` and
/// `2*(l/2) + 1` and take component `l % 2`. Random access is what makes
/// windowed synthesis agree with full fills bit for bit.
fn fill_span<T: Scalar, G: CounterRng>(
    family: DenseDistName,
    seed: RngState<G>,
    start: u64,
    out: &mut [T],
) {
    match family {
        DenseDistName::Uniform | DenseDistName::Rademacher => {
            let mut cached: Option<(u64, [f64; 4])> = None;
            for (t, o) in out.iter_mut().enumerate() {
                let l = start + t as u64;
                let block_idx = l / 4;
                let lane = (l % 4) as usize;
                let block = match cached {
                    Some((bi, b)) if bi == block_idx => b,
                    _ => {
                        let ctr = G::counter_add(seed.counter, block_idx);
                        let b = G::uniform_block(ctr, seed.key);
                        cached = Some((block_idx, b));
                        b
                    }
                };
                let u = block[lane];
                *o = match family {
                    DenseDistName::Uniform => T::from_f64(2.0 * u - 1.0),
                    DenseDistName::Rademacher => {
                        if u < 0.5 {
                            -T::one()
                        } else {
                            T::one()
                        }
                    }
                    DenseDistName::Gaussian => unreachable!(),
                };
            }
        }
        DenseDistName::Gaussian => {
            let mut cached: Option<(u64, (f64, f64))> = None;
            for (t, o) in out.iter_mut().enumerate() {
                let l = start + t as u64;
                let pair_idx = l / 2;
                let pair = match cached {
                    Some((pi, p)) if pi == pair_idx => p,
                    _ => {
                        let word = 2 * pair_idx;
                        let ctr = G::counter_add(seed.counter, word / 4);
                        let block = G::uniform_block(ctr, seed.key);
                        let lane = (word % 4) as usize;
                        let p = box_muller(block[lane], block[lane + 1]);
                        cached = Some((pair_idx, p));
                        p
                    }
                };
                *o = T::from_f64(if l % 2 == 0 { pair.0 } else { pair.1 });
            }
        }
    }
}

/// Synthesize one window of an operator without materializing the rest
///
/// Writes the `n_rows_w x n_cols_w` window anchored at `(ro, co)` of the
/// operator described by `(dist, seed)` into `out`, row-major with a tight
/// leading dimension. Equivalent to filling the whole operator and slicing,
/// without the full-size allocation.
pub fn fill_dense_submat<T: Scalar, G: CounterRng>(
    dist: &DenseDist,
    seed: RngState<G>,
    out: &mut [T],
    n_rows_w: usize,
    n_cols_w: usize,
    ro: usize,
    co: usize,
) -> Result<()> {
    if dist.n_rows < n_rows_w + ro || dist.n_cols < n_cols_w + co {
        return Err(Error::SubmatrixOutOfBounds {
            op_rows: dist.n_rows,
            op_cols: dist.n_cols,
            ro,
            co,
            rows: n_rows_w,
            cols: n_cols_w,
        });
    }
    let required = n_rows_w * n_cols_w;
    if out.len() < required {
        return Err(Error::buffer_too_small("out", out.len(), required));
    }
    for i in 0..n_rows_w {
        let start = ((ro + i) * dist.n_cols + co) as u64;
        fill_span(
            dist.family,
            seed,
            start,
            &mut out[i * n_cols_w..i * n_cols_w + n_cols_w],
        );
    }
    Ok(())
}

/// Fill a caller-provided buffer with the full operator
///
/// `out` receives the operator row-major; the returned state is the seed
/// advanced past the fill's generator consumption.
pub fn fill_dense_unpacked<T: Scalar, G: CounterRng>(
    dist: &DenseDist,
    seed: RngState<G>,
    out: &mut [T],
) -> Result<RngState<G>> {
    fill_dense_submat(dist, seed, out, dist.n_rows, dist.n_cols, 0, 0)?;
    Ok(seed.advance(dist.words_consumed(), 1))
}

/// Materialize an operator's buffer from its own distribution and seed
///
/// # Errors
///
/// Returns [`Error::AlreadyMaterialized`] if the operator holds a buffer;
/// the unfilled to filled transition happens at most once.
pub fn fill_dense<T: Scalar, G: CounterRng>(op: &mut DenseSkOp<T, G>) -> Result<()> {
    if op.buffer().is_some() {
        return Err(Error::AlreadyMaterialized);
    }
    let dist = op.dist();
    let mut buf = vec![T::zero(); dist.n_elems()];
    fill_dense_unpacked(&dist, op.seed_state(), &mut buf)?;
    op.set_buffer(buf);
    Ok(())
}

/// Fill a buffer from the process-global entropy source
///
/// Convenience for callers that explicitly do not need reproducibility;
/// results differ between runs and cannot be checkpointed. Everything that
/// should be reproducible uses the counter-based fills instead.
pub fn fill_dense_nonreproducible<T: Scalar>(dist: &DenseDist, out: &mut [T]) -> Result<()> {
    use rand::Rng;
    use rand_distr::{Distribution, StandardNormal};

    let required = dist.n_elems();
    if out.len() < required {
        return Err(Error::buffer_too_small("out", out.len(), required));
    }
    let mut rng = rand::rng();
    for o in out.iter_mut().take(required) {
        let v: f64 = match dist.family {
            DenseDistName::Gaussian => StandardNormal.sample(&mut rng),
            DenseDistName::Uniform => 2.0 * rng.random::<f64>() - 1.0,
            DenseDistName::Rademacher => {
                if rng.random::<f64>() < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
        };
        *o = T::from_f64(v);
    }
    Ok(())
}
