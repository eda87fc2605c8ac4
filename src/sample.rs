//! Deterministic index sampling from a counter-based state
//!
//! Pure functions: given the same [`RngState`] and inputs they produce
//! bit-identical output, and each returns the advanced state to thread into
//! the next call. Every draw consumes one whole counter block (see
//! [`crate::rng`]), so splitting a sample of `k1 + k2` indices into chained
//! calls of `k1` and `k2` reproduces the exact same index sequence.

use crate::error::{Error, Result};
use crate::rng::{CounterRng, RngState};
use crate::scalar::Scalar;

/// Convert a full-width raw word to a uniform in `[0, 1)` with 53-bit resolution
#[inline(always)]
fn u64_to_unit(w: u64) -> f64 {
    (w >> 11) as f64 / (1u64 << 53) as f64
}

/// Transform weights into a normalized cumulative distribution, in place
///
/// Negative weights are clipped to zero before accumulation; this is a
/// defined degenerate-input rule, not an error. After the call the slice is
/// non-decreasing and its last element is exactly 1.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the clipped weights sum to zero
/// (there is no distribution to sample from).
///
/// Items with zero weight occupy a zero-width interval of the CDF and are
/// never selected by [`sample_indices_iid`], except when a drawn uniform
/// lands exactly on the interval boundary. That floating-point boundary case
/// has probability on the order of one in 2^53 per draw.
pub fn weights_to_cdf<T: Scalar>(weights: &mut [T]) -> Result<()> {
    let mut total = T::zero();
    for w in weights.iter_mut() {
        if *w < T::zero() {
            *w = T::zero();
        }
        total = total + *w;
        *w = total;
    }
    if total <= T::zero() || total.is_nan() {
        return Err(Error::invalid_arg(
            "weights",
            "weights must have positive total mass after clipping",
        ));
    }
    for w in weights.iter_mut() {
        *w = *w / total;
    }
    Ok(())
}

/// Sample indices iid from the distribution described by a CDF
///
/// Fills every slot of `samples` with an index into `cdf`, drawn by inverse
/// transform: the sample is the smallest `i` with `cdf[i] >= u`. Lookup is a
/// binary search, so each draw costs `O(log n)`.
///
/// Returns the state advanced by exactly `samples.len()` draws.
pub fn sample_indices_iid<T: Scalar, G: CounterRng>(
    cdf: &[T],
    samples: &mut [i64],
    state: RngState<G>,
) -> Result<RngState<G>> {
    let n = cdf.len();
    if n == 0 {
        return Err(Error::invalid_arg("cdf", "cdf must be nonempty"));
    }
    let mut ctr = state.counter;
    for s in samples.iter_mut() {
        let [w, _] = G::raw_block(ctr, state.key);
        ctr = G::counter_add(ctr, 1);
        let u = T::from_f64(u64_to_unit(w));
        // Smallest index whose cumulative weight reaches u. An unnormalized
        // CDF whose last entry falls below u clamps to the final index.
        let idx = cdf.partition_point(|&c| c < u).min(n - 1);
        *s = idx as i64;
    }
    Ok(RngState::from_parts(ctr, state.key))
}

/// Sample indices iid from the uniform distribution over `[0, n)`
///
/// Specialization of [`sample_indices_iid`] for the implicit CDF
/// `cdf[i] = (i + 1) / n`; no CDF buffer is materialized and each draw maps
/// a raw word directly into the domain.
///
/// Returns the state advanced by exactly `samples.len()` draws.
pub fn sample_indices_iid_uniform<G: CounterRng>(
    n: i64,
    samples: &mut [i64],
    state: RngState<G>,
) -> Result<RngState<G>> {
    if n <= 0 {
        return Err(Error::invalid_arg("n", "domain size must be positive"));
    }
    let mut ctr = state.counter;
    for s in samples.iter_mut() {
        let [w, _] = G::raw_block(ctr, state.key);
        ctr = G::counter_add(ctr, 1);
        *s = (w % n as u64) as i64;
    }
    Ok(RngState::from_parts(ctr, state.key))
}

/// Repeated partial Fisher-Yates sampling without replacement
///
/// Performs `dim_minor` independent passes, each selecting `vec_nnz`
/// distinct indices from `[0, dim_major)`. Pass `r` writes its selections
/// contiguously into `idxs_major[r * vec_nnz ..]`, records `r` into the
/// matching slots of `idxs_minor`, and writes a Rademacher value (plus or
/// minus one) into `vals`. Sparse operator fills consume all three arrays;
/// callers that only need the indices pass scratch for the other two.
///
/// The shuffle workspace starts as the identity permutation and is restored
/// after each pass by undoing the swaps in reverse, so a pass never pays an
/// `O(dim_major)` reinitialization.
///
/// Each selection step consumes one counter block; the returned state is
/// advanced by exactly `vec_nnz * dim_minor` draws. Calling this once for
/// `dim_minor` passes is bit-identical to `dim_minor` chained single-pass
/// calls, which is what makes checkpointed and distributed sampling exact.
pub fn repeated_fisher_yates<T: Scalar, G: CounterRng>(
    state: RngState<G>,
    vec_nnz: usize,
    dim_major: usize,
    dim_minor: usize,
    idxs_major: &mut [i64],
    idxs_minor: &mut [i64],
    vals: &mut [T],
) -> Result<RngState<G>> {
    if vec_nnz > dim_major {
        return Err(Error::invalid_arg(
            "vec_nnz",
            format!(
                "cannot draw {} distinct indices from a domain of size {}",
                vec_nnz, dim_major
            ),
        ));
    }
    let total = vec_nnz * dim_minor;
    if idxs_major.len() < total {
        return Err(Error::buffer_too_small("idxs_major", idxs_major.len(), total));
    }
    if idxs_minor.len() < total {
        return Err(Error::buffer_too_small("idxs_minor", idxs_minor.len(), total));
    }
    if vals.len() < total {
        return Err(Error::buffer_too_small("vals", vals.len(), total));
    }

    let mut vec_work: Vec<i64> = (0..dim_major as i64).collect();
    let mut pivots = vec![0usize; vec_nnz];
    let mut ctr = state.counter;

    for rep in 0..dim_minor {
        let offset = rep * vec_nnz;
        for j in 0..vec_nnz {
            let [w_idx, w_sign] = G::raw_block(ctr, state.key);
            ctr = G::counter_add(ctr, 1);
            // Swap-select position ell in [j, dim_major) down to position j
            let ell = j + (w_idx % (dim_major - j) as u64) as usize;
            pivots[j] = ell;
            let selected = vec_work[ell];
            vec_work[ell] = vec_work[j];
            vec_work[j] = selected;
            idxs_major[offset + j] = selected;
            idxs_minor[offset + j] = rep as i64;
            vals[offset + j] = if w_sign >> 63 == 1 { -T::one() } else { T::one() };
        }
        // Undo the swaps in reverse so the next pass starts from the identity
        for j in (0..vec_nnz).rev() {
            let ell = pivots[j];
            vec_work.swap(j, ell);
        }
    }
    Ok(RngState::from_parts(ctr, state.key))
}
