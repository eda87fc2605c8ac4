//! Counter-based random state
//!
//! A counter-based generator is a pure function from a `(counter, key)` pair
//! to a block of output words. State "advancement" is plain counter
//! arithmetic, which makes every sampling routine in this crate resumable:
//! two states with equal counter and key produce identical output forever.
//!
//! # Draw accounting
//!
//! All counter movement goes through [`RngState::advance`], which implements
//! `blocks = ceil(num_draws * words_per_draw / WORDS_PER_BLOCK)`:
//!
//! - Index samplers ([`crate::sample`]) consume one whole block per draw
//!   (`words_per_draw = WORDS_PER_BLOCK`), so drawing `k1 + k2` samples in
//!   one call is bit-identical to drawing `k1` then `k2` with the returned
//!   state threaded between the calls, and the counter advances by exactly
//!   `k1 + k2`.
//! - Bulk fills ([`crate::dense`]) consume one word per value
//!   (`words_per_draw = 1`), packing four values into each block. Batched
//!   and incremental fills may then differ by at most one block of counter
//!   movement; that one-block tolerance is part of the advancement contract.

mod philox;
mod threefry;

pub use philox::Philox4x32;
pub use threefry::ThreeFry4x64;

use std::f64::consts::PI;
use std::fmt::Debug;

/// A counter-based block generator
///
/// Implementations are stateless unit types; the whole generator state lives
/// in the `(Counter, Key)` pair carried by [`RngState`]. One counter value
/// ("block") yields [`Self::WORDS_PER_BLOCK`] output words.
pub trait CounterRng:
    Copy + Clone + Debug + Default + PartialEq + Eq + Send + Sync + 'static
{
    /// Fixed-width counter word tuple
    type Counter: Copy + Clone + Debug + Default + PartialEq + Eq + Send + Sync;
    /// Fixed-width key word tuple
    type Key: Copy + Clone + Debug + Default + PartialEq + Eq + Send + Sync;

    /// Output words produced per counter increment
    const WORDS_PER_BLOCK: u64;

    /// Derive a key from a 64-bit seed
    fn key_from_seed(seed: u64) -> Self::Key;

    /// Mix a salt into a key, deriving an independent sub-stream
    fn mix_key(key: Self::Key, salt: u64) -> Self::Key;

    /// Add `blocks` to the counter, carrying across words
    fn counter_add(ctr: Self::Counter, blocks: u64) -> Self::Counter;

    /// The low-order counter bits, for diagnostics and advancement tests
    fn counter_low_word(ctr: Self::Counter) -> u64;

    /// Two full-width (64-bit) words from one block, for integer draws
    fn raw_block(ctr: Self::Counter, key: Self::Key) -> [u64; 2];

    /// Four uniform draws in `[0, 1)` from one block, for value fills
    fn uniform_block(ctr: Self::Counter, key: Self::Key) -> [f64; 4];
}

/// Immutable counter + key state of a counter-based generator
///
/// This is the unit of reproducibility passed between all sampling and fill
/// calls: a value type, freely copied, never shared mutably. Every routine
/// that consumes randomness takes an `RngState` and returns the advanced
/// state for the caller to thread into the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngState<G: CounterRng = Philox4x32> {
    /// Counter words
    pub counter: G::Counter,
    /// Key words
    pub key: G::Key,
}

impl<G: CounterRng> Default for RngState<G> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<G: CounterRng> RngState<G> {
    /// State with a zero counter and a key derived from `seed`
    pub fn new(seed: u64) -> Self {
        RngState {
            counter: G::Counter::default(),
            key: G::key_from_seed(seed),
        }
    }

    /// State from explicit counter and key words
    pub fn from_parts(counter: G::Counter, key: G::Key) -> Self {
        RngState { counter, key }
    }

    /// Advance past `num_draws` draws of `words_per_draw` words each
    ///
    /// The counter moves by
    /// `ceil(num_draws * words_per_draw / WORDS_PER_BLOCK)` blocks.
    #[must_use]
    pub fn advance(&self, num_draws: u64, words_per_draw: u64) -> Self {
        let words = num_draws as u128 * words_per_draw as u128;
        let blocks = words.div_ceil(G::WORDS_PER_BLOCK as u128) as u64;
        self.advance_blocks(blocks)
    }

    /// Advance the counter by a whole number of blocks
    #[must_use]
    pub fn advance_blocks(&self, blocks: u64) -> Self {
        RngState {
            counter: G::counter_add(self.counter, blocks),
            key: self.key,
        }
    }

    /// Derive an independent sub-stream by mixing `salt` into the key
    ///
    /// Sub-streams share no output with the parent for any counter range,
    /// which is what makes lock-free parallel generation possible.
    #[must_use]
    pub fn fork(&self, salt: u64) -> Self {
        RngState {
            counter: self.counter,
            key: G::mix_key(self.key, salt),
        }
    }

    /// Low-order counter bits, for advancement checks
    pub fn counter_low(&self) -> u64 {
        G::counter_low_word(self.counter)
    }
}

/// Box-Muller transform: convert two uniform values to two standard normals
///
/// Shared by every Gaussian fill so all generators agree on the mapping from
/// uniform words to normal variates.
#[inline(always)]
pub(crate) fn box_muller(u1: f64, u2: f64) -> (f64, f64) {
    // Clamp to avoid log(0) and ensure valid range
    let u1 = u1.clamp(1e-10, 1.0 - 1e-10);

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;

    (r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_formula_rounds_up_to_blocks() {
        let s: RngState = RngState::new(0);
        // 17 one-word draws fit in ceil(17/4) = 5 blocks
        assert_eq!(s.advance(17, 1).counter_low(), 5);
        // 17 whole-block draws move 17 blocks
        assert_eq!(s.advance(17, 4).counter_low(), 17);
        assert_eq!(s.advance(0, 4).counter_low(), 0);
    }

    #[test]
    fn advance_is_additive_for_whole_block_draws() {
        let s: RngState = RngState::new(9);
        let once = s.advance(13 + 8, 4);
        let twice = s.advance(13, 4).advance(8, 4);
        assert_eq!(once, twice);
    }

    #[test]
    fn fork_changes_output_not_counter() {
        let s: RngState = RngState::new(1);
        let f = s.fork(1);
        assert_eq!(s.counter, f.counter);
        assert_ne!(
            Philox4x32::raw_block(s.counter, s.key),
            Philox4x32::raw_block(f.counter, f.key)
        );
    }

    #[test]
    fn equal_states_produce_equal_output() {
        let a: RngState = RngState::new(77).advance_blocks(123);
        let b: RngState = RngState::new(77).advance_blocks(123);
        assert_eq!(a, b);
        assert_eq!(
            Philox4x32::uniform_block(a.counter, a.key),
            Philox4x32::uniform_block(b.counter, b.key)
        );
    }

    #[test]
    fn threefry_state_advances_like_philox() {
        let s: RngState<ThreeFry4x64> = RngState::new(4);
        assert_eq!(s.advance(9, 1).counter_low(), 3);
        assert_eq!(s.advance(9, 4).counter_low(), 9);
    }
}
