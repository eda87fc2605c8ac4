//! ThreeFry4x64-20 counter-based generator
//!
//! 20-round Threefish-based cipher from Salmon et al. "Parallel Random
//! Numbers: As Easy as 1, 2, 3" (2011). One counter block yields four
//! 64-bit words.

use super::CounterRng;

const THREEFRY_ROTATION: [[u32; 4]; 8] = [
    [14, 16, 52, 57],
    [23, 40, 5, 37],
    [33, 48, 46, 12],
    [17, 34, 22, 32],
    [13, 50, 10, 17],
    [25, 29, 39, 43],
    [26, 24, 20, 10],
    [37, 38, 19, 22],
];

const THREEFRY_PARITY64: u64 = 0x1BD11BDAA9FC1A22;

/// ThreeFry round function
#[inline(always)]
fn threefry_round(x: &mut [u64; 4], ks: &[u64; 5], r: usize) {
    // Add round key every 4 rounds
    if r % 4 == 0 {
        let d = r / 4;
        x[0] = x[0].wrapping_add(ks[d % 5]);
        x[1] = x[1].wrapping_add(ks[(d + 1) % 5]);
        x[2] = x[2].wrapping_add(ks[(d + 2) % 5]);
        x[3] = x[3].wrapping_add(ks[(d + 3) % 5]).wrapping_add(d as u64);
    }

    // MIX: add + rotate
    let rot = &THREEFRY_ROTATION[r % 8];

    x[0] = x[0].wrapping_add(x[1]);
    x[1] = x[1].rotate_left(rot[0]) ^ x[0];

    x[2] = x[2].wrapping_add(x[3]);
    x[3] = x[3].rotate_left(rot[1]) ^ x[2];

    // Permute
    x.swap(1, 3);
}

/// ThreeFry4x64-20: 20-round Threefish cipher
#[inline(always)]
fn threefry4x64_20(ctr: [u64; 4], key: [u64; 2]) -> [u64; 4] {
    // Extend key with parity
    let ks = [key[0], key[1], 0, 0, key[0] ^ key[1] ^ THREEFRY_PARITY64];

    let mut x = ctr;

    for r in 0..20 {
        threefry_round(&mut x, &ks, r);
    }

    // Final key addition
    x[0] = x[0].wrapping_add(ks[0]);
    x[1] = x[1].wrapping_add(ks[1]);
    x[2] = x[2].wrapping_add(ks[2]);
    x[3] = x[3].wrapping_add(ks[3]).wrapping_add(5);

    x
}

/// Convert u64 to uniform float in [0, 1)
#[inline(always)]
fn u64_to_uniform(u: u64) -> f64 {
    // Use 53 bits for full double precision
    (u >> 11) as f64 / (1u64 << 53) as f64
}

/// The ThreeFry4x64-20 generator: 256-bit counter, 128-bit key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreeFry4x64;

impl CounterRng for ThreeFry4x64 {
    type Counter = [u64; 4];
    type Key = [u64; 2];

    const WORDS_PER_BLOCK: u64 = 4;

    #[inline]
    fn key_from_seed(seed: u64) -> [u64; 2] {
        [seed, 0]
    }

    #[inline]
    fn mix_key(key: [u64; 2], salt: u64) -> [u64; 2] {
        let mix = salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        [key[0].wrapping_add(mix), key[1].wrapping_add(mix.rotate_left(32))]
    }

    #[inline]
    fn counter_add(mut ctr: [u64; 4], blocks: u64) -> [u64; 4] {
        let (sum, mut carry) = ctr[0].overflowing_add(blocks);
        ctr[0] = sum;
        for w in ctr.iter_mut().skip(1) {
            if !carry {
                break;
            }
            let (sum, c) = w.overflowing_add(1);
            *w = sum;
            carry = c;
        }
        ctr
    }

    #[inline]
    fn counter_low_word(ctr: [u64; 4]) -> u64 {
        ctr[0]
    }

    #[inline]
    fn raw_block(ctr: [u64; 4], key: [u64; 2]) -> [u64; 2] {
        let x = threefry4x64_20(ctr, key);
        [x[0], x[1]]
    }

    #[inline]
    fn uniform_block(ctr: [u64; 4], key: [u64; 2]) -> [f64; 4] {
        let x = threefry4x64_20(ctr, key);
        [
            u64_to_uniform(x[0]),
            u64_to_uniform(x[1]),
            u64_to_uniform(x[2]),
            u64_to_uniform(x[3]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_deterministic() {
        let key = ThreeFry4x64::key_from_seed(42);
        assert_eq!(
            ThreeFry4x64::raw_block([9, 0, 0, 0], key),
            ThreeFry4x64::raw_block([9, 0, 0, 0], key)
        );
    }

    #[test]
    fn counter_add_carries() {
        let ctr = [u64::MAX, 0, 0, 0];
        assert_eq!(ThreeFry4x64::counter_add(ctr, 1), [0, 1, 0, 0]);
        let ctr = [u64::MAX, u64::MAX, 3, 0];
        assert_eq!(ThreeFry4x64::counter_add(ctr, 2), [1, 0, 4, 0]);
    }

    #[test]
    fn uniforms_in_unit_interval() {
        let key = ThreeFry4x64::key_from_seed(17);
        for c in 0..256u64 {
            for u in ThreeFry4x64::uniform_block([c, 0, 0, 0], key) {
                assert!((0.0..1.0).contains(&u));
            }
        }
    }
}
