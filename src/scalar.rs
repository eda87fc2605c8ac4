//! Scalar trait mapping Rust float types to the kernels

use num_traits::Float;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Trait for real scalar types the sketching kernels operate on
///
/// Implemented for `f32` and `f64`. The `to_f64`/`from_f64` hooks let the
/// generators produce variates in double precision and narrow once, so f32
/// and f64 operators with the same seed agree to f32 rounding.
pub trait Scalar:
    Float + Copy + Clone + Send + Sync + Debug + Display + Sum + 'static
{
    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;
}

impl Scalar for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl Scalar for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}
