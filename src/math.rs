//! Stateless numeric helpers shared by the network and the trainer.

/// Threshold below which a value is treated as zero.
///
/// Used for bias detection (`|bias| > PRECISION`) and by [`sign`].
pub const PRECISION: f64 = 1e-10;

/// Smallest exponential sum softmax accepts before falling back to a uniform
/// distribution.
pub const DEFAULT_DOUBLE_EQUAL: f64 = 1e-13;

/// Sign of `x` with a dead zone: returns `0` when `|x| < PRECISION`.
#[inline]
pub fn sign(x: f64) -> i8 {
    if x.abs() < PRECISION {
        0
    } else if x > 0.0 {
        1
    } else {
        -1
    }
}
