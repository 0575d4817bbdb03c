//! Error functions.
//!
//! The trainer seeds the output layer's delta from an [`ErrorFunction`]:
//!
//! - run `network.compute(...)`
//! - write the per-output error into the delta buffer via `calculate_error`
//! - scale by the output activation's derivative and back-propagate

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Supported error functions.
pub enum ErrorFunction {
    /// Residual error `ideal - actual`.
    #[default]
    Linear,
}

impl ErrorFunction {
    /// Write the per-output error into `out`.
    ///
    /// Shape contract: `ideal.len() == actual.len() <= out.len()`; only the
    /// first `actual.len()` entries of `out` are written.
    #[inline]
    pub fn calculate_error(self, ideal: &[f64], actual: &[f64], out: &mut [f64]) {
        debug_assert_eq!(ideal.len(), actual.len());
        debug_assert!(out.len() >= actual.len());

        match self {
            ErrorFunction::Linear => {
                for i in 0..actual.len() {
                    out[i] = ideal[i] - actual[i];
                }
            }
        }
    }
}

/// Sum of squared differences between `actual` and `ideal`.
#[inline]
pub fn sum_squared_error(actual: &[f64], ideal: &[f64]) -> f64 {
    assert_eq!(
        actual.len(),
        ideal.len(),
        "actual len {} does not match ideal len {}",
        actual.len(),
        ideal.len()
    );

    let mut sum = 0.0;
    for i in 0..actual.len() {
        let diff = actual[i] - ideal[i];
        sum = diff.mul_add(diff, sum);
    }
    sum
}

/// Mean squared error over one output vector.
///
/// Note: no `0.5` factor; this is the value `evaluate` reports per sample.
#[inline]
pub fn mean_squared_error(actual: &[f64], ideal: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    sum_squared_error(actual, ideal) / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_error_is_residual() {
        let mut out = [0.0; 3];
        ErrorFunction::Linear.calculate_error(&[1.0, 0.0], &[0.25, 0.5], &mut out);
        assert_eq!(out, [0.75, -0.5, 0.0]);
    }

    #[test]
    fn mse_has_no_half_factor() {
        assert_eq!(mean_squared_error(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        assert_eq!(mean_squared_error(&[], &[]), 0.0);
    }
}
