//! Activation functions.
//!
//! Every layer of a [`crate::Network`] applies one activation to the block of
//! neurons that is fed from the upstream layer. The network caches both the
//! pre-activation sums and the post-activation outputs, so a derivative can
//! be expressed in whichever of the two is cheaper:
//!
//! - `Sigmoid`, `Tanh`: from the post-activation output
//! - `Elliott`, `ElliottSymmetric`: from the pre-activation sum
//! - `Linear`, `Softmax`: constant 1
//!
//! Activations are looked up by name when a persisted network is loaded
//! (see [`Activation::name`] and the `FromStr` impl).

use std::fmt;
use std::str::FromStr;

use crate::math::DEFAULT_DOUBLE_EQUAL;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Activation applied in place over one layer's fed neurons.
pub enum Activation {
    Sigmoid,
    Tanh,
    Linear,
    /// Normalized exponential over the whole layer.
    Softmax,
    /// Elliott sigmoid approximation, range `(0, 1)`.
    Elliott { slope: f64 },
    /// Elliott tanh approximation, range `(-1, 1)`.
    ElliottSymmetric { slope: f64 },
}

impl Activation {
    /// Elliott with the default slope of 1.
    pub const fn elliott() -> Self {
        Activation::Elliott { slope: 1.0 }
    }

    /// Symmetric Elliott with the default slope of 1.
    pub const fn elliott_symmetric() -> Self {
        Activation::ElliottSymmetric { slope: 1.0 }
    }

    /// Validate activation parameters.
    pub fn validate(self) -> Result<()> {
        match self {
            Activation::Elliott { slope } | Activation::ElliottSymmetric { slope } => {
                if !(slope.is_finite() && slope > 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "{} slope must be finite and > 0, got {slope}",
                        self.name()
                    )));
                }
            }
            Activation::Sigmoid | Activation::Tanh | Activation::Linear | Activation::Softmax => {}
        }
        Ok(())
    }

    /// Registry name, stable across versions.
    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Linear => "linear",
            Activation::Softmax => "softmax",
            Activation::Elliott { .. } => "elliott",
            Activation::ElliottSymmetric { .. } => "elliott_symmetric",
        }
    }

    /// Slope parameter, if this activation has one.
    pub fn slope(self) -> Option<f64> {
        match self {
            Activation::Elliott { slope } | Activation::ElliottSymmetric { slope } => Some(slope),
            _ => None,
        }
    }

    /// Apply the activation in place to every value in `values`.
    ///
    /// `values` is the window `[start, start + size)` of a layer output buffer.
    pub fn apply(self, values: &mut [f64]) {
        match self {
            Activation::Sigmoid => {
                for v in values.iter_mut() {
                    *v = sigmoid(*v);
                }
            }
            Activation::Tanh => {
                for v in values.iter_mut() {
                    *v = v.tanh();
                }
            }
            Activation::Linear => {}
            Activation::Softmax => softmax(values),
            Activation::Elliott { slope } => {
                for v in values.iter_mut() {
                    let s = *v * slope;
                    *v = (s / 2.0) / (1.0 + s.abs()) + 0.5;
                }
            }
            Activation::ElliottSymmetric { slope } => {
                for v in values.iter_mut() {
                    let s = *v * slope;
                    *v = s / (1.0 + s.abs());
                }
            }
        }
    }

    /// Derivative evaluated at a neuron's pre-activation sum `before` and its
    /// post-activation output `after`.
    #[inline]
    pub fn derivative(self, before: f64, after: f64) -> f64 {
        match self {
            Activation::Sigmoid => after * (1.0 - after),
            Activation::Tanh => 1.0 - after * after,
            Activation::Linear | Activation::Softmax => 1.0,
            Activation::Elliott { slope } => {
                let d = 1.0 + (before * slope).abs();
                slope / (2.0 * d * d)
            }
            Activation::ElliottSymmetric { slope } => {
                let d = 1.0 + (before * slope).abs();
                slope / (d * d)
            }
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    /// Resolve a registry name. Parameterised activations get their default slope.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "linear" => Ok(Activation::Linear),
            "softmax" => Ok(Activation::Softmax),
            "elliott" => Ok(Activation::elliott()),
            "elliott_symmetric" => Ok(Activation::elliott_symmetric()),
            other => Err(Error::InvalidConfig(format!(
                "unknown activation function {other:?}"
            ))),
        }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

fn softmax(values: &mut [f64]) {
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = v.exp();
        sum += *v;
    }

    if !sum.is_finite() || sum < DEFAULT_DOUBLE_EQUAL {
        let uniform = 1.0 / values.len() as f64;
        values.fill(uniform);
    } else {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    fn applied(act: Activation, x: f64) -> f64 {
        let mut v = [x];
        act.apply(&mut v);
        v[0]
    }

    #[test]
    fn sigmoid_basic_values() {
        assert_abs_diff_eq!(applied(Activation::Sigmoid, 0.0), 0.5);
        assert!(applied(Activation::Sigmoid, 10.0) > 0.999);
        assert!(applied(Activation::Sigmoid, -10.0) < 0.001);
        assert_abs_diff_eq!(Activation::Sigmoid.derivative(0.0, 0.5), 0.25);
    }

    #[test]
    fn linear_is_identity_with_unit_derivative() {
        assert_eq!(applied(Activation::Linear, -3.25), -3.25);
        assert_eq!(Activation::Linear.derivative(7.0, 7.0), 1.0);
    }

    #[test]
    fn elliott_variants_match_closed_forms() {
        let e = Activation::elliott();
        assert_abs_diff_eq!(applied(e, 0.0), 0.5);
        assert_abs_diff_eq!(applied(e, 1.0), 0.75);
        assert_abs_diff_eq!(e.derivative(1.0, 0.75), 1.0 / 8.0);

        let es = Activation::elliott_symmetric();
        assert_abs_diff_eq!(applied(es, 1.0), 0.5);
        assert_abs_diff_eq!(applied(es, -1.0), -0.5);
        assert_abs_diff_eq!(es.derivative(1.0, 0.5), 0.25);
    }

    #[test]
    fn softmax_normalizes_window() {
        let mut v = [1.0, 2.0, 3.0];
        Activation::Softmax.apply(&mut v);
        assert_abs_diff_eq!(v.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(v[2] > v[1] && v[1] > v[0]);
    }

    #[test]
    fn softmax_falls_back_to_uniform_on_degenerate_sum() {
        let mut v = [-1000.0, -1000.0, -1000.0, -1000.0];
        Activation::Softmax.apply(&mut v);
        assert_eq!(v, [0.25; 4]);

        let mut v = [f64::NAN, 0.0];
        Activation::Softmax.apply(&mut v);
        assert_eq!(v, [0.5, 0.5]);

        // exp overflows to inf
        let mut v = [1000.0, 0.0];
        Activation::Softmax.apply(&mut v);
        assert_eq!(v, [0.5, 0.5]);
    }

    #[test]
    fn elliott_slope_must_be_positive_and_finite() {
        assert!(Activation::Elliott { slope: 0.0 }.validate().is_err());
        assert!(Activation::ElliottSymmetric { slope: f64::NAN }.validate().is_err());
        assert!(Activation::Elliott { slope: 0.5 }.validate().is_ok());
        assert!(Activation::Tanh.validate().is_ok());
    }

    #[test]
    fn names_resolve_back_to_activations() {
        for act in [
            Activation::Sigmoid,
            Activation::Tanh,
            Activation::Linear,
            Activation::Softmax,
            Activation::elliott(),
            Activation::elliott_symmetric(),
        ] {
            assert_eq!(act.name().parse::<Activation>().unwrap(), act);
        }
        assert!("relu".parse::<Activation>().is_err());
    }
}
