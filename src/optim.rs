//! Weight update rules.
//!
//! Both rules run once per epoch over the gradients accumulated for the whole
//! training set. Gradients point *downhill*: the trainer accumulates
//! `output * delta` with `delta` seeded from `ideal - actual`, so a positive
//! gradient means the weight should grow.
//!
//! Per-weight state (`last_delta`, `last_gradient`, `update_values`) lives in
//! the trainer and persists across epochs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::sign;
use crate::{Error, Result};

/// Step growth factor when a gradient keeps its sign.
pub const POSITIVE_ETA: f64 = 1.2;
/// Step shrink factor when a gradient flips sign.
pub const NEGATIVE_ETA: f64 = 0.5;
/// Lower bound of an RPROP step.
pub const DELTA_MIN: f64 = 1e-6;
/// Upper bound of an RPROP step.
pub const MAX_STEP: f64 = 50.0;
/// RPROP step every weight starts with.
pub const DEFAULT_INITIAL_UPDATE: f64 = 0.1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Update rule applied after each epoch.
pub enum TrainingMethod {
    /// Gradient step with momentum:
    /// `delta = gradient * learning_rate + last_delta * momentum`.
    ///
    /// `last_delta` is the change applied by the previous epoch. The trainer
    /// keeps it across epochs (only the gradients are reset), so momentum
    /// carries from one `iteration` into the next. It starts at zero when the
    /// trainer is created.
    Backprop { learning_rate: f64, momentum: f64 },
    /// Resilient propagation: sign-only steps with per-weight adaptive sizes.
    #[default]
    Rprop,
}

impl TrainingMethod {
    /// Build from a type name ("BPROP" or "RPROP", case-insensitive) and the
    /// back-propagation hyperparameters. RPROP ignores `learning_rate` and
    /// `momentum`.
    pub fn from_parts(kind: &str, learning_rate: f64, momentum: f64) -> Result<Self> {
        let method = match kind.trim().to_ascii_uppercase().as_str() {
            "BPROP" => TrainingMethod::Backprop {
                learning_rate,
                momentum,
            },
            "RPROP" => TrainingMethod::Rprop,
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unknown training type {other:?}, expected BPROP or RPROP"
                )));
            }
        };
        method.validate()?;
        Ok(method)
    }

    /// Validate hyperparameters.
    pub fn validate(self) -> Result<()> {
        match self {
            TrainingMethod::Backprop {
                learning_rate,
                momentum,
            } => {
                if !learning_rate.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "learning rate must be finite, got {learning_rate}"
                    )));
                }
                if !momentum.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "momentum must be finite, got {momentum}"
                    )));
                }
                Ok(())
            }
            TrainingMethod::Rprop => Ok(()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrainingMethod::Backprop { .. } => "BPROP",
            TrainingMethod::Rprop => "RPROP",
        }
    }
}

/// Back-propagation with momentum over every weight.
pub fn learn_bprop(
    weights: &mut [f64],
    gradients: &[f64],
    last_delta: &mut [f64],
    learning_rate: f64,
    momentum: f64,
) {
    debug_assert_eq!(weights.len(), gradients.len());
    debug_assert_eq!(weights.len(), last_delta.len());

    for i in 0..weights.len() {
        let delta = gradients[i] * learning_rate + last_delta[i] * momentum;
        last_delta[i] = delta;
        weights[i] += delta;
    }
}

/// Resilient propagation (with weight backtracking) over every weight.
pub fn learn_rprop(
    weights: &mut [f64],
    gradients: &[f64],
    last_gradient: &mut [f64],
    last_delta: &mut [f64],
    update_values: &mut [f64],
) {
    debug_assert_eq!(weights.len(), gradients.len());
    debug_assert_eq!(weights.len(), last_gradient.len());
    debug_assert_eq!(weights.len(), last_delta.len());
    debug_assert_eq!(weights.len(), update_values.len());

    for i in 0..weights.len() {
        let change = sign(gradients[i] * last_gradient[i]);

        let weight_change = if change > 0 {
            let delta = (update_values[i] * POSITIVE_ETA).min(MAX_STEP);
            update_values[i] = delta;
            last_gradient[i] = gradients[i];
            f64::from(sign(gradients[i])) * delta
        } else if change < 0 {
            // Overshot a minimum: shrink the step and undo the last move.
            update_values[i] = (update_values[i] * NEGATIVE_ETA).max(DELTA_MIN);
            last_gradient[i] = 0.0;
            -last_delta[i]
        } else {
            last_gradient[i] = gradients[i];
            f64::from(sign(gradients[i])) * update_values[i]
        };

        weights[i] += weight_change;
        last_delta[i] = weight_change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn from_parts_parses_type_names() {
        assert_eq!(
            TrainingMethod::from_parts("rprop", 0.0, 0.0).unwrap(),
            TrainingMethod::Rprop
        );
        assert_eq!(
            TrainingMethod::from_parts("BPROP", 0.7, 0.3).unwrap(),
            TrainingMethod::Backprop {
                learning_rate: 0.7,
                momentum: 0.3
            }
        );
        assert!(TrainingMethod::from_parts("QPROP", 0.1, 0.0).is_err());
        assert!(TrainingMethod::from_parts("BPROP", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn bprop_applies_momentum() {
        let mut w = [1.0];
        let mut last = [0.0];
        learn_bprop(&mut w, &[2.0], &mut last, 0.5, 0.9);
        assert_abs_diff_eq!(w[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(last[0], 1.0, epsilon = 1e-12);

        learn_bprop(&mut w, &[0.0], &mut last, 0.5, 0.9);
        assert_abs_diff_eq!(w[0], 2.9, epsilon = 1e-12);
        assert_abs_diff_eq!(last[0], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn rprop_grows_step_while_sign_holds() {
        let mut w = [0.0];
        let mut last_g = [0.0];
        let mut last_d = [0.0];
        let mut upd = [DEFAULT_INITIAL_UPDATE];

        // First epoch: no history, plain step.
        learn_rprop(&mut w, &[3.0], &mut last_g, &mut last_d, &mut upd);
        assert_abs_diff_eq!(upd[0], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(w[0], 0.1, epsilon = 1e-12);

        learn_rprop(&mut w, &[0.5], &mut last_g, &mut last_d, &mut upd);
        assert_abs_diff_eq!(upd[0], 0.1 * 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(w[0], 0.1 + 0.12, epsilon = 1e-12);
        assert_abs_diff_eq!(last_d[0], 0.12, epsilon = 1e-12);
    }

    #[test]
    fn rprop_step_is_capped() {
        let mut w = [0.0];
        let mut last_g = [1.0];
        let mut last_d = [0.0];
        let mut upd = [45.0];
        learn_rprop(&mut w, &[-1.0e-3], &mut last_g, &mut last_d, &mut upd);
        // Sign flipped: this one shrinks.
        assert_abs_diff_eq!(upd[0], 22.5, epsilon = 1e-12);

        let mut last_g = [1.0];
        let mut upd = [45.0];
        learn_rprop(&mut w, &[1.0], &mut last_g, &mut last_d, &mut upd);
        assert_eq!(upd[0], MAX_STEP);
    }

    #[test]
    fn rprop_sign_flip_reverts_previous_move() {
        let mut w = [1.0];
        let mut last_g = [0.0];
        let mut last_d = [0.0];
        let mut upd = [DEFAULT_INITIAL_UPDATE];

        learn_rprop(&mut w, &[-2.0], &mut last_g, &mut last_d, &mut upd);
        assert_abs_diff_eq!(w[0], 0.9, epsilon = 1e-12);

        learn_rprop(&mut w, &[4.0], &mut last_g, &mut last_d, &mut upd);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(upd[0], 0.05, epsilon = 1e-12);
        assert_eq!(last_g[0], 0.0);

        // History was cleared, so the next epoch takes a plain step.
        learn_rprop(&mut w, &[4.0], &mut last_g, &mut last_d, &mut upd);
        assert_abs_diff_eq!(w[0], 1.05, epsilon = 1e-12);
        assert_abs_diff_eq!(upd[0], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn rprop_step_is_floored() {
        let mut w = [0.0];
        let mut last_g = [1.0];
        let mut last_d = [0.0];
        let mut upd = [1.5e-6];
        learn_rprop(&mut w, &[-1.0], &mut last_g, &mut last_d, &mut upd);
        assert_eq!(upd[0], DELTA_MIN);
    }
}
