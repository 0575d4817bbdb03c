//! Layer specifications.
//!
//! A [`LayerSpec`] only exists while a network is being assembled: it says how
//! many neurons a layer is fed with, whether it carries a bias neuron, and
//! whether a block of context neurons mirrors another layer's output.
//! [`crate::Network::create`] consumes a list of them, input layer first.

use crate::math::PRECISION;
use crate::{Activation, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    activation: Activation,
    count: usize,
    bias_activation: f64,
    /// Position (in the list passed to `Network::create`) of the layer whose
    /// output is copied into this layer's context neurons.
    context_fed_by: Option<usize>,
}

impl LayerSpec {
    /// A layer with `count` fed neurons.
    ///
    /// `bias_activation` is the constant output of the bias neuron; `0.0`
    /// means the layer has no bias neuron.
    pub fn new(activation: Activation, count: usize, bias_activation: f64) -> Result<Self> {
        activation.validate()?;
        if count == 0 {
            return Err(Error::InvalidConfig("layer count must be > 0".to_owned()));
        }
        if !bias_activation.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "bias activation must be finite, got {bias_activation}"
            )));
        }
        Ok(Self {
            activation,
            count,
            bias_activation,
            context_fed_by: None,
        })
    }

    /// Add context neurons to this layer, fed after every forward pass with
    /// the output of the layer at position `source`.
    pub fn with_context_from(mut self, source: usize) -> Self {
        self.context_fed_by = Some(source);
        self
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Neurons fed from the upstream layer (excludes bias and context).
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn bias_activation(&self) -> f64 {
        self.bias_activation
    }

    #[inline]
    pub fn context_fed_by(&self) -> Option<usize> {
        self.context_fed_by
    }

    #[inline]
    pub fn has_bias(&self) -> bool {
        self.bias_activation.abs() > PRECISION
    }

    /// Number of context neurons; `layers` is the full list this layer belongs to.
    pub fn context_count(&self, layers: &[LayerSpec]) -> usize {
        self.context_fed_by
            .and_then(|src| layers.get(src))
            .map_or(0, |src| src.count)
    }

    /// Fed + bias + context neurons.
    pub fn total_count(&self, layers: &[LayerSpec]) -> usize {
        self.count + usize::from(self.has_bias()) + self.context_count(layers)
    }
}
