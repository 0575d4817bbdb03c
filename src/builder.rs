//! Network builder.
//!
//! `NetworkBuilder` is a fluent front end over [`LayerSpec`] lists. Layers are
//! added input first; positions are 0-based in that order and are what
//! [`NetworkBuilder::feed_context`] refers to.
//!
//! ```rust
//! use rust_flatnet::{Activation, NetworkBuilder};
//!
//! # fn main() -> rust_flatnet::Result<()> {
//! // Elman network: the hidden layer's output is fed back into the input
//! // layer's context neurons.
//! let net = NetworkBuilder::new(1, 1.0)?
//!     .add_layer(Activation::Tanh, 4, 1.0)?
//!     .add_layer(Activation::Linear, 1, 0.0)?
//!     .feed_context(1, 0)?
//!     .build_with_seed(0)?;
//! assert_eq!(net.layer_counts(), &[1, 5, 6]);
//! # Ok(())
//! # }
//! ```

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{Activation, Error, LayerSpec, Network, Result};

#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    layers: Vec<LayerSpec>,
}

impl NetworkBuilder {
    /// Start with an input layer of `input_count` neurons.
    ///
    /// `bias_activation` of `0.0` means no bias neuron.
    pub fn new(input_count: usize, bias_activation: f64) -> Result<Self> {
        let input = LayerSpec::new(Activation::Linear, input_count, bias_activation)?;
        Ok(Self {
            layers: vec![input],
        })
    }

    /// Convenience constructor: `sizes` lists every layer's neuron count,
    /// input first. Every non-output layer gets a bias neuron of 1.0 and every
    /// non-input layer uses `activation`.
    pub fn from_sizes(sizes: &[usize], activation: Activation) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output counts".to_owned(),
            ));
        }
        let last = sizes.len() - 1;
        let mut b = Self::new(sizes[0], 1.0)?;
        for (i, &count) in sizes.iter().enumerate().skip(1) {
            let bias = if i == last { 0.0 } else { 1.0 };
            b = b.add_layer(activation, count, bias)?;
        }
        Ok(b)
    }

    /// Append a layer downstream of the current last layer.
    pub fn add_layer(mut self, activation: Activation, count: usize, bias_activation: f64) -> Result<Self> {
        self.layers
            .push(LayerSpec::new(activation, count, bias_activation)?);
        Ok(self)
    }

    /// Mirror the output of layer `source` into context neurons of layer
    /// `consumer` after every forward pass.
    pub fn feed_context(mut self, source: usize, consumer: usize) -> Result<Self> {
        let n = self.layers.len();
        if source >= n || consumer >= n {
            return Err(Error::InvalidConfig(format!(
                "context link {source} -> {consumer} out of range for {n} layers"
            )));
        }
        self.layers[consumer] = self.layers[consumer].with_context_from(source);
        Ok(self)
    }

    /// Layer specifications added so far, input first.
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Build with every weight at zero.
    pub fn build(self) -> Result<Network> {
        Network::create(&self.layers)
    }

    /// Build and randomize weights from a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build and randomize weights from the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        let mut network = self.build()?;
        network.randomize_with_rng(rng);
        Ok(network)
    }
}
