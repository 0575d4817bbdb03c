//! Flat-array network.
//!
//! A [`Network`] stores its whole topology, all weights and the live
//! activation state in a handful of dense buffers instead of per-neuron
//! objects. Layers are stored in *reverse* order: array index 0 is the output
//! layer and the last index is the input layer. [`LayerId`] is that array
//! index.
//!
//! Layout of one layer's block inside `layer_output` / `layer_sums`:
//!
//! ```text
//! | fed neurons (feed count) | bias (0 or 1) | context neurons |
//! ```
//!
//! Offsets:
//!
//! - `layer_index[0] = 0`, `layer_index[i] = layer_index[i-1] + layer_counts[i-1]`
//! - `weight_index[0] = 0`, `weight_index[i] = weight_index[i-1] + layer_counts[i] * layer_feed_counts[i-1]`
//!
//! The weight block at `weight_index[i]` connects every neuron of layer `i+1`
//! (fed, bias and context) to every fed neuron of layer `i`, row-major with
//! shape `(layer_feed_counts[i], layer_counts[i+1])`.
//!
//! `layer_output` and `layer_sums` are scratch space mutated by every forward
//! pass, so a `Network` must not be shared between concurrent `compute` calls.

use std::ops::Range;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::math::PRECISION;
use crate::{Activation, Dataset, Error, LayerSpec, Result, loss};

/// Handle to one layer of a [`Network`]: its array index (0 = output layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(usize);

impl LayerId {
    pub const OUTPUT: LayerId = LayerId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub(crate) input_count: usize,
    pub(crate) output_count: usize,
    /// Total neurons per layer (fed + bias + context).
    pub(crate) layer_counts: Vec<usize>,
    /// Neurons fed from the upstream layer (excludes bias and context).
    pub(crate) layer_feed_counts: Vec<usize>,
    pub(crate) layer_context_count: Vec<usize>,
    pub(crate) layer_index: Vec<usize>,
    pub(crate) weight_index: Vec<usize>,
    /// Where a layer's output is copied after each forward pass (size 0 = nowhere).
    pub(crate) context_target_offset: Vec<usize>,
    pub(crate) context_target_size: Vec<usize>,
    pub(crate) bias_activation: Vec<f64>,
    pub(crate) activation_functions: Vec<Activation>,
    pub(crate) begin_training: usize,
    pub(crate) end_training: usize,
    pub(crate) weights: Vec<f64>,
    pub(crate) layer_output: Vec<f64>,
    pub(crate) layer_sums: Vec<f64>,
}

impl Network {
    /// Assemble a network from layer specifications, input layer first.
    ///
    /// All weights start at zero; call one of the `randomize*` methods before
    /// training.
    pub fn create(layers: &[LayerSpec]) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "network needs at least an input and an output layer, got {} layers",
                layers.len()
            )));
        }

        let layer_count = layers.len();
        let mut fed_by_source = vec![None; layer_count];
        for (pos, layer) in layers.iter().enumerate() {
            layer.activation().validate()?;
            let Some(source) = layer.context_fed_by() else {
                continue;
            };
            if source >= layer_count {
                return Err(Error::InvalidConfig(format!(
                    "layer {pos} takes context from layer {source}, but there are only {layer_count} layers"
                )));
            }
            if let Some(other) = fed_by_source[source].replace(pos) {
                return Err(Error::InvalidConfig(format!(
                    "layer {source} already feeds the context of layer {other}, cannot also feed layer {pos}"
                )));
            }
        }

        let mut layer_counts = Vec::with_capacity(layer_count);
        let mut layer_feed_counts = Vec::with_capacity(layer_count);
        let mut layer_context_count = Vec::with_capacity(layer_count);
        let mut layer_index = Vec::with_capacity(layer_count);
        let mut weight_index = Vec::with_capacity(layer_count);
        let mut bias_activation = Vec::with_capacity(layer_count);
        let mut activation_functions = Vec::with_capacity(layer_count);

        let mut neuron_count = 0;
        let mut weight_count = 0;

        // Walk from the output layer to the input layer; each slot derives from
        // the previously processed (downstream) one.
        for (index, pos) in (0..layer_count).rev().enumerate() {
            let layer = &layers[pos];
            let total = layer.total_count(layers);

            bias_activation.push(layer.bias_activation());
            layer_counts.push(total);
            layer_feed_counts.push(layer.count());
            layer_context_count.push(layer.context_count(layers));
            activation_functions.push(layer.activation());

            neuron_count += total;
            if pos > 0 {
                weight_count += layer.count() * layers[pos - 1].total_count(layers);
            }

            if index == 0 {
                weight_index.push(0);
                layer_index.push(0);
            } else {
                weight_index.push(
                    weight_index[index - 1] + layer_counts[index] * layer_feed_counts[index - 1],
                );
                layer_index.push(layer_index[index - 1] + layer_counts[index - 1]);
            }
        }

        let mut context_target_offset = vec![0; layer_count];
        let mut context_target_size = vec![0; layer_count];
        for (source_pos, consumer_pos) in fed_by_source.iter().enumerate() {
            let Some(consumer_pos) = *consumer_pos else {
                continue;
            };
            let source = layer_count - 1 - source_pos;
            let consumer = layer_count - 1 - consumer_pos;
            context_target_size[source] = layer_context_count[consumer];
            context_target_offset[source] =
                layer_index[consumer] + layer_counts[consumer] - layer_context_count[consumer];
        }

        let mut network = Self {
            input_count: layers[0].count(),
            output_count: layers[layer_count - 1].count(),
            layer_counts,
            layer_feed_counts,
            layer_context_count,
            layer_index,
            weight_index,
            context_target_offset,
            context_target_size,
            bias_activation,
            activation_functions,
            begin_training: 0,
            end_training: layer_count - 1,
            weights: vec![0.0; weight_count],
            layer_output: vec![0.0; neuron_count],
            layer_sums: vec![0.0; neuron_count],
        };
        network.clear_context();

        debug!(
            layers = layer_count,
            neurons = neuron_count,
            weights = weight_count,
            input_count = network.input_count,
            output_count = network.output_count,
            "created network"
        );
        Ok(network)
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layer_counts.len()
    }

    #[inline]
    pub fn input_layer(&self) -> LayerId {
        LayerId(self.layer_count() - 1)
    }

    /// Layer handles from the output layer (index 0) to the input layer.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        (0..self.layer_count()).map(LayerId)
    }

    /// Handle for array index `index`, if it exists.
    pub fn layer(&self, index: usize) -> Option<LayerId> {
        (index < self.layer_count()).then_some(LayerId(index))
    }

    #[inline]
    pub fn has_bias(&self, layer: LayerId) -> bool {
        self.bias_activation[layer.0].abs() > PRECISION
    }

    #[inline]
    pub fn activation(&self, layer: LayerId) -> Activation {
        self.activation_functions[layer.0]
    }

    /// Range of `layer`'s whole block within `layer_output` / `layer_sums`.
    #[inline]
    pub fn neurons(&self, layer: LayerId) -> Range<usize> {
        let start = self.layer_index[layer.0];
        start..start + self.layer_counts[layer.0]
    }

    /// Range of `layer`'s fed neurons within `layer_output` / `layer_sums`.
    #[inline]
    pub fn fed_neurons(&self, layer: LayerId) -> Range<usize> {
        let start = self.layer_index[layer.0];
        start..start + self.layer_feed_counts[layer.0]
    }

    /// Range of `layer`'s context neurons within `layer_output`.
    #[inline]
    pub fn context_neurons(&self, layer: LayerId) -> Range<usize> {
        let end = self.layer_index[layer.0] + self.layer_counts[layer.0];
        end - self.layer_context_count[layer.0]..end
    }

    /// Range within `weights` of the block feeding `layer` from its upstream
    /// neighbour. Empty for the input layer.
    pub fn weight_block(&self, layer: LayerId) -> Range<usize> {
        if layer.0 + 1 >= self.layer_count() {
            return 0..0;
        }
        let start = self.weight_index[layer.0];
        start..start + self.layer_feed_counts[layer.0] * self.layer_counts[layer.0 + 1]
    }

    fn weight_position(&self, layer: LayerId, to: usize, from: usize) -> Result<usize> {
        if layer.0 + 1 >= self.layer_count() {
            return Err(Error::InvalidShape(
                "the input layer has no incoming weights".to_owned(),
            ));
        }
        let feed = self.layer_feed_counts[layer.0];
        let upstream = self.layer_counts[layer.0 + 1];
        if to >= feed || from >= upstream {
            return Err(Error::InvalidShape(format!(
                "weight ({to}, {from}) out of range for layer {} with shape ({feed}, {upstream})",
                layer.0
            )));
        }
        Ok(self.weight_index[layer.0] + to * upstream + from)
    }

    /// Weight from upstream neuron `from` (0-based within layer `layer + 1`,
    /// including bias and context) to fed neuron `to` of `layer`.
    pub fn weight(&self, layer: LayerId, to: usize, from: usize) -> Result<f64> {
        Ok(self.weights[self.weight_position(layer, to, from)?])
    }

    pub fn set_weight(&mut self, layer: LayerId, to: usize, from: usize, value: f64) -> Result<()> {
        let pos = self.weight_position(layer, to, from)?;
        self.weights[pos] = value;
        Ok(())
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn layer_output(&self) -> &[f64] {
        &self.layer_output
    }

    #[inline]
    pub fn layer_sums(&self) -> &[f64] {
        &self.layer_sums
    }

    #[inline]
    pub fn layer_counts(&self) -> &[usize] {
        &self.layer_counts
    }

    #[inline]
    pub fn layer_feed_counts(&self) -> &[usize] {
        &self.layer_feed_counts
    }

    #[inline]
    pub fn layer_context_counts(&self) -> &[usize] {
        &self.layer_context_count
    }

    #[inline]
    pub fn layer_index(&self) -> &[usize] {
        &self.layer_index
    }

    #[inline]
    pub fn weight_index(&self) -> &[usize] {
        &self.weight_index
    }

    #[inline]
    pub fn context_target_offsets(&self) -> &[usize] {
        &self.context_target_offset
    }

    #[inline]
    pub fn context_target_sizes(&self) -> &[usize] {
        &self.context_target_size
    }

    #[inline]
    pub fn bias_activations(&self) -> &[f64] {
        &self.bias_activation
    }

    #[inline]
    pub fn activation_functions(&self) -> &[Activation] {
        &self.activation_functions
    }

    /// First layer index eligible for gradient updates.
    #[inline]
    pub fn begin_training(&self) -> usize {
        self.begin_training
    }

    /// One past the last level the trainer back-propagates through.
    #[inline]
    pub fn end_training(&self) -> usize {
        self.end_training
    }

    /// Reset the activation state: fed and context neurons to zero, bias
    /// neurons to their configured activation.
    pub fn clear_context(&mut self) {
        let mut index = 0;
        for i in 0..self.layer_count() {
            let feed = self.layer_feed_counts[i];
            let context = self.layer_context_count[i];
            let has_bias = feed + context != self.layer_counts[i];

            self.layer_output[index..index + feed].fill(0.0);
            index += feed;

            if has_bias {
                self.layer_output[index] = self.bias_activation[i];
                index += 1;
            }

            self.layer_output[index..index + context].fill(0.0);
            index += context;
        }
    }

    /// Set every weight to an independent uniform value in `[-1, 1)` using the
    /// thread-local RNG.
    pub fn randomize(&mut self) {
        self.randomize_with_rng(&mut rand::thread_rng());
    }

    /// Deterministic variant of [`Network::randomize`].
    pub fn randomize_with_seed(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.randomize_with_rng(&mut rng);
    }

    pub fn randomize_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let dist = Uniform::new(-1.0, 1.0);
        for w in self.weights.iter_mut() {
            *w = dist.sample(rng);
        }
        trace!(weights = self.weights.len(), "randomized weights");
    }

    /// Forward pass for a single sample. Returns the output layer's activations.
    ///
    /// Shape contract: `input.len() == self.input_count()`.
    pub fn compute(&mut self, input: &[f64]) -> Result<&[f64]> {
        if input.len() != self.input_count {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match network input_count {}",
                input.len(),
                self.input_count
            )));
        }
        self.forward(input);
        Ok(self.output())
    }

    /// Output layer activations from the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f64] {
        &self.layer_output[..self.output_count]
    }

    /// Unchecked forward pass (panics on a short input).
    pub(crate) fn forward(&mut self, input: &[f64]) {
        debug_assert_eq!(input.len(), self.input_count);

        let input_layer = self.layer_count() - 1;
        let source = self.layer_index[input_layer];
        self.layer_output[source..source + self.input_count].copy_from_slice(input);
        self.update_context(input_layer);

        for layer in (1..self.layer_count()).rev() {
            self.compute_layer(layer);
        }
    }

    /// Propagate layer `current` into its downstream neighbour `current - 1`.
    fn compute_layer(&mut self, current: usize) {
        let input_index = self.layer_index[current];
        let input_size = self.layer_counts[current];
        let output_index = self.layer_index[current - 1];
        let output_size = self.layer_feed_counts[current - 1];

        let start = self.weight_index[current - 1];
        let weights = &self.weights[start..start + output_size * input_size];

        // The downstream block always precedes the upstream one.
        let (head, tail) = self.layer_output.split_at_mut(input_index);
        let inputs = &tail[..input_size];
        let outputs = &mut head[output_index..output_index + output_size];
        let sums = &mut self.layer_sums[output_index..output_index + output_size];

        for ((out, sum_slot), row) in outputs
            .iter_mut()
            .zip(sums.iter_mut())
            .zip(weights.chunks_exact(input_size))
        {
            let mut sum = 0.0;
            for (w, x) in row.iter().zip(inputs) {
                sum = w.mul_add(*x, sum);
            }
            *sum_slot = sum;
            *out = sum;
        }

        self.activation_functions[current - 1].apply(outputs);
        self.update_context(current - 1);
    }

    /// Copy `layer`'s fed outputs into the context block it feeds, if any.
    #[inline]
    fn update_context(&mut self, layer: usize) {
        let size = self.context_target_size[layer];
        if size == 0 {
            return;
        }
        let src = self.layer_index[layer];
        self.layer_output
            .copy_within(src..src + size, self.context_target_offset[layer]);
    }

    /// Mean squared error over every (sample, output) pair of `data`.
    pub fn evaluate(&mut self, data: &Dataset) -> Result<f64> {
        self.check_dataset(data)?;

        let mut global_error = 0.0;
        let mut set_size = 0;
        for idx in 0..data.len() {
            self.forward(data.input(idx));
            global_error += loss::sum_squared_error(self.output(), data.ideal(idx));
            set_size += self.output_count;
        }
        Ok(global_error / set_size as f64)
    }

    pub(crate) fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_count {
            return Err(Error::InvalidData(format!(
                "dataset input_dim {} does not match network input_count {}",
                data.input_dim(),
                self.input_count
            )));
        }
        if data.ideal_dim() != self.output_count {
            return Err(Error::InvalidData(format!(
                "dataset ideal_dim {} does not match network output_count {}",
                data.ideal_dim(),
                self.output_count
            )));
        }
        Ok(())
    }

    /// Check every offset invariant of the flat layout.
    ///
    /// `create` always produces a consistent layout; this guards networks
    /// rebuilt from persisted fields.
    pub fn validate_layout(&self) -> Result<()> {
        let n = self.layer_counts.len();
        let bad = |msg: String| Err(Error::InvalidData(msg));

        if n < 2 {
            return bad(format!("network needs at least 2 layers, got {n}"));
        }
        for (name, len) in [
            ("layer_feed_counts", self.layer_feed_counts.len()),
            ("layer_context_count", self.layer_context_count.len()),
            ("layer_index", self.layer_index.len()),
            ("weight_index", self.weight_index.len()),
            ("context_target_offset", self.context_target_offset.len()),
            ("context_target_size", self.context_target_size.len()),
            ("bias_activation", self.bias_activation.len()),
            ("activation_functions", self.activation_functions.len()),
        ] {
            if len != n {
                return bad(format!("{name} has {len} entries, expected {n}"));
            }
        }

        let mut neurons = 0;
        let mut weights = 0;
        for i in 0..n {
            let bias = usize::from(self.bias_activation[i].abs() > PRECISION);
            let expected = self.layer_feed_counts[i] + bias + self.layer_context_count[i];
            if self.layer_feed_counts[i] == 0 || self.layer_counts[i] != expected {
                return bad(format!(
                    "layer {i} count {} does not match feed {} + bias {bias} + context {}",
                    self.layer_counts[i], self.layer_feed_counts[i], self.layer_context_count[i]
                ));
            }
            self.activation_functions[i]
                .validate()
                .map_err(|e| Error::InvalidData(format!("layer {i}: {e}")))?;

            let (layer_index, weight_index) = if i == 0 {
                (0, 0)
            } else {
                (
                    self.layer_index[i - 1] + self.layer_counts[i - 1],
                    self.weight_index[i - 1] + self.layer_counts[i] * self.layer_feed_counts[i - 1],
                )
            };
            if self.layer_index[i] != layer_index || self.weight_index[i] != weight_index {
                return bad(format!("layer {i} offsets are inconsistent"));
            }

            neurons += self.layer_counts[i];
            if i + 1 < n {
                weights += self.layer_feed_counts[i] * self.layer_counts[i + 1];
            }
        }

        if self.input_count != self.layer_feed_counts[n - 1]
            || self.output_count != self.layer_feed_counts[0]
        {
            return bad("input/output counts do not match the layer feed counts".to_owned());
        }
        if self.weights.len() != weights {
            return bad(format!(
                "weights length {} does not match expected {weights}",
                self.weights.len()
            ));
        }
        if self.layer_output.len() != neurons || self.layer_sums.len() != neurons {
            return bad(format!(
                "layer_output/layer_sums lengths {}/{} do not match neuron count {neurons}",
                self.layer_output.len(),
                self.layer_sums.len()
            ));
        }
        for i in 0..n {
            let size = self.context_target_size[i];
            let end = self.context_target_offset[i] + size;
            if size != 0 && (size > self.layer_feed_counts[i] || end > neurons) {
                return bad(format!("layer {i} context target is out of range"));
            }
        }
        if self.begin_training > self.end_training || self.end_training >= n {
            return bad(format!(
                "training range {}..{} is invalid for {n} layers",
                self.begin_training, self.end_training
            ));
        }
        if self.weights.iter().any(|w| !w.is_finite()) {
            return bad("weights must contain only finite values".to_owned());
        }
        Ok(())
    }
}
