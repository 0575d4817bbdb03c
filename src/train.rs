//! Full-batch propagation training.
//!
//! One [`PropagationTrainer::iteration`] is one epoch:
//!
//! 1. reset the gradient accumulators and the error statistics
//! 2. for every training pair: forward pass, accumulate squared error, seed
//!    the output delta from the error function, back-propagate through every
//!    level while adding `output * delta` into the per-weight gradients
//! 3. apply the selected update rule once ([`TrainingMethod`])
//! 4. report the epoch's mean squared error
//!
//! Scratch buffers are sized once in [`PropagationTrainer::create`]; an epoch
//! does not allocate.

use tracing::{debug, info};

use crate::optim::{self, DEFAULT_INITIAL_UPDATE};
use crate::{Dataset, Error, ErrorFunction, Network, Result, TrainConfig, TrainingMethod, loss};

/// Summary of a [`PropagationTrainer::train`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs: usize,
    pub final_error: f64,
    /// Whether the run stopped because `target_error` was reached.
    pub reached_target: bool,
    /// Error reported by each epoch, in order.
    pub history: Vec<f64>,
}

/// Trains a borrowed [`Network`] on a borrowed [`Dataset`].
#[derive(Debug)]
pub struct PropagationTrainer<'a> {
    network: &'a mut Network,
    data: &'a Dataset,
    error_function: ErrorFunction,
    method: TrainingMethod,

    layer_delta: Vec<f64>,
    gradients: Vec<f64>,
    last_gradient: Vec<f64>,
    last_delta: Vec<f64>,
    update_values: Vec<f64>,
    // Additive derivative offset per layer; always zero today.
    flat_spot: Vec<f64>,

    error: f64,
    global_error: f64,
    set_size: usize,
    iterations: usize,
}

impl<'a> PropagationTrainer<'a> {
    /// Bind a trainer to `network` and `data`.
    ///
    /// Fails if the dataset is empty or its shapes do not match the network's
    /// input/output counts, or if the method's hyperparameters are invalid.
    pub fn create(
        network: &'a mut Network,
        error_function: ErrorFunction,
        data: &'a Dataset,
        method: TrainingMethod,
    ) -> Result<Self> {
        method.validate()?;
        network.check_dataset(data)?;

        let neurons = network.layer_output.len();
        let weights = network.weights.len();
        Ok(Self {
            network,
            data,
            error_function,
            method,
            layer_delta: vec![0.0; neurons],
            gradients: vec![0.0; weights],
            last_gradient: vec![0.0; weights],
            last_delta: vec![0.0; weights],
            update_values: vec![DEFAULT_INITIAL_UPDATE; weights],
            flat_spot: vec![0.0; neurons],
            error: 0.0,
            global_error: 0.0,
            set_size: 0,
            iterations: 0,
        })
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &*self.network
    }

    #[inline]
    pub fn network_mut(&mut self) -> &mut Network {
        &mut *self.network
    }

    #[inline]
    pub fn method(&self) -> TrainingMethod {
        self.method
    }

    /// Mean squared error of the most recent epoch (measured before its update).
    #[inline]
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Number of completed epochs.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Gradients accumulated since the start of the current epoch.
    #[inline]
    pub fn gradients(&self) -> &[f64] {
        &self.gradients
    }

    /// Per-weight RPROP step sizes.
    #[inline]
    pub fn update_values(&self) -> &[f64] {
        &self.update_values
    }

    /// Weight change applied by the most recent update.
    #[inline]
    pub fn last_delta(&self) -> &[f64] {
        &self.last_delta
    }

    #[inline]
    pub fn layer_delta(&self) -> &[f64] {
        &self.layer_delta
    }

    /// Run one full-batch epoch and return its mean squared error.
    pub fn iteration(&mut self) -> f64 {
        self.global_error = 0.0;
        self.set_size = 0;
        self.gradients.fill(0.0);

        let data = self.data;
        for idx in 0..data.len() {
            self.process_sample(data.input(idx), data.ideal(idx), 1.0);
        }

        self.learn();

        self.error = self.global_error / self.set_size as f64;
        self.iterations += 1;
        self.error
    }

    /// Forward and backward pass for one pair, accumulating into the current
    /// epoch's gradients and error statistics. `scale` multiplies the output
    /// delta.
    pub fn process(&mut self, input: &[f64], ideal: &[f64], scale: f64) -> Result<()> {
        if input.len() != self.network.input_count {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match network input_count {}",
                input.len(),
                self.network.input_count
            )));
        }
        if ideal.len() != self.network.output_count {
            return Err(Error::InvalidShape(format!(
                "ideal len {} does not match network output_count {}",
                ideal.len(),
                self.network.output_count
            )));
        }
        self.process_sample(input, ideal, scale);
        Ok(())
    }

    /// Train until `cfg.max_epochs` or until an epoch's error reaches
    /// `cfg.target_error`.
    pub fn train(&mut self, cfg: &TrainConfig) -> Result<TrainReport> {
        cfg.validate()?;
        if cfg.method != self.method {
            return Err(Error::InvalidConfig(format!(
                "config method {} does not match trainer method {}",
                cfg.method.name(),
                self.method.name()
            )));
        }
        if let Some(seed) = cfg.seed {
            self.network.randomize_with_seed(seed);
        }

        let mut history = Vec::with_capacity(cfg.max_epochs);
        let mut reached_target = false;
        for epoch in 1..=cfg.max_epochs {
            let error = self.iteration();
            history.push(error);
            debug!(epoch, error, "epoch finished");

            if cfg.target_error.is_some_and(|target| error <= target) {
                reached_target = true;
                break;
            }
        }

        let report = TrainReport {
            epochs: history.len(),
            final_error: self.error,
            reached_target,
            history,
        };
        info!(
            method = self.method.name(),
            epochs = report.epochs,
            final_error = report.final_error,
            reached_target = report.reached_target,
            "training finished"
        );
        Ok(report)
    }

    fn process_sample(&mut self, input: &[f64], ideal: &[f64], scale: f64) {
        self.network.forward(input);

        let net = &*self.network;
        let actual = net.output();
        self.global_error += loss::sum_squared_error(actual, ideal);
        self.set_size += actual.len();

        self.error_function
            .calculate_error(ideal, actual, &mut self.layer_delta);

        let activation = net.activation_functions[0];
        for i in 0..actual.len() {
            let derivative = activation.derivative(net.layer_sums[i], net.layer_output[i]);
            self.layer_delta[i] *= (derivative + self.flat_spot[0]) * scale;
        }

        for level in net.begin_training..net.end_training {
            self.process_level(level);
        }
    }

    /// Back-propagate the deltas of layer `level` into layer `level + 1`,
    /// accumulating the gradients of the weights between them.
    fn process_level(&mut self, level: usize) {
        let net = &*self.network;

        let from_index = net.layer_index[level + 1];
        let to_index = net.layer_index[level];
        let from_size = net.layer_counts[level + 1];
        let to_size = net.layer_feed_counts[level];

        let index = net.weight_index[level];
        let activation = net.activation_functions[level + 1];
        let flat_spot = self.flat_spot[level + 1];

        for y in 0..from_size {
            let yi = from_index + y;
            let output = net.layer_output[yi];
            let mut sum = 0.0;

            let mut wi = index + y;
            for xi in to_index..to_index + to_size {
                let delta = self.layer_delta[xi];
                self.gradients[wi] += output * delta;
                sum += net.weights[wi] * delta;
                wi += from_size;
            }

            let derivative = activation.derivative(net.layer_sums[yi], output);
            self.layer_delta[yi] = sum * (derivative + flat_spot);
        }
    }

    fn learn(&mut self) {
        match self.method {
            TrainingMethod::Backprop {
                learning_rate,
                momentum,
            } => optim::learn_bprop(
                &mut self.network.weights,
                &self.gradients,
                &mut self.last_delta,
                learning_rate,
                momentum,
            ),
            TrainingMethod::Rprop => optim::learn_rprop(
                &mut self.network.weights,
                &self.gradients,
                &mut self.last_gradient,
                &mut self.last_delta,
                &mut self.update_values,
            ),
        }
    }
}
