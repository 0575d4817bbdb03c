//! Flat-array neural networks.
//!
//! `rust-flatnet` stores a whole network (topology, weights and live neuron
//! state) in a handful of dense vectors instead of per-neuron objects. Layers
//! may carry a bias neuron and context neurons, which receive a copy of
//! another layer's output after every forward pass and so give Elman/Jordan
//! style recurrence without any extra machinery.
//!
//! Training is full-batch: [`PropagationTrainer::iteration`] runs one epoch
//! (forward and backward over every sample) and then applies one weight
//! update, either classic back-propagation with momentum or RPROP.
//!
//! # Panics vs `Result`
//!
//! Public entry points validate shapes and return [`Result`]. The per-layer
//! kernels and the update rules in [`optim`] only `debug_assert!` their
//! slice lengths; the trainer sizes every buffer from the network it is bound
//! to.
//!
//! # Data layout
//!
//! - Scalars are `f64`.
//! - Layers are stored output first: array index 0 is the output layer.
//! - [`Dataset`] stores samples contiguously in row-major layout.
//!
//! See [`network`] for the exact offset formulas.
//!
//! # Quick start
//!
//! ```rust
//! use rust_flatnet::{
//!     Activation, Dataset, ErrorFunction, NetworkBuilder, PropagationTrainer, TrainConfig,
//!     TrainingMethod,
//! };
//!
//! # fn main() -> rust_flatnet::Result<()> {
//! let xs = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ];
//! let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! let train = Dataset::from_rows(&xs, &ys)?;
//!
//! let mut net = NetworkBuilder::new(2, 1.0)?
//!     .add_layer(Activation::Sigmoid, 3, 1.0)?
//!     .add_layer(Activation::Sigmoid, 1, 0.0)?
//!     .build_with_seed(0)?;
//!
//! let mut trainer = PropagationTrainer::create(
//!     &mut net,
//!     ErrorFunction::Linear,
//!     &train,
//!     TrainingMethod::Rprop,
//! )?;
//! let report = trainer.train(&TrainConfig {
//!     max_epochs: 200,
//!     target_error: Some(0.01),
//!     ..TrainConfig::default()
//! })?;
//! assert!(report.epochs <= 200);
//!
//! let y = net.compute(&[1.0, 0.0])?;
//! assert_eq!(y.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Driving epochs yourself
//!
//! ```rust
//! use rust_flatnet::{Dataset, ErrorFunction, NetworkBuilder, PropagationTrainer, TrainingMethod};
//! use rust_flatnet::Activation;
//!
//! # fn main() -> rust_flatnet::Result<()> {
//! let data = Dataset::from_flat(vec![0.0, 1.0], vec![1.0, -1.0], 1, 1)?;
//! let mut net = NetworkBuilder::from_sizes(&[1, 4, 1], Activation::Tanh)?.build_with_seed(1)?;
//! let method = TrainingMethod::Backprop {
//!     learning_rate: 0.1,
//!     momentum: 0.5,
//! };
//! let mut trainer = PropagationTrainer::create(&mut net, ErrorFunction::Linear, &data, method)?;
//! for _ in 0..10 {
//!     let mse = trainer.iteration();
//!     assert!(mse.is_finite());
//! }
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub(crate) mod math;
pub mod network;
pub mod optim;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::Activation;
pub use builder::NetworkBuilder;
pub use config::TrainConfig;
pub use data::Dataset;
pub use error::{Error, Result};
pub use layer::LayerSpec;
pub use loss::ErrorFunction;
pub use network::{LayerId, Network};
pub use optim::TrainingMethod;
pub use train::{PropagationTrainer, TrainReport};
