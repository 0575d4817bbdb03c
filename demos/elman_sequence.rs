//! Elman network predicting the next value of a repeating sequence.
//!
//! The hidden layer's output is copied into context neurons on the input
//! layer after every `compute`, so the network sees its own previous state.

use rust_flatnet::{
    Activation, Dataset, ErrorFunction, NetworkBuilder, PropagationTrainer, TrainConfig,
    TrainingMethod,
};
use tracing_subscriber::EnvFilter;

fn main() -> rust_flatnet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pattern = [0.1, 0.5, 0.9, 0.5];
    let seq: Vec<f64> = pattern.iter().cycle().take(40).copied().collect();
    let xs: Vec<Vec<f64>> = seq[..seq.len() - 1].iter().map(|&v| vec![v]).collect();
    let ys: Vec<Vec<f64>> = seq[1..].iter().map(|&v| vec![v]).collect();
    let train = Dataset::from_rows(&xs, &ys)?;

    let mut net = NetworkBuilder::new(1, 1.0)?
        .add_layer(Activation::Tanh, 6, 1.0)?
        .add_layer(Activation::Sigmoid, 1, 0.0)?
        .feed_context(1, 0)?
        .build_with_seed(3)?;

    let mut trainer =
        PropagationTrainer::create(&mut net, ErrorFunction::Linear, &train, TrainingMethod::Rprop)?;
    let report = trainer.train(&TrainConfig {
        max_epochs: 2_000,
        target_error: Some(0.001),
        ..TrainConfig::default()
    })?;
    println!("epochs={} final_error={:.6}", report.epochs, report.final_error);

    net.clear_context();
    for (x, t) in xs.iter().zip(&ys).take(8) {
        let y = net.compute(x)?;
        println!("in={:.1} expected={:.1} predicted={:.3}", x[0], t[0], y[0]);
    }
    Ok(())
}
