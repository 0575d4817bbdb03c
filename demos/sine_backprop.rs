use std::f64::consts::PI;

use rust_flatnet::{
    Activation, Dataset, ErrorFunction, NetworkBuilder, PropagationTrainer, TrainConfig,
    TrainingMethod,
};
use tracing_subscriber::EnvFilter;

fn main() -> rust_flatnet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // y = sin(x) on [-pi, pi], inputs scaled to [-1, 1].
    let n = 32;
    let xs: Vec<Vec<f64>> = (0..n)
        .map(|i| vec![-1.0 + 2.0 * i as f64 / (n - 1) as f64])
        .collect();
    let ys: Vec<Vec<f64>> = xs.iter().map(|x| vec![(x[0] * PI).sin()]).collect();
    let train = Dataset::from_rows(&xs, &ys)?;

    let mut net = NetworkBuilder::new(1, 1.0)?
        .add_layer(Activation::elliott_symmetric(), 10, 1.0)?
        .add_layer(Activation::Linear, 1, 0.0)?
        .build_with_seed(1)?;

    let method = TrainingMethod::Backprop {
        learning_rate: 0.005,
        momentum: 0.8,
    };
    let mut trainer = PropagationTrainer::create(&mut net, ErrorFunction::Linear, &train, method)?;
    let report = trainer.train(&TrainConfig {
        method,
        max_epochs: 10_000,
        target_error: Some(1e-3),
        seed: None,
    })?;
    println!(
        "epochs={} final_error={:.6} reached_target={}",
        report.epochs, report.final_error, report.reached_target
    );

    let mse = net.evaluate(&train)?;
    println!("train_mse={mse:.6}");
    for x in [-0.5, 0.0, 0.25, 0.5] {
        let y = net.compute(&[x])?[0];
        println!("sin({:+.3}) ~ {y:+.4} (exact {:+.4})", x * PI, (x * PI).sin());
    }
    Ok(())
}
