use rust_flatnet::{
    Activation, Dataset, ErrorFunction, NetworkBuilder, PropagationTrainer, TrainConfig,
    TrainingMethod,
};
use tracing_subscriber::EnvFilter;

fn main() -> rust_flatnet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Classic XOR dataset.
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    // 2 -> 3 -> 1, sigmoid everywhere, bias on input and hidden.
    let mut net = NetworkBuilder::new(2, 1.0)?
        .add_layer(Activation::Sigmoid, 3, 1.0)?
        .add_layer(Activation::Sigmoid, 1, 0.0)?
        .build_with_seed(0)?;

    let mut trainer =
        PropagationTrainer::create(&mut net, ErrorFunction::Linear, &train, TrainingMethod::Rprop)?;
    let report = trainer.train(&TrainConfig {
        max_epochs: 5_000,
        target_error: Some(0.01),
        ..TrainConfig::default()
    })?;
    println!(
        "epochs={} final_error={:.6} reached_target={}",
        report.epochs, report.final_error, report.reached_target
    );

    for x in &xs {
        let y = net.compute(x)?;
        println!("x={x:?} y={:.4}", y[0]);
    }
    Ok(())
}
