use rust_flatnet::{
    Activation, Dataset, ErrorFunction, Network, NetworkBuilder, PropagationTrainer, TrainConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> rust_flatnet::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = TrainConfig::from_json_str(
        r#"{"method":{"kind":"rprop"},"max_epochs":2000,"target_error":0.01,"seed":0}"#,
    )?;

    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    let mut net = NetworkBuilder::new(2, 1.0)?
        .add_layer(Activation::Sigmoid, 4, 1.0)?
        .add_layer(Activation::Sigmoid, 1, 0.0)?
        .build()?;
    PropagationTrainer::create(&mut net, ErrorFunction::Linear, &train, cfg.method)?.train(&cfg)?;

    std::fs::create_dir_all("target")
        .map_err(|e| rust_flatnet::Error::InvalidData(format!("failed to create target/: {e}")))?;
    let path = "target/tmp_network.json";
    net.save_json(path)?;

    let mut loaded = Network::load_json(path)?;
    println!(
        "saved and loaded network: {path} (mse before={:.6} after={:.6})",
        net.evaluate(&train)?,
        loaded.evaluate(&train)?
    );
    Ok(())
}
