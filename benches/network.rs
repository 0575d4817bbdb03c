use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rust_flatnet::{
    Activation, Dataset, ErrorFunction, NetworkBuilder, PropagationTrainer, TrainingMethod,
};

fn compute_bench(c: &mut Criterion) {
    let mut net = NetworkBuilder::from_sizes(&[128, 256, 256, 10], Activation::Tanh)
        .unwrap()
        .build_with_seed(0)
        .unwrap();
    let input = vec![0.1; net.input_count()];

    c.bench_function("compute_128_256_256_10", |b| {
        b.iter(|| {
            let out = net.compute(black_box(&input)).unwrap();
            black_box(out);
        })
    });
}

fn elman_compute_bench(c: &mut Criterion) {
    let mut net = NetworkBuilder::new(16, 1.0)
        .unwrap()
        .add_layer(Activation::Tanh, 64, 1.0)
        .unwrap()
        .add_layer(Activation::Linear, 4, 0.0)
        .unwrap()
        .feed_context(1, 0)
        .unwrap()
        .build_with_seed(0)
        .unwrap();
    let input = vec![0.1; net.input_count()];

    c.bench_function("compute_elman_16_64_4", |b| {
        b.iter(|| {
            let out = net.compute(black_box(&input)).unwrap();
            black_box(out);
        })
    });
}

fn iteration_bench(c: &mut Criterion) {
    let len = 256;
    let data = Dataset::from_flat(vec![0.1; len * 32], vec![0.0; len * 4], 32, 4).unwrap();

    for (name, method) in [
        ("iteration_rprop_32_64_4_x256", TrainingMethod::Rprop),
        (
            "iteration_bprop_32_64_4_x256",
            TrainingMethod::Backprop {
                learning_rate: 1e-3,
                momentum: 0.9,
            },
        ),
    ] {
        let mut net = NetworkBuilder::from_sizes(&[32, 64, 4], Activation::Sigmoid)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        let mut trainer =
            PropagationTrainer::create(&mut net, ErrorFunction::Linear, &data, method).unwrap();

        c.bench_function(name, |b| {
            b.iter(|| black_box(trainer.iteration()));
        });
    }
}

criterion_group!(benches, compute_bench, elman_compute_bench, iteration_bench);
criterion_main!(benches);
