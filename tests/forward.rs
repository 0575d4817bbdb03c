use approx::assert_abs_diff_eq;

use rust_flatnet::loss::mean_squared_error;
use rust_flatnet::{Activation, Dataset, Error, LayerId, LayerSpec, Network, NetworkBuilder};

fn two_layer(act: Activation, w: f64) -> Network {
    let mut net = NetworkBuilder::new(1, 0.0)
        .unwrap()
        .add_layer(act, 1, 0.0)
        .unwrap()
        .build()
        .unwrap();
    net.set_weight(LayerId::OUTPUT, 0, 0, w).unwrap();
    net
}

/// 1 input with context, 2 linear hidden neurons feeding that context, 1 linear output.
/// Hidden neuron 0 adds the input to its own previous value.
fn running_sum() -> Network {
    let mut net = NetworkBuilder::new(1, 0.0)
        .unwrap()
        .add_layer(Activation::Linear, 2, 0.0)
        .unwrap()
        .add_layer(Activation::Linear, 1, 0.0)
        .unwrap()
        .feed_context(1, 0)
        .unwrap()
        .build()
        .unwrap();
    let hidden = net.layer(1).unwrap();
    net.set_weight(hidden, 0, 0, 1.0).unwrap();
    net.set_weight(hidden, 0, 1, 1.0).unwrap();
    net.set_weight(LayerId::OUTPUT, 0, 0, 1.0).unwrap();
    net
}

#[test]
fn linear_single_weight_scales_input() {
    let mut net = two_layer(Activation::Linear, 2.0);
    assert_eq!(net.compute(&[3.0]).unwrap(), &[6.0]);
    assert_eq!(net.layer_sums()[0], 6.0);
}

#[test]
fn sigmoid_with_zero_weight_is_one_half() {
    let mut net = two_layer(Activation::Sigmoid, 0.0);
    assert_abs_diff_eq!(net.compute(&[123.0]).unwrap()[0], 0.5);
}

#[test]
fn bias_neuron_contributes_its_activation() {
    let mut net = NetworkBuilder::new(1, 0.5)
        .unwrap()
        .add_layer(Activation::Linear, 1, 0.0)
        .unwrap()
        .build()
        .unwrap();
    net.set_weight(LayerId::OUTPUT, 0, 0, 1.0).unwrap();
    net.set_weight(LayerId::OUTPUT, 0, 1, 4.0).unwrap();
    assert_abs_diff_eq!(net.compute(&[1.0]).unwrap()[0], 3.0);
}

#[test]
fn compute_is_deterministic_without_context() {
    let mut net = NetworkBuilder::from_sizes(&[3, 5, 4, 2], Activation::Tanh)
        .unwrap()
        .build_with_seed(11)
        .unwrap();
    let x = [0.3, -0.7, 0.1];
    let a = net.compute(&x).unwrap().to_vec();
    let b = net.compute(&x).unwrap().to_vec();
    assert_eq!(a, b);
    assert_eq!(a.len(), net.output_count());
    assert!(a.iter().all(|v| v.abs() < 1.0));
}

#[test]
fn compute_rejects_wrong_input_length() {
    let mut net = NetworkBuilder::from_sizes(&[3, 2], Activation::Sigmoid)
        .unwrap()
        .build()
        .unwrap();
    assert!(matches!(net.compute(&[1.0, 2.0]), Err(Error::InvalidShape(_))));
    assert!(matches!(
        net.compute(&[1.0, 2.0, 3.0, 4.0]),
        Err(Error::InvalidShape(_))
    ));
}

#[test]
fn softmax_output_sums_to_one() {
    let mut net = NetworkBuilder::new(2, 1.0)
        .unwrap()
        .add_layer(Activation::Softmax, 3, 0.0)
        .unwrap()
        .build_with_seed(5)
        .unwrap();
    let y = net.compute(&[0.2, 0.9]).unwrap();
    assert_abs_diff_eq!(y.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
}

#[test]
fn layout_matches_offset_recurrences() {
    let net = NetworkBuilder::new(1, 1.0)
        .unwrap()
        .add_layer(Activation::Tanh, 4, 1.0)
        .unwrap()
        .add_layer(Activation::Linear, 2, 0.0)
        .unwrap()
        .feed_context(1, 0)
        .unwrap()
        .build()
        .unwrap();

    let counts = net.layer_counts();
    let feeds = net.layer_feed_counts();
    assert_eq!(counts, &[2, 5, 6]);
    assert_eq!(net.layer_context_counts(), &[0, 0, 4]);
    for i in 1..counts.len() {
        assert_eq!(net.layer_index()[i], net.layer_index()[i - 1] + counts[i - 1]);
        assert_eq!(
            net.weight_index()[i],
            net.weight_index()[i - 1] + counts[i] * feeds[i - 1]
        );
    }
    assert_eq!(net.weights().len(), 2 * 5 + 4 * 6);
    assert_eq!(net.layer_output().len(), counts.iter().sum::<usize>());
    assert_eq!(net.layers().count(), 3);
    for layer in net.layers() {
        let block = net.neurons(layer);
        assert_eq!(block.len(), counts[layer.index()]);
        assert_eq!(block.start, net.fed_neurons(layer).start);
    }

    // The hidden layer (array index 1) feeds the input layer's context block.
    let input = net.input_layer();
    assert_eq!(net.context_target_sizes()[1], 4);
    assert_eq!(
        net.context_target_offsets()[1],
        net.context_neurons(input).start
    );
    assert_eq!(net.begin_training(), 0);
    assert_eq!(net.end_training(), 2);
    net.validate_layout().unwrap();
}

#[test]
fn context_carries_state_between_computes() {
    let mut net = running_sum();
    assert_eq!(net.compute(&[1.0]).unwrap(), &[1.0]);
    assert_eq!(net.compute(&[2.0]).unwrap(), &[3.0]);
    assert_eq!(net.compute(&[3.0]).unwrap(), &[6.0]);

    let ctx = net.context_neurons(net.input_layer());
    assert_eq!(&net.layer_output()[ctx], &[6.0, 0.0]);
}

#[test]
fn context_mirrors_post_activation_output() {
    let mut net = NetworkBuilder::new(1, 1.0)
        .unwrap()
        .add_layer(Activation::Sigmoid, 2, 1.0)
        .unwrap()
        .add_layer(Activation::Linear, 1, 0.0)
        .unwrap()
        .feed_context(1, 0)
        .unwrap()
        .build_with_seed(5)
        .unwrap();
    net.clear_context();
    net.compute(&[0.7]).unwrap();

    let hidden = net.layer(1).unwrap();
    let fed = net.fed_neurons(hidden);
    let ctx = net.context_neurons(net.input_layer());
    let outputs = &net.layer_output()[fed.clone()];
    let sums = &net.layer_sums()[fed];

    assert_eq!(&net.layer_output()[ctx], outputs);
    assert_ne!(outputs, sums);
    for (&out, &sum) in outputs.iter().zip(sums) {
        assert_abs_diff_eq!(out, 1.0 / (1.0 + (-sum).exp()), epsilon = 1e-12);
    }
}

#[test]
fn clear_context_resets_recurrent_state() {
    let mut net = running_sum();
    net.compute(&[1.0]).unwrap();
    net.compute(&[2.0]).unwrap();
    net.clear_context();
    assert_eq!(net.compute(&[1.0]).unwrap(), &[1.0]);
}

#[test]
fn layer_feeding_two_context_blocks_is_rejected() {
    let a = LayerSpec::new(Activation::Linear, 1, 0.0)
        .unwrap()
        .with_context_from(1);
    let b = LayerSpec::new(Activation::Linear, 1, 0.0)
        .unwrap()
        .with_context_from(1);
    assert!(matches!(
        Network::create(&[a, b]),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn evaluate_matches_hand_computed_mse() {
    let mut net = two_layer(Activation::Linear, 2.0);
    let data = Dataset::from_rows(&[vec![1.0], vec![2.0]], &[vec![1.0], vec![5.0]]).unwrap();
    // Outputs 2 and 4: ((2-1)^2 + (4-5)^2) / 2.
    assert_abs_diff_eq!(net.evaluate(&data).unwrap(), 1.0);

    let single = Dataset::from_rows(&[vec![2.0]], &[vec![3.5]]).unwrap();
    let y = net.compute(&[2.0]).unwrap().to_vec();
    assert_abs_diff_eq!(
        net.evaluate(&single).unwrap(),
        mean_squared_error(&y, &[3.5])
    );

    let wide = Dataset::from_rows(&[vec![1.0, 2.0]], &[vec![0.0]]).unwrap();
    assert!(matches!(net.evaluate(&wide), Err(Error::InvalidData(_))));
}
