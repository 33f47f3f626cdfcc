//! Integration tests for the multi-task network: construction shapes,
//! normalization invariants, forward-pass ranges, and training
//! behavior over the bundled dataset.

use mtnnet::multitask::{
    denormalize_score, normalize_features, normalize_score, reference_dataset,
    InvalidDimensionError, InvalidHyperparameterError, Net, TrainError, TrainingExample,
    DEFAULT_LEARNING_RATE,
};

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[test]
fn construction_reports_configured_sizes() {
    let net = Net::new(4, 10, 1, 1, Some(42)).unwrap();
    assert_eq!(net.input_size(), 4);
    assert_eq!(net.hidden_size(), 10);
    assert_eq!(net.regression_size(), 1);
    assert_eq!(net.classification_size(), 1);
    assert_eq!(Net::coefficients_len(4, 10, 1, 1), 72);
    assert_eq!(net.export().len(), 72);
}

#[test]
fn construction_rejects_zero_sizes() {
    assert!(Net::new(4, 0, 1, 1, Some(1)).is_err());
    assert!(Net::new(4, 10, 0, 1, Some(1)).is_err());
    assert!(Net::new(4, 10, 1, 0, Some(1)).is_err());
    match Net::new(0, 10, 1, 1, Some(1)) {
        Err(InvalidDimensionError::EmptyLayer(layer)) => assert_eq!(layer, "input"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("zero input size must be rejected"),
    }
}

#[test]
fn initialization_stays_inside_half_open_interval() {
    let net = Net::new(4, 10, 1, 1, Some(5)).unwrap();
    for &v in net.export().iter() {
        assert!(v >= -1.0 && v < 1.0);
    }
}

#[test]
fn normalization_matches_reference_row() {
    let normalized = normalize_features(&[7.0, 8.0, 95.0, 4.5]).unwrap();
    assert!(close(normalized[0], 0.5833, 1e-4));
    assert!(close(normalized[1], 0.8889, 1e-4));
    assert!(close(normalized[2], 0.95, 1e-4));
    assert!(close(normalized[3], 0.875, 1e-4));
    assert!(close(normalize_score(4.7), 0.925, 1e-9));

    let dataset = reference_dataset();
    assert_eq!(dataset.len(), 25);
    assert_eq!(dataset[0].features(), [7.0, 8.0, 95.0, 4.5]);
    assert_eq!(dataset[0].pass_label(), 1.0);
    assert_eq!(dataset.iter().filter(|example| !example.passed).count(), 5);
}

#[test]
fn score_normalization_round_trips() {
    assert!(close(denormalize_score(normalize_score(1.0)), 1.0, 1e-9));
    assert!(close(denormalize_score(normalize_score(5.0)), 5.0, 1e-9));
    let mut score = 1.0;
    while score <= 5.0 {
        assert!(close(denormalize_score(normalize_score(score)), score, 1e-9));
        score += 0.1;
    }
}

#[test]
fn forward_outputs_stay_inside_unit_interval() {
    let net = Net::new(4, 10, 1, 1, Some(7)).unwrap();
    let mut hidden = [0.0; 10];
    let mut regression = [0.0; 1];
    let mut classification = [0.0; 1];
    for example in reference_dataset() {
        let inputs = normalize_features(&example.features()).unwrap();
        net.forward(&inputs, &mut hidden, &mut regression, &mut classification)
            .unwrap();
        for &v in hidden
            .iter()
            .chain(regression.iter())
            .chain(classification.iter())
        {
            assert!(v > 0.0 && v < 1.0);
        }
    }
}

#[test]
fn forward_matches_hand_computed_activations() {
    // layout: [weights_ih] bias_h [weights_hr] bias_r [weights_hc] bias_c
    let coefficients = [0.5, -0.25, 0.1, 0.8, -0.3, 1.5, 0.2];
    let net = Net::with_coefficients(2, 1, 1, 1, &coefficients).unwrap();

    let mut hidden = [0.0; 1];
    let mut regression = [0.0; 1];
    let mut classification = [0.0; 1];
    net.forward(&[0.4, 0.6], &mut hidden, &mut regression, &mut classification)
        .unwrap();

    let h = sigmoid(0.4 * 0.5 + 0.6 * (-0.25) + 0.1);
    assert!(close(hidden[0], h, 1e-12));
    assert!(close(regression[0], sigmoid(h * 0.8 - 0.3), 1e-12));
    assert!(close(classification[0], sigmoid(h * 1.5 + 0.2), 1e-12));
}

#[test]
fn forward_rejects_mismatched_widths() {
    let net = Net::new(4, 10, 1, 1, Some(2)).unwrap();
    let mut hidden = [0.0; 10];
    let mut regression = [0.0; 1];
    let mut classification = [0.0; 1];
    assert!(net
        .forward(&[0.1; 3], &mut hidden, &mut regression, &mut classification)
        .is_err());
    assert!(net
        .forward(&[0.1; 4], &mut hidden[..5], &mut regression, &mut classification)
        .is_err());
}

#[test]
fn predict_clamps_saturated_scores() {
    // All weights zero except a huge regression-head bias: the head
    // sigmoid saturates to exactly 1.0 (or 0.0) in f64, so the raw
    // score hits the boundary and must come back clamped.
    let total = Net::coefficients_len(4, 2, 1, 1);
    let bias_r_index = 4 * 2 + 2 + 2;

    let mut coefficients = vec![0.0; total];
    coefficients[bias_r_index] = 1000.0;
    let net = Net::with_coefficients(4, 2, 1, 1, &coefficients).unwrap();
    let prediction = net.predict(&[7.0, 8.0, 95.0, 4.5]).unwrap();
    assert!(close(prediction.score, 5.0, 1e-12));

    let mut coefficients = vec![0.0; total];
    coefficients[bias_r_index] = -1000.0;
    let net = Net::with_coefficients(4, 2, 1, 1, &coefficients).unwrap();
    let prediction = net.predict(&[7.0, 8.0, 95.0, 4.5]).unwrap();
    assert!(close(prediction.score, 1.0, 1e-12));
}

#[test]
fn predict_rejects_wrong_feature_count() {
    let net = Net::new(4, 10, 1, 1, Some(3)).unwrap();
    assert!(net.predict(&[1.0, 2.0, 3.0]).is_err());
    assert!(net.predict(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_err());
}

#[test]
fn seeded_runs_are_reproducible() {
    let dataset = reference_dataset();

    let a = Net::new(4, 10, 1, 1, Some(42)).unwrap();
    let b = Net::new(4, 10, 1, 1, Some(42)).unwrap();
    assert_eq!(a.export(), b.export());
    let c = Net::new(4, 10, 1, 1, Some(43)).unwrap();
    assert_ne!(a.export(), c.export());

    let mut a = a.build_trainer();
    let mut b = b.build_trainer();
    a.train(&dataset, 200, DEFAULT_LEARNING_RATE).unwrap();
    b.train(&dataset, 200, DEFAULT_LEARNING_RATE).unwrap();
    assert_eq!(a.teardown().export(), b.teardown().export());
}

#[test]
fn online_updates_are_order_dependent() {
    let dataset = reference_dataset();
    let mut reversed: Vec<TrainingExample> = dataset.clone();
    reversed.reverse();

    let mut a = Net::new(4, 10, 1, 1, Some(42)).unwrap().build_trainer();
    let mut b = Net::new(4, 10, 1, 1, Some(42)).unwrap().build_trainer();
    a.train(&dataset, 10, DEFAULT_LEARNING_RATE).unwrap();
    b.train(&reversed, 10, DEFAULT_LEARNING_RATE).unwrap();
    assert_ne!(a.teardown().export(), b.teardown().export());
}

#[test]
fn training_reduces_mean_squared_error() {
    let dataset = reference_dataset();
    let mut trainer = Net::new(4, 10, 1, 1, Some(42)).unwrap().build_trainer();

    let initial = trainer.mean_squared_error(&dataset).unwrap();
    let mut checkpoints = vec![initial];
    for _ in 0..8 {
        trainer.train(&dataset, 1000, DEFAULT_LEARNING_RATE).unwrap();
        checkpoints.push(trainer.mean_squared_error(&dataset).unwrap());
    }

    let last = *checkpoints.last().unwrap();
    assert!(
        last < initial * 0.5,
        "mean squared error should drop over a full run: {:?}",
        checkpoints
    );
    // online updates wobble, so only the trend is checked
    for pair in checkpoints.windows(2) {
        assert!(
            pair[1] <= pair[0] * 1.5 + 1e-3,
            "mean squared error should trend down: {:?}",
            checkpoints
        );
    }
}

#[test]
fn trained_network_predicts_within_contract_ranges() {
    let dataset = reference_dataset();
    let mut trainer = Net::new(4, 10, 1, 1, Some(11)).unwrap().build_trainer();
    trainer.train(&dataset, 2000, DEFAULT_LEARNING_RATE).unwrap();
    let net = trainer.teardown();

    for example in &dataset {
        let prediction = net.predict(&example.features()).unwrap();
        assert!(prediction.score >= 1.0 && prediction.score <= 5.0);
        assert!(prediction.probability > 0.0 && prediction.probability < 1.0);
    }

    let strong = net.predict(&[10.0, 8.0, 98.0, 4.8]).unwrap();
    let weak = net.predict(&[2.0, 4.0, 45.0, 1.8]).unwrap();
    assert!(strong.probability > weak.probability);
    assert!(strong.score > weak.score);
}

#[test]
fn train_rejects_bad_hyperparameters() {
    let dataset = reference_dataset();
    let mut trainer = Net::new(4, 10, 1, 1, Some(3)).unwrap().build_trainer();
    assert!(matches!(
        trainer.train(&dataset, 0, DEFAULT_LEARNING_RATE),
        Err(TrainError::Hyperparameter(InvalidHyperparameterError::BadEpochs(0)))
    ));
    assert!(matches!(
        trainer.train(&dataset, 10, 0.0),
        Err(TrainError::Hyperparameter(InvalidHyperparameterError::BadLearningRate(_)))
    ));
    assert!(matches!(
        trainer.train(&dataset, 10, -0.5),
        Err(TrainError::Hyperparameter(_))
    ));
    assert!(matches!(
        trainer.train(&dataset, 10, f64::NAN),
        Err(TrainError::Hyperparameter(_))
    ));
    // parameters must be untouched by a rejected call
    let before = Net::new(4, 10, 1, 1, Some(3)).unwrap().export();
    assert_eq!(trainer.teardown().export(), before);
}

#[test]
fn train_rejects_mismatched_network_shape() {
    let dataset = reference_dataset();

    let mut trainer = Net::new(3, 10, 1, 1, Some(3)).unwrap().build_trainer();
    assert!(matches!(
        trainer.train(&dataset, 10, DEFAULT_LEARNING_RATE),
        Err(TrainError::Dimension(_))
    ));

    let mut trainer = Net::new(4, 10, 2, 1, Some(3)).unwrap().build_trainer();
    assert!(matches!(
        trainer.train(&dataset, 10, DEFAULT_LEARNING_RATE),
        Err(TrainError::Dimension(_))
    ));

    let mut trainer = Net::new(4, 10, 1, 3, Some(3)).unwrap().build_trainer();
    assert!(matches!(
        trainer.mean_squared_error(&dataset),
        Err(InvalidDimensionError::BadClassification(_))
    ));
}

#[test]
fn empty_dataset_trains_as_no_op() {
    let mut trainer = Net::new(4, 10, 1, 1, Some(9)).unwrap().build_trainer();
    let before = trainer.net_ref().export();
    assert_eq!(trainer.train_epoch(&[], DEFAULT_LEARNING_RATE).unwrap(), 0.0);
    assert_eq!(trainer.mean_squared_error(&[]).unwrap(), 0.0);
    trainer.train(&[], 3, DEFAULT_LEARNING_RATE).unwrap();
    assert_eq!(trainer.teardown().export(), before);
}

#[test]
fn single_example_step_moves_outputs_toward_targets() {
    let dataset = reference_dataset();
    let example = &dataset[0];
    let mut trainer = Net::new(4, 10, 1, 1, Some(21)).unwrap().build_trainer();

    let first = trainer.train_example(example, DEFAULT_LEARNING_RATE).unwrap();
    let mut last = first;
    for _ in 0..200 {
        last = trainer.train_example(example, DEFAULT_LEARNING_RATE).unwrap();
    }
    assert!(last < first);
}
