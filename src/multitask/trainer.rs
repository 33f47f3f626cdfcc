use std::fmt;
use tracing::debug;

use super::data::{TrainingExample, FEATURE_COUNT};
use super::matrix::SizeMismatch;
use super::net::{InvalidDimensionError, Net};
use super::normalize::{normalize_features, normalize_score};

/// Default number of full passes over the dataset.
pub const DEFAULT_EPOCHS: usize = 8000;

/// Default gradient step scale.
pub const DEFAULT_LEARNING_RATE: f64 = 0.15;

/// How often `Trainer::train` reports progress, in epochs.
const PROGRESS_INTERVAL: usize = 1000;

/// Net trainer structure.
///
/// To train a `Net`, scratch buffers for the activations and the
/// per-unit gradient signals are needed. We will contain them in this
/// structure. Training procedure looks like this:
/// * One allocates the buffers by calling `Net::build_trainer`, which
///   consumes the `Net` and returns a `Trainer` object. (Consuming the
///   `Net` also rules out querying it while training mutates it.)
/// * `Trainer::train` drives a whole run; `Trainer::train_epoch` and
///   `Trainer::train_example` expose the individual steps for callers
///   that want to report progress or schedule passes themselves.
/// * `Trainer::mean_squared_error` evaluates the current parameters on
///   a dataset without updating them. Between training calls,
///   `Trainer::net_ref` gives read access for predictions.
/// * Once finished training, `Trainer::teardown` frees the buffers and
///   returns the contained `Net` back.
///
/// Updates are online: every example's gradient step is written into
/// the parameters immediately, before the next example is read, so the
/// dataset order is part of the result.
pub struct Trainer {
    /// The network object trainer possesses.
    net: Net,

    /// Activations of the example currently being processed.
    hidden: Box<[f64]>,
    regression: Box<[f64]>,
    classification: Box<[f64]>,

    /// Per-unit gradient signals (error scaled by the local sigmoid
    /// derivative) for each head and for the shared hidden layer.
    delta_r: Box<[f64]>,
    delta_c: Box<[f64]>,
    hidden_delta: Box<[f64]>,
}

impl Trainer {
    /// Consumes `Net` and builds a `Trainer` object containing it.
    pub(super) fn build(net: Net) -> Trainer {
        let hidden = vec![0.0; net.hidden_size()].into_boxed_slice();
        let regression = vec![0.0; net.regression_size()].into_boxed_slice();
        let classification = vec![0.0; net.classification_size()].into_boxed_slice();
        let delta_r = vec![0.0; net.regression_size()].into_boxed_slice();
        let delta_c = vec![0.0; net.classification_size()].into_boxed_slice();
        let hidden_delta = vec![0.0; net.hidden_size()].into_boxed_slice();

        Trainer {
            net,
            hidden,
            regression,
            classification,
            delta_r,
            delta_c,
            hidden_delta,
        }
    }

    /// Returns reference to contained `Net`, allowing the use of
    /// `Net::predict` between training calls.
    pub fn net_ref(&self) -> &Net {
        &self.net
    }

    /// Trains on the whole dataset for a fixed number of epochs.
    ///
    /// Each epoch is one in-order pass of per-example online gradient
    /// descent: normalize, forward, backpropagate both heads' errors
    /// through the shared hidden layer, update the parameters in place.
    /// Training always runs exactly `epochs` passes; there is no
    /// convergence check or early stopping. Progress (epoch index and
    /// mean cost) is emitted at debug level every 1000 epochs.
    ///
    /// # Arguments
    /// * `dataset` - ordered training examples;
    /// * `epochs` - positive number of full passes;
    /// * `learning_rate` - positive gradient step scale.
    ///
    /// # Returns
    /// * `Ok(())` once all passes ran;
    /// * `Err(TrainError)` if a hyperparameter is non-positive, or if
    ///   the network's sizes disagree with the dataset shape (four
    ///   features, one unit per head).
    ///
    /// # Examples
    /// ```
    /// # use mtnnet::multitask::{reference_dataset, Net, DEFAULT_LEARNING_RATE};
    /// let mut trainer = Net::new(4, 10, 1, 1, Some(42)).unwrap().build_trainer();
    /// trainer.train(&reference_dataset(), 50, DEFAULT_LEARNING_RATE).unwrap();
    /// let net = trainer.teardown();
    /// ```
    pub fn train(
        &mut self,
        dataset: &[TrainingExample],
        epochs: usize,
        learning_rate: f64,
    ) -> Result<(), TrainError> {
        if epochs == 0 {
            return Err(InvalidHyperparameterError::BadEpochs(epochs).into());
        }
        Trainer::check_learning_rate(learning_rate)?;
        self.check_dataset_shape()?;

        for epoch in 0..epochs {
            let cost = self.run_epoch(dataset, learning_rate);
            if epoch % PROGRESS_INTERVAL == 0 {
                debug!("epoch {}/{}: mean cost {:.6}", epoch, epochs, cost);
            }
        }

        Ok(())
    }

    /// Performs one in-order pass over the dataset.
    ///
    /// # Returns
    /// * The mean cost over the pass (0.0 for an empty dataset);
    /// * `Err(TrainError)` on a bad learning rate or a shape
    ///   disagreement.
    pub fn train_epoch(
        &mut self,
        dataset: &[TrainingExample],
        learning_rate: f64,
    ) -> Result<f64, TrainError> {
        Trainer::check_learning_rate(learning_rate)?;
        self.check_dataset_shape()?;
        Ok(self.run_epoch(dataset, learning_rate))
    }

    /// Performs one online update for a single example.
    ///
    /// # Returns
    /// * The example's cost (summed squared error of both heads) as
    ///   computed before the update;
    /// * `Err(TrainError)` on a bad learning rate or a shape
    ///   disagreement.
    pub fn train_example(
        &mut self,
        example: &TrainingExample,
        learning_rate: f64,
    ) -> Result<f64, TrainError> {
        Trainer::check_learning_rate(learning_rate)?;
        self.check_dataset_shape()?;
        Ok(self.step(example, learning_rate))
    }

    /// Calculates the mean cost (summed squared error of both heads,
    /// averaged over the dataset) using the current parameters. No
    /// updates are applied.
    pub fn mean_squared_error(
        &mut self,
        dataset: &[TrainingExample],
    ) -> Result<f64, InvalidDimensionError> {
        self.check_dataset_shape()?;

        if dataset.is_empty() {
            return Ok(0.0);
        }

        let mut cost_sum = 0.0;
        for example in dataset {
            let inputs = normalize_features(&example.features()).unwrap();
            self.net
                .forward(
                    &inputs,
                    &mut self.hidden,
                    &mut self.regression,
                    &mut self.classification,
                )
                .unwrap();

            let err_r = normalize_score(example.score) - self.regression[0];
            let err_c = example.pass_label() - self.classification[0];
            cost_sum += err_r * err_r + err_c * err_c;
        }

        Ok(cost_sum / dataset.len() as f64)
    }

    /// Frees training buffers, consuming `Trainer` object, and returns
    /// contained `Net` back.
    pub fn teardown(self) -> Net {
        self.net
    }

    fn check_learning_rate(learning_rate: f64) -> Result<(), InvalidHyperparameterError> {
        // Rejects NaN as well
        if !(learning_rate > 0.0) {
            return Err(InvalidHyperparameterError::BadLearningRate(learning_rate));
        }
        Ok(())
    }

    /// Checks that the network's sizes agree with the fixed dataset
    /// shape: four features per example, one label per head.
    fn check_dataset_shape(&self) -> Result<(), InvalidDimensionError> {
        if self.net.input_size() != FEATURE_COUNT {
            return Err(InvalidDimensionError::BadInputs(SizeMismatch {
                expected: self.net.input_size(),
                got: FEATURE_COUNT,
            }));
        }
        if self.net.regression_size() != 1 {
            return Err(InvalidDimensionError::BadRegression(SizeMismatch {
                expected: self.net.regression_size(),
                got: 1,
            }));
        }
        if self.net.classification_size() != 1 {
            return Err(InvalidDimensionError::BadClassification(SizeMismatch {
                expected: self.net.classification_size(),
                got: 1,
            }));
        }
        Ok(())
    }

    fn run_epoch(&mut self, dataset: &[TrainingExample], learning_rate: f64) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }

        let mut cost_sum = 0.0;
        for example in dataset {
            cost_sum += self.step(example, learning_rate);
        }
        cost_sum / dataset.len() as f64
    }

    /// One backpropagation step; shapes were validated by the caller.
    fn step(&mut self, example: &TrainingExample, learning_rate: f64) -> f64 {
        let inputs = normalize_features(&example.features()).unwrap();
        let target_r = normalize_score(example.score);
        let target_c = example.pass_label();

        self.net
            .forward(
                &inputs,
                &mut self.hidden,
                &mut self.regression,
                &mut self.classification,
            )
            .unwrap();

        // Per-head error and gradient signal, using the sigmoid
        // derivative of the already-activated output
        let err_r = target_r - self.regression[0];
        self.delta_r[0] = err_r * Net::sigmoid_der_s(self.regression[0]);
        let err_c = target_c - self.classification[0];
        self.delta_c[0] = err_c * Net::sigmoid_der_s(self.classification[0]);

        // The shared hidden layer receives the sum of both heads'
        // backpropagated error signals
        for d in self.hidden_delta.iter_mut() {
            *d = 0.0;
        }
        self.net
            .weights_hr
            .mul_vec_acc(&self.delta_r, &mut self.hidden_delta)
            .unwrap();
        self.net
            .weights_hc
            .mul_vec_acc(&self.delta_c, &mut self.hidden_delta)
            .unwrap();
        for (d, &h) in self.hidden_delta.iter_mut().zip(self.hidden.iter()) {
            *d *= Net::sigmoid_der_s(h);
        }

        // Head parameters move along hidden activation × head delta
        self.net
            .weights_hr
            .add_scaled_outer(&self.hidden, &self.delta_r, learning_rate)
            .unwrap();
        for (b, &d) in self.net.bias_r.iter_mut().zip(self.delta_r.iter()) {
            *b += learning_rate * d;
        }
        self.net
            .weights_hc
            .add_scaled_outer(&self.hidden, &self.delta_c, learning_rate)
            .unwrap();
        for (b, &d) in self.net.bias_c.iter_mut().zip(self.delta_c.iter()) {
            *b += learning_rate * d;
        }

        // Input parameters move along input × hidden delta
        self.net
            .weights_ih
            .add_scaled_outer(&inputs, &self.hidden_delta, learning_rate)
            .unwrap();
        for (b, &d) in self.net.bias_h.iter_mut().zip(self.hidden_delta.iter()) {
            *b += learning_rate * d;
        }

        err_r * err_r + err_c * err_c
    }
}

/// Error structure for non-positive hyperparameters passed to training.
#[derive(Debug, Clone)]
pub enum InvalidHyperparameterError {
    BadEpochs(usize),
    BadLearningRate(f64),
}

impl fmt::Display for InvalidHyperparameterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            InvalidHyperparameterError::BadEpochs(got) => {
                write!(f, "Epochs count must be positive, but got {}!", got)
            }
            InvalidHyperparameterError::BadLearningRate(got) => {
                write!(f, "Learning rate must be positive, but got {}!", got)
            }
        }
    }
}

/// Error structure for `Trainer` methods.
#[derive(Debug, Clone)]
pub enum TrainError {
    Dimension(InvalidDimensionError),
    Hyperparameter(InvalidHyperparameterError),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            TrainError::Dimension(err) => write!(f, "{}", err),
            TrainError::Hyperparameter(err) => write!(f, "{}", err),
        }
    }
}

impl From<InvalidDimensionError> for TrainError {
    fn from(err: InvalidDimensionError) -> Self {
        TrainError::Dimension(err)
    }
}

impl From<InvalidHyperparameterError> for TrainError {
    fn from(err: InvalidHyperparameterError) -> Self {
        TrainError::Hyperparameter(err)
    }
}
