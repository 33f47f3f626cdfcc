use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

use super::matrix::{random_vector, Matrix, SizeMismatch};
use super::normalize::{denormalize_score, normalize_features};
use super::trainer::Trainer;

/// Multi-task network structure.
///
/// One shared hidden layer feeds two independent sigmoid heads: a
/// regression head predicting the continuous score and a classification
/// head predicting the pass probability. The six parameter groups are
/// created once at construction and mutated in place by the `Trainer`;
/// during inference they are only read.
pub struct Net {
    /// Input → hidden weights (`input_size` × `hidden_size`).
    pub(super) weights_ih: Matrix,
    pub(super) bias_h: Box<[f64]>,

    /// Hidden → regression-head weights (`hidden_size` × `regression_size`).
    pub(super) weights_hr: Matrix,
    pub(super) bias_r: Box<[f64]>,

    /// Hidden → classification-head weights (`hidden_size` × `classification_size`).
    pub(super) weights_hc: Matrix,
    pub(super) bias_c: Box<[f64]>,
}

impl Net {
    /// Returns a network of the given sizes with every weight and bias
    /// drawn uniformly from [-1, 1).
    ///
    /// # Arguments
    /// * `input_size`, `hidden_size`, `regression_size`,
    ///   `classification_size` - number of units per layer, all positive;
    /// * `seed` - `Some(seed)` makes construction (and therefore a whole
    ///   training run) reproducible; `None` seeds from entropy.
    ///
    /// # Returns
    /// * `Ok(Net)` if every size is positive;
    /// * `Err(InvalidDimensionError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use mtnnet::multitask::Net;
    /// let net = Net::new(4, 10, 1, 1, Some(42)).unwrap();
    /// assert_eq!(net.hidden_size(), 10);
    /// ```
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        regression_size: usize,
        classification_size: usize,
        seed: Option<u64>,
    ) -> Result<Net, InvalidDimensionError> {
        Net::check_sizes(input_size, hidden_size, regression_size, classification_size)?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Net {
            weights_ih: Matrix::random(input_size, hidden_size, &mut rng),
            bias_h: random_vector(hidden_size, &mut rng),
            weights_hr: Matrix::random(hidden_size, regression_size, &mut rng),
            bias_r: random_vector(regression_size, &mut rng),
            weights_hc: Matrix::random(hidden_size, classification_size, &mut rng),
            bias_c: random_vector(classification_size, &mut rng),
        })
    }

    /// Returns a network built from explicit coefficients instead of a
    /// random source.
    ///
    /// The layout matches `Net::export`:
    /// `[weights_ih]bias_h[weights_hr]bias_r[weights_hc]bias_c`,
    /// weights row-major.
    ///
    /// # Returns
    /// * `Ok(Net)` if every size is positive and the coefficient count
    ///   matches the sizes;
    /// * `Err(InvalidDimensionError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use mtnnet::multitask::Net;
    /// let coefficients = [0.5, -0.25, 0.1, 0.8, -0.3, 1.5, 0.2];
    /// let net = Net::with_coefficients(2, 1, 1, 1, &coefficients).unwrap();
    /// assert_eq!(net.export(), coefficients.to_vec());
    /// ```
    pub fn with_coefficients(
        input_size: usize,
        hidden_size: usize,
        regression_size: usize,
        classification_size: usize,
        coefficients: &[f64],
    ) -> Result<Net, InvalidDimensionError> {
        Net::check_sizes(input_size, hidden_size, regression_size, classification_size)?;

        let total =
            Net::coefficients_len(input_size, hidden_size, regression_size, classification_size);
        if coefficients.len() != total {
            return Err(InvalidDimensionError::BadCoefficients(SizeMismatch {
                expected: total,
                got: coefficients.len(),
            }));
        }

        let (w_ih, rest) = coefficients.split_at(input_size * hidden_size);
        let (b_h, rest) = rest.split_at(hidden_size);
        let (w_hr, rest) = rest.split_at(hidden_size * regression_size);
        let (b_r, rest) = rest.split_at(regression_size);
        let (w_hc, b_c) = rest.split_at(hidden_size * classification_size);

        Ok(Net {
            weights_ih: Matrix::from_values(input_size, hidden_size, w_ih).unwrap(),
            bias_h: b_h.to_owned().into_boxed_slice(),
            weights_hr: Matrix::from_values(hidden_size, regression_size, w_hr).unwrap(),
            bias_r: b_r.to_owned().into_boxed_slice(),
            weights_hc: Matrix::from_values(hidden_size, classification_size, w_hc).unwrap(),
            bias_c: b_c.to_owned().into_boxed_slice(),
        })
    }

    fn check_sizes(
        input_size: usize,
        hidden_size: usize,
        regression_size: usize,
        classification_size: usize,
    ) -> Result<(), InvalidDimensionError> {
        let layers = [
            ("input", input_size),
            ("hidden", hidden_size),
            ("regression", regression_size),
            ("classification", classification_size),
        ];
        for &(layer, size) in layers.iter() {
            if size == 0 {
                return Err(InvalidDimensionError::EmptyLayer(layer));
            }
        }
        Ok(())
    }

    /// Number of coefficients (weights and biases) a network of the
    /// given sizes holds.
    pub fn coefficients_len(
        input_size: usize,
        hidden_size: usize,
        regression_size: usize,
        classification_size: usize,
    ) -> usize {
        input_size * hidden_size
            + hidden_size
            + hidden_size * regression_size
            + regression_size
            + hidden_size * classification_size
            + classification_size
    }

    pub fn input_size(&self) -> usize {
        self.weights_ih.rows()
    }

    pub fn hidden_size(&self) -> usize {
        self.weights_ih.cols()
    }

    pub fn regression_size(&self) -> usize {
        self.weights_hr.cols()
    }

    pub fn classification_size(&self) -> usize {
        self.weights_hc.cols()
    }

    /// Exports all coefficients in construction order:
    /// `[weights_ih]bias_h[weights_hr]bias_r[weights_hc]bias_c`,
    /// weights row-major.
    pub fn export(&self) -> Vec<f64> {
        let mut coefficients = Vec::with_capacity(Net::coefficients_len(
            self.input_size(),
            self.hidden_size(),
            self.regression_size(),
            self.classification_size(),
        ));
        coefficients.extend_from_slice(self.weights_ih.values());
        coefficients.extend_from_slice(&self.bias_h);
        coefficients.extend_from_slice(self.weights_hr.values());
        coefficients.extend_from_slice(&self.bias_r);
        coefficients.extend_from_slice(self.weights_hc.values());
        coefficients.extend_from_slice(&self.bias_c);
        coefficients
    }

    /// Sigmoid function.
    /// Implements the formula:
    /// `1 / (1 + exp(-x))`.
    pub(super) fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    /// Sigmoid derivative function, expressed in terms of the
    /// already-activated value.
    /// Implements the formula:
    /// `s * (1 - s)`.
    pub(super) fn sigmoid_der_s(s: f64) -> f64 {
        s * (1.0 - s)
    }

    /// Runs the forward pass on an already-normalized input.
    ///
    /// # Arguments
    /// * `inputs` - slice that holds the normalized feature vector;
    /// * `hidden` - mutable slice that will be filled with the shared
    ///   hidden activations (exposed because the trainer backpropagates
    ///   through them; it carries no meaning outside the network);
    /// * `regression` - mutable slice for the regression-head outputs;
    /// * `classification` - mutable slice for the classification-head
    ///   outputs.
    ///
    /// Every written value is a sigmoid activation, so it lies strictly
    /// inside (0, 1) for inputs in the normalized domain.
    ///
    /// # Returns
    /// * `Ok(())` if every slice width matches the configured sizes;
    /// * `Err(InvalidDimensionError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use mtnnet::multitask::Net;
    /// let net = Net::new(4, 10, 1, 1, Some(1)).unwrap();
    /// let mut hidden = [0.0; 10];
    /// let (mut regression, mut classification) = ([0.0], [0.0]);
    /// net.forward(&[0.58, 0.89, 0.95, 0.88], &mut hidden, &mut regression, &mut classification)
    ///     .unwrap();
    /// ```
    pub fn forward(
        &self,
        inputs: &[f64],
        hidden: &mut [f64],
        regression: &mut [f64],
        classification: &mut [f64],
    ) -> Result<(), InvalidDimensionError> {
        if inputs.len() != self.input_size() {
            return Err(InvalidDimensionError::BadInputs(SizeMismatch {
                expected: self.input_size(),
                got: inputs.len(),
            }));
        }
        if hidden.len() != self.hidden_size() {
            return Err(InvalidDimensionError::BadHidden(SizeMismatch {
                expected: self.hidden_size(),
                got: hidden.len(),
            }));
        }
        if regression.len() != self.regression_size() {
            return Err(InvalidDimensionError::BadRegression(SizeMismatch {
                expected: self.regression_size(),
                got: regression.len(),
            }));
        }
        if classification.len() != self.classification_size() {
            return Err(InvalidDimensionError::BadClassification(SizeMismatch {
                expected: self.classification_size(),
                got: classification.len(),
            }));
        }

        self.weights_ih.vec_mul(inputs, hidden).unwrap();
        for (h, &b) in hidden.iter_mut().zip(self.bias_h.iter()) {
            *h = Net::sigmoid(*h + b);
        }

        self.weights_hr.vec_mul(hidden, regression).unwrap();
        for (r, &b) in regression.iter_mut().zip(self.bias_r.iter()) {
            *r = Net::sigmoid(*r + b);
        }

        self.weights_hc.vec_mul(hidden, classification).unwrap();
        for (c, &b) in classification.iter_mut().zip(self.bias_c.iter()) {
            *c = Net::sigmoid(*c + b);
        }

        Ok(())
    }

    /// Predicts the score and pass probability for four raw feature
    /// values `[study_hours, sleep_hours, attendance, previous_score]`.
    ///
    /// The regression output is denormalized and clamped into
    /// [1.0, 5.0]; the classification output is passed through as a
    /// probability in (0, 1). Applying a pass/fail threshold is the
    /// caller's decision.
    ///
    /// # Examples
    /// ```
    /// # use mtnnet::multitask::Net;
    /// let net = Net::new(4, 10, 1, 1, Some(42)).unwrap();
    /// let prediction = net.predict(&[7.0, 8.0, 95.0, 4.5]).unwrap();
    /// assert!(prediction.score >= 1.0 && prediction.score <= 5.0);
    /// ```
    pub fn predict(&self, features: &[f64]) -> Result<Prediction, InvalidDimensionError> {
        let inputs = normalize_features(features)?;

        let mut hidden = vec![0.0; self.hidden_size()];
        let mut regression = vec![0.0; self.regression_size()];
        let mut classification = vec![0.0; self.classification_size()];
        self.forward(&inputs, &mut hidden, &mut regression, &mut classification)?;

        Ok(Prediction {
            score: denormalize_score(regression[0]),
            probability: classification[0],
        })
    }

    /// Consumes `Net` and builds a `Trainer` object containing it.
    /// See `Trainer`'s documentation for details.
    pub fn build_trainer(self) -> Trainer {
        Trainer::build(self)
    }
}

/// Result of `Net::predict`.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Predicted score, clamped into [1.0, 5.0].
    pub score: f64,
    /// Predicted pass probability in (0, 1).
    pub probability: f64,
}

/// Error structure for dimension disagreements: a zero-sized layer at
/// construction, or a vector whose width disagrees with the configured
/// sizes.
#[derive(Debug, Clone)]
pub enum InvalidDimensionError {
    EmptyLayer(&'static str),
    BadCoefficients(SizeMismatch),
    BadInputs(SizeMismatch),
    BadHidden(SizeMismatch),
    BadRegression(SizeMismatch),
    BadClassification(SizeMismatch),
}

impl fmt::Display for InvalidDimensionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            InvalidDimensionError::EmptyLayer(layer) => {
                write!(f, "The {} layer must have at least one unit!", layer)
            }
            InvalidDimensionError::BadCoefficients(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} coefficients because of provided sizes, but got {}!",
                expected, got
            ),
            InvalidDimensionError::BadInputs(SizeMismatch { expected, got }) => {
                write!(f, "Expected {} input(s), but got {}!", expected, got)
            }
            InvalidDimensionError::BadHidden(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} hidden activation(s), but got {}!",
                expected, got
            ),
            InvalidDimensionError::BadRegression(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} regression output(s), but got {}!",
                expected, got
            ),
            InvalidDimensionError::BadClassification(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} classification output(s), but got {}!",
                expected, got
            ),
        }
    }
}
