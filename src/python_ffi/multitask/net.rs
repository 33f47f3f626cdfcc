use pyo3::prelude::*;
use std::convert::TryInto;

use crate::multitask::{
    InvalidDimensionError, InvalidHyperparameterError, Net as InnerNet, SizeMismatch, TrainError,
    Trainer as InnerTrainer, TrainingExample, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE, ROW_WIDTH,
};
use crate::Impl_to_PyErr;

/// Python-facing network. The inner `Trainer` lifecycle is kept
/// internal so a single Python object can alternate training and
/// prediction calls.
#[pyclass]
pub struct Net {
    trainer: InnerTrainer,
}

#[pymethods]
impl Net {
    #[new]
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        regression_size: usize,
        classification_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, InvalidDimensionError> {
        Ok(Self {
            trainer: InnerNet::new(
                input_size,
                hidden_size,
                regression_size,
                classification_size,
                seed,
            )?
            .build_trainer(),
        })
    }

    pub fn sizes(&self) -> (usize, usize, usize, usize) {
        let net = self.trainer.net_ref();
        (
            net.input_size(),
            net.hidden_size(),
            net.regression_size(),
            net.classification_size(),
        )
    }

    pub fn export(&self) -> Vec<f64> {
        self.trainer.net_ref().export()
    }

    /// Trains on rows of
    /// `[study_hours, sleep_hours, attendance, previous_score, score, passed]`.
    /// `epochs` and `learning_rate` default to 8000 and 0.15.
    pub fn train(
        &mut self,
        rows: Vec<Vec<f64>>,
        epochs: Option<usize>,
        learning_rate: Option<f64>,
    ) -> Result<(), TrainError> {
        let mut dataset = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != ROW_WIDTH {
                return Err(InvalidDimensionError::BadInputs(SizeMismatch {
                    expected: ROW_WIDTH,
                    got: row.len(),
                })
                .into());
            }
            let row: [f64; ROW_WIDTH] = row.as_slice().try_into().unwrap();
            dataset.push(TrainingExample::from_row(row));
        }

        self.trainer.train(
            &dataset,
            epochs.unwrap_or(DEFAULT_EPOCHS),
            learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
        )
    }

    /// Returns `(score, probability)` for four raw feature values.
    pub fn predict(&self, features: Vec<f64>) -> Result<(f64, f64), InvalidDimensionError> {
        let prediction = self.trainer.net_ref().predict(&features)?;
        Ok((prediction.score, prediction.probability))
    }
}

Impl_to_PyErr!(for InvalidDimensionError, InvalidHyperparameterError, TrainError);
