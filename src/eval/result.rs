//! Evaluation result structure

use super::diagnostics::Diagnostics;
use crate::data::LabelEncoder;
use ndarray::{Array2, Array3};

/// Out-of-fold model outputs for a whole dataset.
///
/// This is the sole handoff artifact from orchestration to detection. Every
/// instance was predicted by a model that never saw it during training
/// (except in the degenerate single-split mode), and each index was written
/// by exactly one fold.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalResult {
    /// Predicted label per instance
    pub predictions: Vec<String>,
    /// Class distribution per instance; columns follow `le` index order and
    /// rows sum to 1 within floating tolerance
    pub probabilities: Array2<f64>,
    /// Stochastic repetition stack of shape (instances, T, classes), present
    /// when repetitions were requested and the model supports dropout
    pub repeated_probabilities: Option<Array3<f64>>,
    /// The label encoding interpreting the probability columns
    pub le: LabelEncoder,
    /// Non-fatal advisories collected during the run
    pub diagnostics: Diagnostics,
}

impl EvalResult {
    /// Number of instances (sub-units for ragged runs)
    pub fn num_instances(&self) -> usize {
        self.predictions.len()
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.probabilities.ncols()
    }

    /// Number of stochastic repetitions, 0 when none were collected
    pub fn num_repetitions(&self) -> usize {
        self.repeated_probabilities
            .as_ref()
            .map_or(0, |r| r.shape()[1])
    }
}
