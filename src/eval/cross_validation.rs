//! Cross-validation orchestrator
//!
//! Drives the fold loop: trains the model on each fold's train slice,
//! predicts on the eval slice, optionally collects repeated stochastic
//! probabilities, and scatters every fold's outputs into dense result arrays
//! at the eval indices. Because eval blocks partition the index space, the
//! assembled arrays have no gaps and no duplicate writes; any deviation is a
//! fatal contract breach and no partial result is returned.
//!
//! The ragged variant runs the same protocol over sequence data: folds are
//! cut at the instance level (a sequence is never split across folds) and
//! outputs are scattered through each sub-unit's precomputed flat index.

use super::diagnostics::Diagnostics;
use super::result::EvalResult;
use super::sampler::{repeated_probabilities_flat, repeated_probabilities_ragged};
use super::splitter::cross_validator;
use crate::data::{LabelEncoder, RaggedArray};
use crate::error::{Error, Result};
use crate::model::{SequenceTagger, TextClassifier};
use ndarray::{s, Array2, Array3};
use std::time::Instant;
use tracing::info;

/// Out-of-fold evaluation runner.
///
/// `n_splits == 1` trains and evaluates on all the same data - a quick
/// diagnostics mode, not an unbiased evaluation.
#[derive(Clone, Debug)]
pub struct CrossValidation {
    n_splits: usize,
    num_repetitions: usize,
    seed: u64,
}

impl CrossValidation {
    /// Create a runner with the given fold count, 50 repetitions and a fixed
    /// default seed
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            num_repetitions: 50,
            seed: 42,
        }
    }

    /// Set the number of repeated stochastic predictions per instance.
    ///
    /// Zero disables repeated sampling; it is also skipped for models without
    /// dropout support.
    pub fn with_repetitions(mut self, num_repetitions: usize) -> Self {
        self.num_repetitions = num_repetitions;
        self
    }

    /// Set the random seed for fold shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Obtain out-of-fold predictions and probabilities on a flat dataset.
    ///
    /// The class count is fixed from the global label set before the loop;
    /// every fold must produce probability matrices with exactly that many
    /// columns and an encoder over the same classes.
    pub fn run(
        &self,
        x: &[String],
        y_noisy: &[String],
        model: &mut dyn TextClassifier,
    ) -> Result<EvalResult> {
        if x.len() != y_noisy.len() {
            return Err(Error::LengthMismatch {
                what: "labels",
                expected: x.len(),
                actual: y_noisy.len(),
            });
        }
        let num_samples = x.len();
        if num_samples == 0 {
            return Err(Error::InvalidParameter("empty dataset".into()));
        }

        let le = LabelEncoder::fit(y_noisy);
        let num_labels = le.num_classes();
        let should_repeat = self.num_repetitions > 0 && model.has_dropout();

        let mut predictions = vec![String::new(); num_samples];
        let mut probabilities = Array2::zeros((num_samples, num_labels));
        let mut repeated_probabilities = should_repeat
            .then(|| Array3::zeros((num_samples, self.num_repetitions, num_labels)));
        let mut written = vec![false; num_samples];
        let mut diagnostics = Diagnostics::new();

        let folds = cross_validator(self.n_splits, true, self.seed)?
            .split(num_samples, Some(y_noisy))?;

        for (i, (train_indices, eval_indices)) in folds.iter().enumerate() {
            info!(
                model = model.name(),
                fold = i + 1,
                total = self.n_splits,
                "running fold"
            );

            let x_train: Vec<String> = train_indices.iter().map(|&j| x[j].clone()).collect();
            let y_train: Vec<String> = train_indices.iter().map(|&j| y_noisy[j].clone()).collect();
            let x_eval: Vec<String> = eval_indices.iter().map(|&j| x[j].clone()).collect();

            let start = Instant::now();
            model.fit(&x_train, &y_train)?;
            info!(
                model = model.name(),
                seconds = start.elapsed().as_secs_f64(),
                "done fitting"
            );

            let pred_eval = model.predict(&x_eval)?;
            let probas_eval = model.predict_proba(&x_eval)?;

            if pred_eval.len() != eval_indices.len() {
                return Err(Error::LengthMismatch {
                    what: "predictions",
                    expected: eval_indices.len(),
                    actual: pred_eval.len(),
                });
            }
            if probas_eval.nrows() != eval_indices.len() {
                return Err(Error::LengthMismatch {
                    what: "probabilities",
                    expected: eval_indices.len(),
                    actual: probas_eval.nrows(),
                });
            }
            if probas_eval.ncols() != num_labels {
                return Err(Error::ClassCountMismatch {
                    expected: num_labels,
                    actual: probas_eval.ncols(),
                });
            }
            if model.label_encoder().classes() != le.classes() {
                return Err(Error::EncoderMismatch);
            }

            if let Some(repeated) = repeated_probabilities.as_mut() {
                let fold_repeated = repeated_probabilities_flat(
                    model,
                    &x_eval,
                    self.num_repetitions,
                    &mut diagnostics,
                )?;
                if fold_repeated.shape()[2] != num_labels {
                    return Err(Error::ClassCountMismatch {
                        expected: num_labels,
                        actual: fold_repeated.shape()[2],
                    });
                }
                for (row, &idx) in eval_indices.iter().enumerate() {
                    repeated
                        .slice_mut(s![idx, .., ..])
                        .assign(&fold_repeated.slice(s![row, .., ..]));
                }
            }

            for (row, &idx) in eval_indices.iter().enumerate() {
                if written[idx] {
                    return Err(Error::InvariantViolation(format!(
                        "instance {idx} assigned by more than one fold"
                    )));
                }
                written[idx] = true;
                predictions[idx] = pred_eval[row].clone();
                probabilities.row_mut(idx).assign(&probas_eval.row(row));
            }
        }

        if let Some(gap) = written.iter().position(|&w| !w) {
            return Err(Error::InvariantViolation(format!(
                "instance {gap} not assigned to any eval fold"
            )));
        }

        Ok(EvalResult {
            predictions,
            probabilities,
            repeated_probabilities,
            le,
            diagnostics,
        })
    }

    /// Obtain out-of-fold predictions and probabilities on a ragged dataset.
    ///
    /// Identical semantics to [`CrossValidation::run`], operating over
    /// sequences: the splitter partitions instances, outputs are flattened to
    /// the sub-unit index space, and stratification is disabled (a label
    /// distribution over sequences is not meaningfully stratifiable).
    pub fn run_ragged(
        &self,
        x: &RaggedArray<String>,
        y_noisy: &RaggedArray<String>,
        model: &mut dyn SequenceTagger,
    ) -> Result<EvalResult> {
        if x.num_rows() != y_noisy.num_rows() || x.sizes() != y_noisy.sizes() {
            return Err(Error::LengthMismatch {
                what: "ragged labels",
                expected: x.total_len(),
                actual: y_noisy.total_len(),
            });
        }
        let num_instances = x.num_rows();
        let num_samples = x.total_len();
        if num_samples == 0 {
            return Err(Error::InvalidParameter("empty dataset".into()));
        }

        let le = LabelEncoder::fit(y_noisy.flat());
        let num_labels = le.num_classes();
        let should_repeat = self.num_repetitions > 0 && model.has_dropout();

        let mut predictions = vec![String::new(); num_samples];
        let mut probabilities = Array2::zeros((num_samples, num_labels));
        let mut repeated_probabilities = should_repeat
            .then(|| Array3::zeros((num_samples, self.num_repetitions, num_labels)));
        let mut written = vec![false; num_samples];
        let mut diagnostics = Diagnostics::new();

        let folds = cross_validator(self.n_splits, false, self.seed)?
            .split::<String>(num_instances, None)?;

        for (i, (train_indices, eval_indices)) in folds.iter().enumerate() {
            info!(
                model = model.name(),
                fold = i + 1,
                total = self.n_splits,
                "running fold"
            );

            // Flat index per evaluated sub-unit, grouped by owning instance
            let score_indices: Vec<usize> = eval_indices
                .iter()
                .flat_map(|&row| x.flat_range(row))
                .collect();

            let x_train = x.select_rows(train_indices);
            let y_train = y_noisy.select_rows(train_indices);
            let x_eval = x.select_rows(eval_indices);

            let start = Instant::now();
            model.fit(&x_train, &y_train)?;
            info!(
                model = model.name(),
                seconds = start.elapsed().as_secs_f64(),
                "done fitting"
            );

            let pred_eval = model.predict(&x_eval)?;
            let probas_eval = model.predict_proba(&x_eval)?;

            if pred_eval.sizes() != x_eval.sizes() {
                return Err(Error::LengthMismatch {
                    what: "ragged predictions",
                    expected: x_eval.total_len(),
                    actual: pred_eval.total_len(),
                });
            }
            if probas_eval.offsets() != x_eval.offsets() {
                return Err(Error::LengthMismatch {
                    what: "ragged probabilities",
                    expected: x_eval.total_len(),
                    actual: probas_eval.total_len(),
                });
            }
            if probas_eval.num_classes() != num_labels {
                return Err(Error::ClassCountMismatch {
                    expected: num_labels,
                    actual: probas_eval.num_classes(),
                });
            }
            if model.label_encoder().classes() != le.classes() {
                return Err(Error::EncoderMismatch);
            }

            if let Some(repeated) = repeated_probabilities.as_mut() {
                let fold_repeated = repeated_probabilities_ragged(
                    model,
                    &x_eval,
                    self.num_repetitions,
                    &mut diagnostics,
                )?;
                if fold_repeated.shape()[2] != num_labels {
                    return Err(Error::ClassCountMismatch {
                        expected: num_labels,
                        actual: fold_repeated.shape()[2],
                    });
                }
                for (row, &idx) in score_indices.iter().enumerate() {
                    repeated
                        .slice_mut(s![idx, .., ..])
                        .assign(&fold_repeated.slice(s![row, .., ..]));
                }
            }

            let pred_flat = pred_eval.flat();
            let probas_flat = probas_eval.flat();
            for (row, &idx) in score_indices.iter().enumerate() {
                if written[idx] {
                    return Err(Error::InvariantViolation(format!(
                        "sub-unit {idx} assigned by more than one fold"
                    )));
                }
                written[idx] = true;
                predictions[idx] = pred_flat[row].clone();
                probabilities.row_mut(idx).assign(&probas_flat.row(row));
            }
        }

        if let Some(gap) = written.iter().position(|&w| !w) {
            return Err(Error::InvariantViolation(format!(
                "sub-unit {gap} not assigned to any eval fold"
            )));
        }

        Ok(EvalResult {
            predictions,
            probabilities,
            repeated_probabilities,
            le,
            diagnostics,
        })
    }
}

impl Default for CrossValidation {
    fn default() -> Self {
        Self::new(10)
    }
}
