//! Model capability traits
//!
//! The evaluation pipeline never depends on a concrete model. Callers bring
//! their own classifier or tagger behind these traits; the orchestrator only
//! uses the fit/predict/predict_proba/label_encoder surface, and the repeated
//! sampler additionally drives the stochastic-inference toggles.
//!
//! Probability matrices returned by `predict_proba` must have one column per
//! class of the fitted [`LabelEncoder`], in encoder index order, with rows
//! summing to 1.

use crate::data::{LabelEncoder, RaggedArray, RaggedMatrix};
use crate::error::Result;
use ndarray::Array2;

/// A trainable classifier over flat instance collections (one unit = one
/// instance, e.g. a document).
pub trait TextClassifier {
    /// Human-readable model name, used in progress logging
    fn name(&self) -> &str;

    /// Train on the given instances and labels
    fn fit(&mut self, x: &[String], y: &[String]) -> Result<()>;

    /// Predicted label per instance
    fn predict(&self, x: &[String]) -> Result<Vec<String>>;

    /// Class distribution per instance, columns in encoder order
    fn predict_proba(&self, x: &[String]) -> Result<Array2<f64>>;

    /// The label encoding fitted during the last `fit`
    fn label_encoder(&self) -> &LabelEncoder;

    /// Whether the model supports stochastic inference (dropout at inference)
    fn has_dropout(&self) -> bool {
        false
    }

    /// Toggle stochastic-inference mode
    fn use_dropout(&mut self, _enabled: bool) {}

    /// Reseed the model's local random state.
    ///
    /// The repeated sampler calls this once per repetition so each repetition
    /// is reproducible in isolation. Models without internal randomness can
    /// keep the default no-op.
    fn reseed(&mut self, _seed: u64) {}
}

/// A trainable tagger over ragged instance collections (one instance = a
/// variable-length sequence of sub-units, e.g. tokens in a sentence).
pub trait SequenceTagger {
    /// Human-readable model name, used in progress logging
    fn name(&self) -> &str;

    /// Train on the given sequences and per-token labels
    fn fit(&mut self, x: &RaggedArray<String>, y: &RaggedArray<String>) -> Result<()>;

    /// Predicted label per sub-unit, same row boundaries as the input
    fn predict(&self, x: &RaggedArray<String>) -> Result<RaggedArray<String>>;

    /// Class distribution per sub-unit, same row boundaries as the input
    fn predict_proba(&self, x: &RaggedArray<String>) -> Result<RaggedMatrix>;

    /// The label encoding fitted during the last `fit`
    fn label_encoder(&self) -> &LabelEncoder;

    /// Whether the model supports stochastic inference (dropout at inference)
    fn has_dropout(&self) -> bool {
        false
    }

    /// Toggle stochastic-inference mode
    fn use_dropout(&mut self, _enabled: bool) {}

    /// Reseed the model's local random state
    fn reseed(&mut self, _seed: u64) {}
}
