//! Named inputs and outputs shared by all detectors

use crate::data::LabelEncoder;
use crate::error::{Error, Result};
use crate::eval::EvalResult;
use ndarray::{Array2, ArrayView2, ArrayView3};

/// The kinds of input a detector may declare as required
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Instance surface text (token identity for sequence tasks)
    Texts,
    /// The asserted noisy labels
    Labels,
    /// Out-of-fold class distributions, instances x classes
    Probabilities,
    /// Stochastic repetition stack, instances x T x classes
    RepeatedProbabilities,
    /// Per-model predicted labels, instances x models
    EnsemblePredictions,
    /// The label encoding interpreting probability columns
    LabelEncoding,
}

impl InputKind {
    fn field(self) -> &'static str {
        match self {
            InputKind::Texts => "texts",
            InputKind::Labels => "labels",
            InputKind::Probabilities => "probabilities",
            InputKind::RepeatedProbabilities => "repeated_probabilities",
            InputKind::EnsemblePredictions => "ensemble_predictions",
            InputKind::LabelEncoding => "le",
        }
    }
}

/// Named-parameter bundle of detector inputs.
///
/// All populated fields must be aligned to the same instance ordering.
/// Detectors read only the fields they declare and ignore the rest; a
/// missing required field yields [`Error::MissingInput`].
#[derive(Clone, Debug, Default)]
pub struct DetectorInput<'a> {
    texts: Option<&'a [String]>,
    labels: Option<&'a [String]>,
    probabilities: Option<ArrayView2<'a, f64>>,
    repeated_probabilities: Option<ArrayView3<'a, f64>>,
    ensemble_predictions: Option<&'a Array2<String>>,
    le: Option<&'a LabelEncoder>,
}

impl<'a> DetectorInput<'a> {
    /// Create an empty input bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate probabilities, repeated probabilities, and the label encoding
    /// from an evaluation result
    pub fn from_result(result: &'a EvalResult) -> Self {
        Self {
            probabilities: Some(result.probabilities.view()),
            repeated_probabilities: result.repeated_probabilities.as_ref().map(|r| r.view()),
            le: Some(&result.le),
            ..Self::default()
        }
    }

    /// Attach instance surface texts
    pub fn with_texts(mut self, texts: &'a [String]) -> Self {
        self.texts = Some(texts);
        self
    }

    /// Attach the asserted noisy labels
    pub fn with_labels(mut self, labels: &'a [String]) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Attach the probability matrix
    pub fn with_probabilities(mut self, probabilities: ArrayView2<'a, f64>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    /// Attach the repeated-probability stack
    pub fn with_repeated_probabilities(mut self, repeated: ArrayView3<'a, f64>) -> Self {
        self.repeated_probabilities = Some(repeated);
        self
    }

    /// Attach per-model ensemble predictions
    pub fn with_ensemble_predictions(mut self, predictions: &'a Array2<String>) -> Self {
        self.ensemble_predictions = Some(predictions);
        self
    }

    /// Attach the label encoding
    pub fn with_label_encoder(mut self, le: &'a LabelEncoder) -> Self {
        self.le = Some(le);
        self
    }

    /// Surface texts, or the missing-input error
    pub fn texts(&self) -> Result<&'a [String]> {
        self.texts.ok_or(Error::MissingInput(InputKind::Texts.field()))
    }

    /// Noisy labels, or the missing-input error
    pub fn labels(&self) -> Result<&'a [String]> {
        self.labels
            .ok_or(Error::MissingInput(InputKind::Labels.field()))
    }

    /// Probability matrix, or the missing-input error
    pub fn probabilities(&self) -> Result<ArrayView2<'a, f64>> {
        self.probabilities
            .ok_or(Error::MissingInput(InputKind::Probabilities.field()))
    }

    /// Repeated-probability stack, or the missing-input error
    pub fn repeated_probabilities(&self) -> Result<ArrayView3<'a, f64>> {
        self.repeated_probabilities
            .ok_or(Error::MissingInput(InputKind::RepeatedProbabilities.field()))
    }

    /// Ensemble predictions, or the missing-input error
    pub fn ensemble_predictions(&self) -> Result<&'a Array2<String>> {
        self.ensemble_predictions
            .ok_or(Error::MissingInput(InputKind::EnsemblePredictions.field()))
    }

    /// Label encoding, or the missing-input error
    pub fn label_encoder(&self) -> Result<&'a LabelEncoder> {
        self.le
            .ok_or(Error::MissingInput(InputKind::LabelEncoding.field()))
    }
}

/// Per-instance detector output, aligned index-for-index with the input
#[derive(Clone, Debug, PartialEq)]
pub enum DetectorOutput {
    /// Real-valued suspicion scores; higher means more suspect
    Scores(Vec<f64>),
    /// Boolean flags; true means suspect
    Flags(Vec<bool>),
}

impl DetectorOutput {
    /// Number of instances covered
    pub fn len(&self) -> usize {
        match self {
            DetectorOutput::Scores(s) => s.len(),
            DetectorOutput::Flags(f) => f.len(),
        }
    }

    /// Whether the output is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scores if this output is real-valued
    pub fn as_scores(&self) -> Option<&[f64]> {
        match self {
            DetectorOutput::Scores(s) => Some(s),
            DetectorOutput::Flags(_) => None,
        }
    }

    /// Flags if this output is boolean
    pub fn as_flags(&self) -> Option<&[bool]> {
        match self {
            DetectorOutput::Flags(f) => Some(f),
            DetectorOutput::Scores(_) => None,
        }
    }

    /// Convert to scores, mapping flags to 1.0 / 0.0
    pub fn into_scores(self) -> Vec<f64> {
        match self {
            DetectorOutput::Scores(s) => s,
            DetectorOutput::Flags(f) => f.into_iter().map(|b| f64::from(u8::from(b))).collect(),
        }
    }
}
