//! Probability-based uncertainty detectors

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::data::LabelEncoder;
use crate::error::{Error, Result};
use ndarray::ArrayView2;

/// Least-confidence score on the asserted label: `1 - p(noisy label)`.
///
/// The score deliberately uses the instance's asserted label, not the argmax
/// prediction: a high score means the model finds the asserted label
/// improbable.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassificationUncertainty;

impl ClassificationUncertainty {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// `1 - probabilities[i, class_index(labels[i])]` per instance
    pub fn scores<S: AsRef<str>>(
        &self,
        labels: &[S],
        probabilities: ArrayView2<'_, f64>,
        le: &LabelEncoder,
    ) -> Result<Vec<f64>> {
        if probabilities.nrows() != labels.len() {
            return Err(Error::LengthMismatch {
                what: "probabilities",
                expected: labels.len(),
                actual: probabilities.nrows(),
            });
        }

        labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let class = le.transform(label.as_ref())?;
                let p = probabilities[[i, class]].clamp(0.0, 1.0);
                Ok(1.0 - p)
            })
            .collect()
    }
}

impl Detector for ClassificationUncertainty {
    fn name(&self) -> &'static str {
        "classification_uncertainty"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[
            InputKind::Labels,
            InputKind::Probabilities,
            InputKind::LabelEncoding,
        ]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        let scores = self.scores(
            input.labels()?,
            input.probabilities()?,
            input.label_encoder()?,
        )?;
        Ok(DetectorOutput::Scores(scores))
    }
}

/// Prediction-margin score: `1 - (p1 - p2)` where `p1`, `p2` are the two
/// largest probabilities in the row. A small margin between the top two
/// classes means the model could not separate them, making the instance
/// suspect.
#[derive(Clone, Copy, Debug, Default)]
pub struct PredictionMargin;

impl PredictionMargin {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Margin-based score per probability row
    pub fn scores(&self, probabilities: ArrayView2<'_, f64>) -> Vec<f64> {
        probabilities
            .rows()
            .into_iter()
            .map(|row| {
                let mut first = 0.0_f64;
                let mut second = 0.0_f64;
                for &p in row {
                    let p = p.clamp(0.0, 1.0);
                    if p > first {
                        second = first;
                        first = p;
                    } else if p > second {
                        second = p;
                    }
                }
                1.0 - (first - second)
            })
            .collect()
    }
}

impl Detector for PredictionMargin {
    fn name(&self) -> &'static str {
        "prediction_margin"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::Probabilities]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        Ok(DetectorOutput::Scores(self.scores(input.probabilities()?)))
    }
}
