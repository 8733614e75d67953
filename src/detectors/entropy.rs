//! Classification entropy detector

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::error::Result;
use ndarray::ArrayView2;

/// Scores each instance with the Shannon entropy (natural log) of its class
/// distribution; a flatter distribution means the model is less sure and the
/// instance is more suspect.
///
/// Zero probabilities contribute zero entropy mass, so degenerate rows stay
/// finite.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassificationEntropy;

impl ClassificationEntropy {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Entropy per probability row
    pub fn scores(&self, probabilities: ArrayView2<'_, f64>) -> Vec<f64> {
        probabilities
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|&p| {
                        let p = p.clamp(0.0, 1.0);
                        if p > 0.0 {
                            -p * p.ln()
                        } else {
                            0.0
                        }
                    })
                    .sum()
            })
            .collect()
    }
}

impl Detector for ClassificationEntropy {
    fn name(&self) -> &'static str {
        "classification_entropy"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::Probabilities]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        Ok(DetectorOutput::Scores(self.scores(input.probabilities()?)))
    }
}
