//! Dropout uncertainty detector

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::error::Result;
use ndarray::ArrayView3;

/// Disagreement across repeated stochastic predictions: the per-class
/// variance over the T repetitions, summed over classes. Instances on which
/// the stochastic passes disagree get high scores.
#[derive(Clone, Copy, Debug, Default)]
pub struct DropoutUncertainty;

impl DropoutUncertainty {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Summed per-class variance per instance.
    ///
    /// `repeated_probabilities` has shape (instances, T, classes); the
    /// variance is the population variance across the T axis.
    pub fn scores(&self, repeated_probabilities: ArrayView3<'_, f64>) -> Vec<f64> {
        let (num_instances, num_repetitions, num_classes) = repeated_probabilities.dim();
        let mut scores = vec![0.0; num_instances];
        if num_repetitions == 0 {
            return scores;
        }

        for (i, score) in scores.iter_mut().enumerate() {
            for class in 0..num_classes {
                let column = repeated_probabilities.slice(ndarray::s![i, .., class]);
                let mean = column.sum() / num_repetitions as f64;
                let variance = column
                    .iter()
                    .map(|&p| (p - mean).powi(2))
                    .sum::<f64>()
                    / num_repetitions as f64;
                *score += variance;
            }
        }

        scores
    }
}

impl Detector for DropoutUncertainty {
    fn name(&self) -> &'static str {
        "dropout_uncertainty"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::RepeatedProbabilities]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        Ok(DetectorOutput::Scores(
            self.scores(input.repeated_probabilities()?),
        ))
    }
}
