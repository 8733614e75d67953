//! Ensemble disagreement detector

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::error::{Error, Result};
use ndarray::Array2;
use std::collections::HashMap;

/// Flags instances whose noisy label differs from the ensemble's
/// majority-voted label.
///
/// `ensemble_predictions` holds one predicted label per (instance, model);
/// ties between equally voted labels are broken by vote order.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnsembleDisagreement;

impl EnsembleDisagreement {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Flag instances out-voted by the ensemble
    pub fn flags<S: AsRef<str>>(
        &self,
        labels: &[S],
        ensemble_predictions: &Array2<String>,
    ) -> Result<Vec<bool>> {
        if ensemble_predictions.nrows() != labels.len() {
            return Err(Error::LengthMismatch {
                what: "ensemble_predictions",
                expected: labels.len(),
                actual: ensemble_predictions.nrows(),
            });
        }
        if ensemble_predictions.ncols() == 0 {
            return Err(Error::InvalidParameter(
                "ensemble_predictions has no voters".into(),
            ));
        }

        Ok(labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
                for (pos, vote) in ensemble_predictions.row(i).into_iter().enumerate() {
                    let entry = counts.entry(vote.as_str()).or_insert((0, pos));
                    entry.0 += 1;
                }
                let majority = counts
                    .into_iter()
                    .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
                    .map(|(vote, _)| vote);
                majority != Some(label.as_ref())
            })
            .collect())
    }
}

impl Detector for EnsembleDisagreement {
    fn name(&self) -> &'static str {
        "ensemble_disagreement"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::Labels, InputKind::EnsemblePredictions]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        let flags = self.flags(input.labels()?, input.ensemble_predictions()?)?;
        Ok(DetectorOutput::Flags(flags))
    }
}
