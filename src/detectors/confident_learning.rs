//! Confident learning detector

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::data::LabelEncoder;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};

/// Estimates the joint distribution between asserted and latent true labels
/// and flags instances confidently assigned to a different class than the
/// one asserted.
///
/// Per class `j`, the confidence threshold is the mean predicted probability
/// of `j` over instances asserted as `j`. An instance is confidently counted
/// for the class with the highest probability among those meeting their
/// threshold; landing in an off-diagonal cell of that joint flags it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfidentLearning;

impl ConfidentLearning {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Count matrix of (asserted class, confidently assigned class)
    pub fn confident_joint<S: AsRef<str>>(
        &self,
        labels: &[S],
        probabilities: ArrayView2<'_, f64>,
        le: &LabelEncoder,
    ) -> Result<Array2<usize>> {
        let assigned = self.confident_assignments(labels, probabilities, le)?;
        let y = le.transform_all(labels)?;
        let k = le.num_classes();

        let mut joint = Array2::zeros((k, k));
        for (i, latent) in assigned.iter().enumerate() {
            if let Some(latent) = latent {
                joint[[y[i], *latent]] += 1;
            }
        }
        Ok(joint)
    }

    /// Flag instances whose confident assignment differs from the asserted
    /// class
    pub fn flags<S: AsRef<str>>(
        &self,
        labels: &[S],
        probabilities: ArrayView2<'_, f64>,
        le: &LabelEncoder,
    ) -> Result<Vec<bool>> {
        let assigned = self.confident_assignments(labels, probabilities, le)?;
        let y = le.transform_all(labels)?;

        Ok(assigned
            .iter()
            .zip(y)
            .map(|(latent, asserted)| matches!(latent, Some(l) if *l != asserted))
            .collect())
    }

    /// Confidently assigned latent class per instance, `None` when no class
    /// meets its threshold
    fn confident_assignments<S: AsRef<str>>(
        &self,
        labels: &[S],
        probabilities: ArrayView2<'_, f64>,
        le: &LabelEncoder,
    ) -> Result<Vec<Option<usize>>> {
        let n = labels.len();
        let k = le.num_classes();
        if probabilities.nrows() != n {
            return Err(Error::LengthMismatch {
                what: "probabilities",
                expected: n,
                actual: probabilities.nrows(),
            });
        }
        if probabilities.ncols() != k {
            return Err(Error::ClassCountMismatch {
                expected: k,
                actual: probabilities.ncols(),
            });
        }

        let y = le.transform_all(labels)?;

        // Per-class mean confidence over instances asserted as that class;
        // classes never asserted can never be confidently assigned
        let mut sums = vec![0.0_f64; k];
        let mut counts = vec![0usize; k];
        for (i, &class) in y.iter().enumerate() {
            sums[class] += probabilities[[i, class]].clamp(0.0, 1.0);
            counts[class] += 1;
        }
        let thresholds: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::INFINITY })
            .collect();

        Ok((0..n)
            .map(|i| {
                let mut best: Option<(usize, f64)> = None;
                for j in 0..k {
                    let p = probabilities[[i, j]].clamp(0.0, 1.0);
                    if p >= thresholds[j] && best.map_or(true, |(_, bp)| p > bp) {
                        best = Some((j, p));
                    }
                }
                best.map(|(j, _)| j)
            })
            .collect())
    }
}

impl Detector for ConfidentLearning {
    fn name(&self) -> &'static str {
        "confident_learning"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[
            InputKind::Labels,
            InputKind::Probabilities,
            InputKind::LabelEncoding,
        ]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        let flags = self.flags(
            input.labels()?,
            input.probabilities()?,
            input.label_encoder()?,
        )?;
        Ok(DetectorOutput::Flags(flags))
    }
}
