//! Repeated stochastic probability sampling
//!
//! Runs a fitted model under stochastic-inference mode T times to obtain a
//! distribution of probability vectors per instance. Each repetition gets a
//! distinct, explicitly derived seed so it is reproducible in isolation, and
//! the model is toggled back out of stochastic mode after every pass.
//!
//! After collection, every pair of repetitions is compared numerically; an
//! indistinguishable pair means the stochasticity mechanism may not be
//! effective and is reported as a non-fatal [`Diagnostic`] on the run.

use super::diagnostics::{Diagnostic, Diagnostics};
use crate::data::RaggedArray;
use crate::error::{Error, Result};
use crate::model::{SequenceTagger, TextClassifier};
use ndarray::{s, Array2, Array3};
use tracing::debug;

/// Fixed offset added to the repetition index to form its seed
pub const REPETITION_SEED_OFFSET: u64 = 23;

/// Two repetitions closer than this everywhere are considered degenerate
const DEGENERACY_TOLERANCE: f64 = 1e-8;

/// Collect `num_repetitions` stochastic probability samples on a flat batch.
///
/// Returns an array of shape (instances, T, classes). Degenerate sample pairs
/// are recorded in `diagnostics`; they never abort the run.
pub fn repeated_probabilities_flat<M>(
    model: &mut M,
    x: &[String],
    num_repetitions: usize,
    diagnostics: &mut Diagnostics,
) -> Result<Array3<f64>>
where
    M: TextClassifier + ?Sized,
{
    if num_repetitions == 0 {
        return Err(Error::InvalidParameter(
            "num_repetitions must be > 0".into(),
        ));
    }

    let mut samples: Vec<Array2<f64>> = Vec::with_capacity(num_repetitions);

    for t in 0..num_repetitions {
        debug!(
            model = model.name(),
            repetition = t + 1,
            total = num_repetitions,
            "obtaining stochastic probabilities"
        );

        model.reseed(REPETITION_SEED_OFFSET + t as u64);
        model.use_dropout(true);
        let probas = model.predict_proba(x);
        model.use_dropout(false);
        let probas = probas?;

        if probas.nrows() != x.len() {
            return Err(Error::LengthMismatch {
                what: "stochastic probabilities",
                expected: x.len(),
                actual: probas.nrows(),
            });
        }
        if let Some(first) = samples.first() {
            if probas.ncols() != first.ncols() {
                return Err(Error::ClassCountMismatch {
                    expected: first.ncols(),
                    actual: probas.ncols(),
                });
            }
        }

        samples.push(probas);
    }

    check_degeneracy(&samples, diagnostics);
    Ok(stack_repetitions(&samples))
}

/// Collect `num_repetitions` stochastic probability samples on a ragged
/// batch, flattened to the sub-unit index space.
///
/// Returns an array of shape (total sub-units, T, classes).
pub fn repeated_probabilities_ragged<M>(
    model: &mut M,
    x: &RaggedArray<String>,
    num_repetitions: usize,
    diagnostics: &mut Diagnostics,
) -> Result<Array3<f64>>
where
    M: SequenceTagger + ?Sized,
{
    if num_repetitions == 0 {
        return Err(Error::InvalidParameter(
            "num_repetitions must be > 0".into(),
        ));
    }

    let mut samples: Vec<Array2<f64>> = Vec::with_capacity(num_repetitions);

    for t in 0..num_repetitions {
        debug!(
            model = model.name(),
            repetition = t + 1,
            total = num_repetitions,
            "obtaining stochastic probabilities"
        );

        model.reseed(REPETITION_SEED_OFFSET + t as u64);
        model.use_dropout(true);
        let probas = model.predict_proba(x);
        model.use_dropout(false);
        let probas = probas?;

        if probas.offsets() != x.offsets() {
            return Err(Error::LengthMismatch {
                what: "stochastic ragged probabilities",
                expected: x.total_len(),
                actual: probas.total_len(),
            });
        }
        if let Some(first) = samples.first() {
            if probas.num_classes() != first.ncols() {
                return Err(Error::ClassCountMismatch {
                    expected: first.ncols(),
                    actual: probas.num_classes(),
                });
            }
        }

        samples.push(probas.flat().to_owned());
    }

    check_degeneracy(&samples, diagnostics);
    Ok(stack_repetitions(&samples))
}

/// Stack per-repetition matrices (instances, classes) into
/// (instances, T, classes)
fn stack_repetitions(samples: &[Array2<f64>]) -> Array3<f64> {
    let num_instances = samples.first().map_or(0, |s| s.nrows());
    let num_classes = samples.first().map_or(0, |s| s.ncols());
    let mut stacked = Array3::zeros((num_instances, samples.len(), num_classes));

    for (t, sample) in samples.iter().enumerate() {
        stacked.slice_mut(s![.., t, ..]).assign(sample);
    }

    stacked
}

/// Pairwise-compare repetitions; record indistinguishable pairs
fn check_degeneracy(samples: &[Array2<f64>], diagnostics: &mut Diagnostics) {
    for a in 0..samples.len() {
        for b in (a + 1)..samples.len() {
            if all_close(&samples[a], &samples[b]) {
                diagnostics.push(Diagnostic::DegenerateRepetitions {
                    first: a,
                    second: b,
                });
            }
        }
    }
}

fn all_close(a: &Array2<f64>, b: &Array2<f64>) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= DEGENERACY_TOLERANCE)
}
