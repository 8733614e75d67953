//! Detector library
//!
//! Every detector is a pure, stateless transform from noisy labels plus
//! model-derived signals to one score or flag per instance, aligned
//! index-for-index with the input - detectors never reorder instances.
//! Required inputs are declared via [`Detector::requirements`]; everything
//! arrives through the named-parameter [`DetectorInput`] bundle and unused
//! fields are ignored.
//!
//! Degenerate probabilities (exact zeros and ones) are clamped inside each
//! detector, so scores stay finite; numerical edge cases never propagate as
//! errors.

mod baselines;
mod borda;
mod confident_learning;
mod dropout;
mod ensemble;
mod entropy;
mod input;
mod irt;
mod uncertainty;

pub use baselines::{MajorityLabelBaseline, MajorityLabelPerSurfaceFormBaseline};
pub use borda::{ordinal_ranks_descending, BordaCount};
pub use confident_learning::ConfidentLearning;
pub use dropout::DropoutUncertainty;
pub use ensemble::EnsembleDisagreement;
pub use entropy::ClassificationEntropy;
pub use input::{DetectorInput, DetectorOutput, InputKind};
pub use irt::ItemResponseTheoryFlagger;
pub use uncertainty::{ClassificationUncertainty, PredictionMargin};

use crate::error::Result;

/// A scoring algorithm over detector inputs.
///
/// Implementations read only the inputs named in `requirements` and return
/// one score or flag per instance.
pub trait Detector {
    /// Stable detector identifier
    fn name(&self) -> &'static str;

    /// The inputs this detector needs
    fn requirements(&self) -> &'static [InputKind];

    /// Score every instance
    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput>;
}
