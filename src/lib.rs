//! Annotation-error detection for text classification and sequence labeling
//!
//! `depurar` flags likely-mislabeled instances in annotated datasets by
//! comparing the asserted (noisy) labels against signals obtained from models
//! trained on that same data under cross-validation.
//!
//! ## Architecture
//!
//! - `data`: label encoding and ragged (offsets + flat buffer) collections
//! - `model`: the capability traits concrete models implement
//! - `eval`: fold splitting, repeated stochastic sampling, and the
//!   cross-validation orchestrator that produces an [`EvalResult`]
//! - `detectors`: scoring algorithms mapping labels + model signals to
//!   per-instance suspicion scores or flags, plus Borda-count aggregation
//!
//! ## Example
//!
//! ```ignore
//! use depurar::detectors::{ClassificationEntropy, Detector, DetectorInput};
//! use depurar::eval::CrossValidation;
//!
//! let result = CrossValidation::new(10)
//!     .with_repetitions(50)
//!     .run(&texts, &noisy_labels, &mut model)?;
//!
//! let input = DetectorInput::from_result(&result).with_labels(&noisy_labels);
//! let scores = ClassificationEntropy::new().score(&input)?;
//! ```

pub mod data;
pub mod detectors;
pub mod error;
pub mod eval;
pub mod model;

pub use data::{LabelEncoder, RaggedArray, RaggedMatrix};
pub use error::{Error, Result};
pub use eval::{CrossValidation, Diagnostic, Diagnostics, EvalResult};
pub use model::{SequenceTagger, TextClassifier};
