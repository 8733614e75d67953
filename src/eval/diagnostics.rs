//! Structured advisory channel for non-fatal findings
//!
//! The pipeline never surfaces advisories through ambient warnings; they are
//! collected here and returned inside the evaluation result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single non-fatal advisory emitted during an evaluation run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Two stochastic repetitions produced numerically indistinguishable
    /// probabilities; the dropout mechanism may not be effective.
    DegenerateRepetitions { first: usize, second: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateRepetitions { first, second } => write!(
                f,
                "stochastic inference promised varying outputs, but repetitions \
                 {first} and {second} are numerically indistinguishable"
            ),
        }
    }
}

/// Collected advisories for one evaluation run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an advisory
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// The recorded advisories in emission order
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of recorded advisories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the recorded advisories
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}
