//! Label encoding

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bijection between label strings and contiguous class indices.
///
/// Classes are stored sorted, so any two encoders fit on the same label set
/// agree on the index order. Probability matrix columns are always interpreted
/// through this ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder on the distinct labels observed in `labels`
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut classes: Vec<String> = labels.iter().map(|s| s.as_ref().to_owned()).collect();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    /// The distinct classes in index order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Whether the encoder holds no classes
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Map a label to its class index
    pub fn transform(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| Error::UnknownLabel(label.to_owned()))
    }

    /// Map a slice of labels to class indices
    pub fn transform_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.transform(l.as_ref())).collect()
    }

    /// Map a class index back to its label
    pub fn inverse_transform(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::InvalidParameter(format!("class index {index} out of range")))
    }
}
