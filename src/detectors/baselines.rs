//! Majority-label baselines
//!
//! Cheap label-only baselines: an instance is suspect when its label
//! disagrees with the majority, either over the whole dataset or within the
//! group of instances sharing its surface form.

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::error::Result;
use std::collections::HashMap;

/// Flags instances whose label differs from the most frequent label overall.
///
/// Ties between equally frequent labels are broken by first occurrence.
#[derive(Clone, Copy, Debug, Default)]
pub struct MajorityLabelBaseline;

impl MajorityLabelBaseline {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Flag every label that is not the overall majority label
    pub fn flags<S: AsRef<str>>(&self, labels: &[S]) -> Vec<bool> {
        match majority_label(labels.iter().map(|l| l.as_ref())) {
            Some(majority) => labels.iter().map(|l| l.as_ref() != majority).collect(),
            None => Vec::new(),
        }
    }
}

impl Detector for MajorityLabelBaseline {
    fn name(&self) -> &'static str {
        "majority_label_baseline"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::Labels]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        Ok(DetectorOutput::Flags(self.flags(input.labels()?)))
    }
}

/// Flags instances whose label is a minority within the group of instances
/// sharing the same surface form.
///
/// Singleton groups and groups whose majority is tied never flag anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct MajorityLabelPerSurfaceFormBaseline;

impl MajorityLabelPerSurfaceFormBaseline {
    /// Create the detector
    pub fn new() -> Self {
        Self
    }

    /// Flag minority labels within each surface-form group
    pub fn flags<S: AsRef<str>>(&self, texts: &[S], labels: &[S]) -> Result<Vec<bool>> {
        if texts.len() != labels.len() {
            return Err(crate::error::Error::LengthMismatch {
                what: "texts",
                expected: labels.len(),
                actual: texts.len(),
            });
        }

        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, text) in texts.iter().enumerate() {
            groups.entry(text.as_ref()).or_default().push(i);
        }

        let mut flags = vec![false; labels.len()];
        for members in groups.values() {
            if members.len() < 2 {
                continue;
            }

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &i in members {
                *counts.entry(labels[i].as_ref()).or_default() += 1;
            }

            let top = counts.values().copied().max().unwrap_or(0);
            let leaders: Vec<&str> = counts
                .iter()
                .filter(|(_, &c)| c == top)
                .map(|(&l, _)| l)
                .collect();
            if leaders.len() != 1 {
                continue;
            }

            for &i in members {
                flags[i] = labels[i].as_ref() != leaders[0];
            }
        }

        Ok(flags)
    }
}

impl Detector for MajorityLabelPerSurfaceFormBaseline {
    fn name(&self) -> &'static str {
        "majority_label_per_surface_form_baseline"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::Texts, InputKind::Labels]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        let flags = self.flags(input.texts()?, input.labels()?)?;
        Ok(DetectorOutput::Flags(flags))
    }
}

/// Most frequent label, ties broken by first occurrence
fn majority_label<'a>(labels: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, label) in labels.enumerate() {
        let entry = counts.entry(label).or_insert((0, pos));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(label, _)| label)
}
