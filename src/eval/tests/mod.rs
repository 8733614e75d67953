//! Tests for the evaluation pipeline
//!
//! The mock models are pure functions of (input text, seed), so every test
//! is deterministic without a trained model in the loop.


use crate::data::{LabelEncoder, RaggedArray, RaggedMatrix};
use crate::error::Result;
use crate::model::{SequenceTagger, TextClassifier};
use ndarray::Array2;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic pseudo-random value in [0, 1) derived from text and salt
fn unit_hash(text: &str, salt: u64) -> f64 {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    text.hash(&mut hasher);
    (hasher.finish() % 10_000) as f64 / 10_000.0
}

/// Classifier whose outputs are a pure function of the input text and the
/// current (dropout mode, seed) state
pub struct MockClassifier {
    le: LabelEncoder,
    supports_dropout: bool,
    /// When false, dropout mode changes nothing - repetitions degenerate
    effective_dropout: bool,
    dropout_enabled: bool,
    seed: u64,
    pub received_seeds: Vec<u64>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            le: LabelEncoder::default(),
            supports_dropout: false,
            effective_dropout: true,
            dropout_enabled: false,
            seed: 0,
            received_seeds: Vec::new(),
        }
    }

    pub fn with_dropout() -> Self {
        Self {
            supports_dropout: true,
            ..Self::new()
        }
    }

    /// Declares dropout support but produces identical outputs per run
    pub fn with_broken_dropout() -> Self {
        Self {
            supports_dropout: true,
            effective_dropout: false,
            ..Self::new()
        }
    }

    fn distribution(&self, text: &str) -> Vec<f64> {
        let k = self.le.num_classes();
        let mut weights: Vec<f64> = (0..k)
            .map(|j| 0.05 + unit_hash(text, j as u64))
            .collect();

        if self.dropout_enabled && self.effective_dropout {
            for (j, w) in weights.iter_mut().enumerate() {
                *w += unit_hash(text, self.seed.wrapping_mul(31).wrapping_add(j as u64 + 1));
            }
        }

        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }

    fn predict_one(&self, text: &str) -> String {
        let dist = self.distribution(text);
        let argmax = dist
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(j, _)| j);
        self.le
            .inverse_transform(argmax)
            .expect("argmax within classes")
            .to_owned()
    }
}

impl TextClassifier for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn fit(&mut self, _x: &[String], y: &[String]) -> Result<()> {
        self.le = LabelEncoder::fit(y);
        Ok(())
    }

    fn predict(&self, x: &[String]) -> Result<Vec<String>> {
        Ok(x.iter().map(|t| self.predict_one(t)).collect())
    }

    fn predict_proba(&self, x: &[String]) -> Result<Array2<f64>> {
        let k = self.le.num_classes();
        let flat: Vec<f64> = x.iter().flat_map(|t| self.distribution(t)).collect();
        Ok(Array2::from_shape_vec((x.len(), k), flat).expect("rectangular distributions"))
    }

    fn label_encoder(&self) -> &LabelEncoder {
        &self.le
    }

    fn has_dropout(&self) -> bool {
        self.supports_dropout
    }

    fn use_dropout(&mut self, enabled: bool) {
        self.dropout_enabled = enabled;
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.received_seeds.push(seed);
    }
}

/// Classifier that silently drops the last prediction, breaking the
/// length contract
pub struct TruncatingClassifier {
    inner: MockClassifier,
}

impl TruncatingClassifier {
    pub fn new() -> Self {
        Self {
            inner: MockClassifier::new(),
        }
    }
}

impl TextClassifier for TruncatingClassifier {
    fn name(&self) -> &str {
        "truncating-classifier"
    }

    fn fit(&mut self, x: &[String], y: &[String]) -> Result<()> {
        self.inner.fit(x, y)
    }

    fn predict(&self, x: &[String]) -> Result<Vec<String>> {
        let mut predictions = self.inner.predict(x)?;
        predictions.pop();
        Ok(predictions)
    }

    fn predict_proba(&self, x: &[String]) -> Result<Array2<f64>> {
        self.inner.predict_proba(x)
    }

    fn label_encoder(&self) -> &LabelEncoder {
        self.inner.label_encoder()
    }
}

/// Sequence tagger counterpart of [`MockClassifier`]
pub struct MockTagger {
    inner: MockClassifier,
}

impl MockTagger {
    pub fn new() -> Self {
        Self {
            inner: MockClassifier::new(),
        }
    }

    pub fn with_dropout() -> Self {
        Self {
            inner: MockClassifier::with_dropout(),
        }
    }
}

impl SequenceTagger for MockTagger {
    fn name(&self) -> &str {
        "mock-tagger"
    }

    fn fit(&mut self, _x: &RaggedArray<String>, y: &RaggedArray<String>) -> Result<()> {
        self.inner.le = LabelEncoder::fit(y.flat());
        Ok(())
    }

    fn predict(&self, x: &RaggedArray<String>) -> Result<RaggedArray<String>> {
        Ok(x.rows()
            .map(|row| row.iter().map(|t| self.inner.predict_one(t)).collect())
            .collect())
    }

    fn predict_proba(&self, x: &RaggedArray<String>) -> Result<RaggedMatrix> {
        let k = self.inner.le.num_classes();
        let flat: Vec<f64> = x
            .flat()
            .iter()
            .flat_map(|t| self.inner.distribution(t))
            .collect();
        let data =
            Array2::from_shape_vec((x.total_len(), k), flat).expect("rectangular distributions");
        RaggedMatrix::new(data, x.offsets().to_vec())
    }

    fn label_encoder(&self) -> &LabelEncoder {
        &self.inner.le
    }

    fn has_dropout(&self) -> bool {
        self.inner.supports_dropout
    }

    fn use_dropout(&mut self, enabled: bool) {
        self.inner.dropout_enabled = enabled;
    }

    fn reseed(&mut self, seed: u64) {
        self.inner.seed = seed;
    }
}

/// Flat dataset: texts t0..t(n-1), labels cycling through the given set
pub fn flat_dataset(n: usize, labels: &[&str]) -> (Vec<String>, Vec<String>) {
    let texts: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
    let noisy: Vec<String> = (0..n).map(|i| labels[i % labels.len()].to_owned()).collect();
    (texts, noisy)
}

/// Ragged dataset with varying sentence lengths and cycling token labels
pub fn ragged_dataset(
    num_sentences: usize,
    labels: &[&str],
) -> (RaggedArray<String>, RaggedArray<String>) {
    let mut tokens = RaggedArray::new();
    let mut noisy = RaggedArray::new();
    let mut counter = 0usize;

    for s in 0..num_sentences {
        let len = 1 + (s % 4);
        let mut token_row = Vec::with_capacity(len);
        let mut label_row = Vec::with_capacity(len);
        for _ in 0..len {
            token_row.push(format!("w{counter}"));
            label_row.push(labels[counter % labels.len()].to_owned());
            counter += 1;
        }
        tokens.push_row(token_row);
        noisy.push_row(label_row);
    }

    (tokens, noisy)
}
