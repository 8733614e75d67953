//! End-to-end pipeline tests: cross-validation feeding the detector library
//!
//! Uses a deterministic mock model whose outputs are a pure function of the
//! input text, so detector outputs are stable across runs.

use depurar::data::{LabelEncoder, RaggedArray, RaggedMatrix};
use depurar::detectors::{
    BordaCount, ClassificationEntropy, ClassificationUncertainty, Detector, DetectorInput,
    DropoutUncertainty, MajorityLabelPerSurfaceFormBaseline, PredictionMargin,
};
use depurar::error::Result;
use depurar::eval::CrossValidation;
use depurar::model::{SequenceTagger, TextClassifier};
use ndarray::Array2;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn unit_hash(text: &str, salt: u64) -> f64 {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    text.hash(&mut hasher);
    (hasher.finish() % 10_000) as f64 / 10_000.0
}

#[derive(Default)]
struct HashClassifier {
    le: LabelEncoder,
    supports_dropout: bool,
    dropout_enabled: bool,
    seed: u64,
}

impl HashClassifier {
    fn with_dropout() -> Self {
        Self {
            supports_dropout: true,
            ..Self::default()
        }
    }

    fn distribution(&self, text: &str) -> Vec<f64> {
        let k = self.le.num_classes();
        let mut weights: Vec<f64> = (0..k).map(|j| 0.05 + unit_hash(text, j as u64)).collect();
        if self.dropout_enabled {
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
        self.le.inverse_transform(argmax).unwrap().to_owned()
    }
}

impl TextClassifier for HashClassifier {
    fn name(&self) -> &str {
        "hash-classifier"
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
        Ok(Array2::from_shape_vec((x.len(), k), flat).unwrap())
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
    }
}

#[derive(Default)]
struct HashTagger {
    inner: HashClassifier,
}

impl SequenceTagger for HashTagger {
    fn name(&self) -> &str {
        "hash-tagger"
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
        let data = Array2::from_shape_vec((x.total_len(), k), flat).unwrap();
        RaggedMatrix::new(data, x.offsets().to_vec())
    }

    fn label_encoder(&self) -> &LabelEncoder {
        &self.inner.le
    }
}

fn dataset(n: usize) -> (Vec<String>, Vec<String>) {
    let labels = ["pos", "neg", "neu"];
    let texts: Vec<String> = (0..n).map(|i| format!("document {i}")).collect();
    let noisy: Vec<String> = (0..n).map(|i| labels[i % labels.len()].to_owned()).collect();
    (texts, noisy)
}

#[test]
fn test_flat_pipeline_with_probability_detectors() {
    let (texts, noisy) = dataset(30);
    let mut model = HashClassifier::default();

    let result = CrossValidation::new(5)
        .with_repetitions(0)
        .run(&texts, &noisy, &mut model)
        .unwrap();

    let input = DetectorInput::from_result(&result).with_labels(&noisy);

    let entropy = ClassificationEntropy::new().score(&input).unwrap();
    let uncertainty = ClassificationUncertainty::new().score(&input).unwrap();
    let margin = PredictionMargin::new().score(&input).unwrap();

    for output in [&entropy, &uncertainty, &margin] {
        assert_eq!(output.len(), 30);
        let scores = output.as_scores().unwrap();
        assert!(scores.iter().all(|s| s.is_finite()));
    }

    // Uncertainty matches the asserted-label probability exactly
    let scores = uncertainty.as_scores().unwrap();
    for (i, label) in noisy.iter().enumerate() {
        let class = result.le.transform(label).unwrap();
        let expected = 1.0 - result.probabilities[[i, class]];
        assert!((scores[i] - expected).abs() < 1e-12);
    }
}

#[test]
fn test_flat_pipeline_with_dropout_detector() {
    let (texts, noisy) = dataset(24);
    let mut model = HashClassifier::with_dropout();

    let result = CrossValidation::new(4)
        .with_repetitions(5)
        .run(&texts, &noisy, &mut model)
        .unwrap();

    let repeated = result.repeated_probabilities.as_ref().unwrap();
    assert_eq!(repeated.dim(), (24, 5, 3));

    let input = DetectorInput::from_result(&result);
    let scores = DropoutUncertainty::new().score(&input).unwrap();
    assert_eq!(scores.len(), 24);
    assert!(scores.as_scores().unwrap().iter().all(|&s| s >= 0.0));
}

#[test]
fn test_detector_scores_aggregate_with_borda() {
    let (texts, noisy) = dataset(21);
    let mut model = HashClassifier::default();

    let result = CrossValidation::new(3)
        .with_repetitions(0)
        .run(&texts, &noisy, &mut model)
        .unwrap();

    let input = DetectorInput::from_result(&result).with_labels(&noisy);
    let entropy = ClassificationEntropy::new().score(&input).unwrap().into_scores();
    let uncertainty = ClassificationUncertainty::new()
        .score(&input)
        .unwrap()
        .into_scores();

    let mut votes = Array2::zeros((2, 21));
    for (j, score) in entropy.iter().enumerate() {
        votes[[0, j]] = *score;
    }
    for (j, score) in uncertainty.iter().enumerate() {
        votes[[1, j]] = *score;
    }

    let consensus = BordaCount::new().score(votes.view()).unwrap();
    assert_eq!(consensus.len(), 21);

    let ranking = BordaCount::new().ranking(votes.view()).unwrap();
    let mut sorted = ranking.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..21).collect::<Vec<_>>());
}

#[test]
fn test_ragged_pipeline_with_surface_form_baseline() {
    let vocabulary = ["Obama", "Harvard", "Boston", "Paris", "Berlin"];
    let tags = ["PER", "LOC", "ORG"];

    let mut tokens = RaggedArray::new();
    let mut noisy = RaggedArray::new();
    let mut counter = 0usize;
    for s in 0..10 {
        let len = 1 + (s % 3);
        let mut token_row = Vec::new();
        let mut tag_row = Vec::new();
        for _ in 0..len {
            token_row.push(vocabulary[counter % vocabulary.len()].to_owned());
            tag_row.push(tags[counter % tags.len()].to_owned());
            counter += 1;
        }
        tokens.push_row(token_row);
        noisy.push_row(tag_row);
    }

    let mut model = HashTagger::default();
    let result = CrossValidation::new(3)
        .with_repetitions(0)
        .run_ragged(&tokens, &noisy, &mut model)
        .unwrap();

    assert_eq!(result.num_instances(), tokens.total_len());

    // Detectors run on the flattened sub-unit space
    let flat_tokens = tokens.flat().to_vec();
    let flat_tags = noisy.flat().to_vec();
    let input = DetectorInput::from_result(&result)
        .with_texts(&flat_tokens)
        .with_labels(&flat_tags);

    let flags = MajorityLabelPerSurfaceFormBaseline::new()
        .score(&input)
        .unwrap();
    assert_eq!(flags.len(), tokens.total_len());

    let entropy = ClassificationEntropy::new().score(&input).unwrap();
    assert_eq!(entropy.len(), tokens.total_len());
}
