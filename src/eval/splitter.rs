//! Fold splitters for cross-validation
//!
//! Three policies behind [`CrossValidator`]:
//! - [`KFold`]: k contiguous eval blocks over (optionally shuffled) indices
//! - [`StratifiedKFold`]: per-class round-robin assignment so every fold's
//!   label distribution approximates the whole set's
//! - single split: eval == train == all indices, the k = 1 diagnostics mode
//!
//! Every index lands in the eval set of exactly one fold. Shuffling uses an
//! explicit seeded [`StdRng`]; there is no ambient random state.

use crate::data::LabelEncoder;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One train/eval index partition
pub type Fold = (Vec<usize>, Vec<usize>);

/// K-Fold cross-validation splitter
#[derive(Clone, Debug)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    /// Create a new KFold splitter
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: 42,
        }
    }

    /// Set random seed for shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Disable shuffling
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Generate train/eval indices for each fold
    pub fn split(&self, n_samples: usize) -> Vec<Fold> {
        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            indices.shuffle(&mut rng);
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for i in 0..self.n_splits {
            let extra = usize::from(i < remainder);
            let end = start + fold_size + extra;

            let eval_indices: Vec<usize> = indices[start..end].to_vec();
            let train_indices: Vec<usize> = indices[..start]
                .iter()
                .chain(indices[end..].iter())
                .copied()
                .collect();

            folds.push((train_indices, eval_indices));
            start = end;
        }

        folds
    }
}

/// Stratified K-Fold splitter for classification tasks.
///
/// Indices are grouped by label, shuffled within each group, and dealt to
/// folds round-robin with a per-class starting offset, keeping each fold's
/// per-class count within one of the ideal share.
#[derive(Clone, Debug)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a new stratified splitter
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits, seed: 42 }
    }

    /// Set random seed for shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate train/eval indices for each fold, stratified by `labels`
    pub fn split<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<Fold>> {
        let n_samples = labels.len();
        let le = LabelEncoder::fit(labels);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); le.num_classes()];
        for (i, label) in labels.iter().enumerate() {
            by_class[le.transform(label.as_ref())?].push(i);
        }

        let mut fold_of = vec![0usize; n_samples];
        for (class, mut members) in by_class.into_iter().enumerate() {
            members.shuffle(&mut rng);
            for (j, idx) in members.into_iter().enumerate() {
                // Staggered start spreads per-class remainders across folds
                fold_of[idx] = (j + class) % self.n_splits;
            }
        }

        let mut folds: Vec<Fold> = (0..self.n_splits)
            .map(|_| (Vec::new(), Vec::new()))
            .collect();
        for (idx, &fold) in fold_of.iter().enumerate() {
            for (f, (train, eval)) in folds.iter_mut().enumerate() {
                if f == fold {
                    eval.push(idx);
                } else {
                    train.push(idx);
                }
            }
        }

        Ok(folds)
    }
}

/// The fold policy selected for a cross-validation run
#[derive(Clone, Debug)]
pub enum CrossValidator {
    /// Stratified k-fold (k >= 2, classification tasks)
    Stratified(StratifiedKFold),
    /// Plain k-fold (k >= 2)
    Plain(KFold),
    /// Train and evaluate on all the same data (k = 1)
    SingleSplit,
}

impl CrossValidator {
    /// Produce the fold partitions for `n_samples` instances.
    ///
    /// `labels` is consulted only by the stratified policy and must then be
    /// index-aligned with the instances.
    pub fn split<S: AsRef<str>>(&self, n_samples: usize, labels: Option<&[S]>) -> Result<Vec<Fold>> {
        match self {
            CrossValidator::Stratified(kf) => {
                let labels = labels.ok_or(Error::MissingInput("labels"))?;
                if labels.len() != n_samples {
                    return Err(Error::LengthMismatch {
                        what: "stratification labels",
                        expected: n_samples,
                        actual: labels.len(),
                    });
                }
                kf.split(labels)
            }
            CrossValidator::Plain(kf) => Ok(kf.split(n_samples)),
            CrossValidator::SingleSplit => {
                let all: Vec<usize> = (0..n_samples).collect();
                Ok(vec![(all.clone(), all)])
            }
        }
    }
}

/// Select the fold policy for `n_splits`.
///
/// `n_splits == 1` yields the degenerate single split; `n_splits < 1` is a
/// caller contract breach and is rejected.
pub fn cross_validator(n_splits: usize, stratified: bool, seed: u64) -> Result<CrossValidator> {
    if n_splits < 1 {
        return Err(Error::InvalidParameter(
            "n_splits must be >= 1".into(),
        ));
    }

    if n_splits == 1 {
        return Ok(CrossValidator::SingleSplit);
    }

    if stratified {
        Ok(CrossValidator::Stratified(
            StratifiedKFold::new(n_splits).with_seed(seed),
        ))
    } else {
        Ok(CrossValidator::Plain(KFold::new(n_splits).with_seed(seed)))
    }
}
