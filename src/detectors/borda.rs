//! Borda-count rank aggregation

use crate::error::{Error, Result};
use ndarray::ArrayView2;

/// Combines several score/vote vectors into one consensus ranking.
///
/// Each voter's row is converted to ordinal ranks (highest value gets rank
/// 1, ties broken by stable ordinal position); a candidate earns
/// `n - rank` points per voter and the points are summed across voters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BordaCount;

impl BordaCount {
    /// Create the aggregator
    pub fn new() -> Self {
        Self
    }

    /// Consensus score per candidate.
    ///
    /// `votes` has one row per voter and one column per candidate; entries
    /// are raw scores or already-assigned ranks - only their within-row
    /// ordering matters.
    pub fn score(&self, votes: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        let num_candidates = votes.ncols();
        if votes.nrows() == 0 {
            return Err(Error::InvalidParameter("vote matrix has no voters".into()));
        }

        let mut consensus = vec![0.0_f64; num_candidates];
        for row in votes.rows() {
            let row: Vec<f64> = row.to_vec();
            for (candidate, rank) in ordinal_ranks_descending(&row).into_iter().enumerate() {
                consensus[candidate] += (num_candidates - rank) as f64;
            }
        }

        Ok(consensus)
    }

    /// Candidate indices sorted by descending consensus score, ties broken
    /// by stable ordinal position
    pub fn ranking(&self, votes: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        let consensus = self.score(votes)?;
        let mut order: Vec<usize> = (0..consensus.len()).collect();
        order.sort_by(|&a, &b| {
            consensus[b]
                .partial_cmp(&consensus[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        Ok(order)
    }
}

/// 1-based ordinal ranks, largest value first; equal values keep their
/// original relative order
pub fn ordinal_ranks_descending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut ranks = vec![0usize; values.len()];
    for (rank, &idx) in order.iter().enumerate() {
        ranks[idx] = rank + 1;
    }
    ranks
}
