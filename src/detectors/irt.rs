//! Item-response-theory flagger

use super::input::{DetectorInput, DetectorOutput, InputKind};
use super::Detector;
use crate::error::{Error, Result};
use ndarray::Array2;

/// Probability floor keeping the standardized residuals finite
const P_CLAMP: f64 = 1e-6;

/// Fits a Rasch (one-parameter logistic) latent-trait model treating each
/// instance as an item and each ensemble member as a respondent; the binary
/// response is whether the member's prediction agrees with the noisy label.
///
/// After a fixed budget of gradient-ascent iterations, items whose outfit
/// mean-square (mean squared standardized residual across respondents)
/// exceeds the threshold are flagged: their response pattern is inconsistent
/// with the fitted abilities and difficulties.
#[derive(Clone, Copy, Debug)]
pub struct ItemResponseTheoryFlagger {
    num_iters: usize,
    learning_rate: f64,
    outfit_threshold: f64,
}

impl ItemResponseTheoryFlagger {
    /// Create a flagger with the given iteration budget
    pub fn new(num_iters: usize) -> Self {
        Self {
            num_iters,
            learning_rate: 0.1,
            outfit_threshold: 2.0,
        }
    }

    /// Set the gradient-ascent step size
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the outfit mean-square flag threshold
    pub fn with_outfit_threshold(mut self, outfit_threshold: f64) -> Self {
        self.outfit_threshold = outfit_threshold;
        self
    }

    /// Flag items with misfitting response patterns
    pub fn flags<S: AsRef<str>>(
        &self,
        labels: &[S],
        ensemble_predictions: &Array2<String>,
    ) -> Result<Vec<bool>> {
        let num_items = labels.len();
        let num_respondents = ensemble_predictions.ncols();
        if ensemble_predictions.nrows() != num_items {
            return Err(Error::LengthMismatch {
                what: "ensemble_predictions",
                expected: num_items,
                actual: ensemble_predictions.nrows(),
            });
        }
        if num_respondents == 0 {
            return Err(Error::InvalidParameter(
                "ensemble_predictions has no voters".into(),
            ));
        }
        if num_items == 0 {
            return Ok(Vec::new());
        }

        // Binary response matrix: does respondent m agree with the label?
        let mut responses = Array2::zeros((num_items, num_respondents));
        for i in 0..num_items {
            for m in 0..num_respondents {
                if ensemble_predictions[[i, m]] == labels[i].as_ref() {
                    responses[[i, m]] = 1.0;
                }
            }
        }

        let (ability, difficulty) = self.fit(&responses);

        let outfit = outfit_statistics(&responses, &ability, &difficulty);
        Ok(outfit.into_iter().map(|o| o > self.outfit_threshold).collect())
    }

    /// Gradient ascent on the Rasch log-likelihood for the iteration budget
    fn fit(&self, responses: &Array2<f64>) -> (Vec<f64>, Vec<f64>) {
        let (num_items, num_respondents) = responses.dim();
        let mut ability = vec![0.0_f64; num_respondents];
        let mut difficulty = vec![0.0_f64; num_items];

        for _ in 0..self.num_iters {
            let mut ability_grad = vec![0.0_f64; num_respondents];
            let mut difficulty_grad = vec![0.0_f64; num_items];

            for i in 0..num_items {
                for m in 0..num_respondents {
                    let residual = responses[[i, m]] - sigmoid(ability[m] - difficulty[i]);
                    ability_grad[m] += residual;
                    difficulty_grad[i] -= residual;
                }
            }

            for (theta, grad) in ability.iter_mut().zip(&ability_grad) {
                *theta += self.learning_rate * grad / num_items as f64;
            }
            for (b, grad) in difficulty.iter_mut().zip(&difficulty_grad) {
                *b += self.learning_rate * grad / num_respondents as f64;
            }
        }

        (ability, difficulty)
    }
}

impl Detector for ItemResponseTheoryFlagger {
    fn name(&self) -> &'static str {
        "item_response_theory_flagger"
    }

    fn requirements(&self) -> &'static [InputKind] {
        &[InputKind::Labels, InputKind::EnsemblePredictions]
    }

    fn score(&self, input: &DetectorInput<'_>) -> Result<DetectorOutput> {
        let flags = self.flags(input.labels()?, input.ensemble_predictions()?)?;
        Ok(DetectorOutput::Flags(flags))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Outfit mean-square per item: mean over respondents of
/// `(r - p)^2 / (p (1 - p))`, with `p` clamped away from 0 and 1
fn outfit_statistics(
    responses: &Array2<f64>,
    ability: &[f64],
    difficulty: &[f64],
) -> Vec<f64> {
    let (num_items, num_respondents) = responses.dim();
    (0..num_items)
        .map(|i| {
            let total: f64 = (0..num_respondents)
                .map(|m| {
                    let p = sigmoid(ability[m] - difficulty[i]).clamp(P_CLAMP, 1.0 - P_CLAMP);
                    (responses[[i, m]] - p).powi(2) / (p * (1.0 - p))
                })
                .sum();
            total / num_respondents as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensemble(rows: Vec<Vec<&str>>) -> Array2<String> {
        let cols = rows[0].len();
        Array2::from_shape_vec(
            (rows.len(), cols),
            rows.into_iter()
                .flatten()
                .map(str::to_owned)
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_outfit_statistic_values() {
        // One item, one respondent: r = 1 with p = sigmoid(0 - b)
        let responses = Array2::from_shape_vec((1, 1), vec![1.0]).unwrap();

        // p = 0.5: z^2 = 0.25 / 0.25 = 1
        let outfit = outfit_statistics(&responses, &[0.0], &[0.0]);
        assert!((outfit[0] - 1.0).abs() < 1e-9);

        // Very unexpected success (p near 0) blows up the statistic
        let outfit = outfit_statistics(&responses, &[-4.0], &[0.0]);
        assert!(outfit[0] > 10.0);
    }

    #[test]
    fn test_consistent_responses_do_not_flag() {
        // Every respondent agrees with every label
        let labels = vec!["A"; 8];
        let votes = ensemble(vec![vec!["A", "A", "A"]; 8]);

        let flags = ItemResponseTheoryFlagger::new(200)
            .flags(&labels, &votes)
            .unwrap();
        assert_eq!(flags, vec![false; 8]);
    }

    #[test]
    fn test_zero_iterations_scores_every_item_as_expected() {
        // With no fitting, p = 0.5 everywhere and every item has outfit 1
        let labels = vec!["A", "B"];
        let votes = ensemble(vec![vec!["A", "B", "A"], vec!["B", "B", "A"]]);

        let flags = ItemResponseTheoryFlagger::new(0)
            .flags(&labels, &votes)
            .unwrap();
        assert_eq!(flags, vec![false, false]);
    }

    #[test]
    fn test_inverted_item_is_flagged() {
        // Respondents 1 and 2 (weak) miss items 0..9 which respondents 3..5
        // (strong) answer; the last item inverts that pattern, which no
        // ability/difficulty assignment can explain
        let mut labels: Vec<&str> = vec!["X"; 10];
        labels.push("X");

        let mut rows: Vec<Vec<&str>> = (0..10)
            .map(|_| vec!["Y", "Y", "X", "X", "X"])
            .collect();
        rows.push(vec!["X", "X", "Y", "Y", "Y"]);
        let votes = ensemble(rows);

        let flags = ItemResponseTheoryFlagger::new(1000)
            .flags(&labels, &votes)
            .unwrap();

        assert!(!flags[..10].iter().any(|&f| f));
        assert!(flags[10]);
    }

    #[test]
    fn test_rejects_empty_ensemble() {
        let votes = Array2::<String>::from_shape_vec((2, 0), Vec::new()).unwrap();
        assert!(ItemResponseTheoryFlagger::new(10)
            .flags(&["A", "B"], &votes)
            .is_err());
    }
}
