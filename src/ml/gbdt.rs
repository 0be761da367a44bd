//! Gradient-boosted decision stumps for binary classification.
//!
//! Logistic loss, Newton-step leaf values, exhaustive split search over
//! midpoints of distinct feature values. Fully deterministic: features are
//! scanned in index order, ties keep the first candidate, and there is no
//! row or feature subsampling — the same data and params always produce a
//! bit-identical model.

use serde::{Deserialize, Serialize};

use crate::error::{MintscoreError, Result};

/// L2 regularization on leaf weights.
const LAMBDA: f64 = 1.0;
/// Splits below this gain stop the boosting loop.
const MIN_GAIN: f64 = 1e-12;
/// Clamp for the base-rate log-odds when one class is absent.
const PROB_CLAMP: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbdtParams {
    pub rounds: usize,
    pub learning_rate: f64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.05,
        }
    }
}

/// One depth-1 tree. Leaf values are stored pre-scaled by the learning
/// rate, so prediction is just `base_score + Σ stump(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    pub feature: usize,
    pub threshold: f64,
    pub left_value: f64,
    pub right_value: f64,
}

impl Stump {
    fn value(&self, row: &[f64]) -> f64 {
        if row[self.feature] <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtClassifier {
    pub n_features: usize,
    /// Log-odds of the training base rate
    pub base_score: f64,
    pub stumps: Vec<Stump>,
    /// Accumulated split gain per feature
    pub split_gains: Vec<f64>,
}

struct SplitCandidate {
    gain: f64,
    feature: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

impl GbdtClassifier {
    /// Fit on a row-major standardized feature matrix and boolean labels.
    pub fn fit(matrix: &[Vec<f64>], labels: &[bool], params: GbdtParams) -> Result<Self> {
        let rows = matrix.len();
        if rows == 0 {
            return Err(MintscoreError::Validation(
                "cannot fit classifier on an empty matrix".to_string(),
            ));
        }
        if labels.len() != rows {
            return Err(MintscoreError::Validation(format!(
                "label count {} != row count {rows}",
                labels.len()
            )));
        }
        let n_features = matrix[0].len();
        if n_features == 0 {
            return Err(MintscoreError::Validation(
                "cannot fit classifier on zero-width rows".to_string(),
            ));
        }
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n_features {
                return Err(MintscoreError::Validation(format!(
                    "row {i} has width {} != {n_features}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(MintscoreError::Validation(format!(
                    "row {i} contains non-finite values"
                )));
            }
        }
        if params.rounds == 0 || params.learning_rate <= 0.0 {
            return Err(MintscoreError::Validation(
                "boosting params must be positive".to_string(),
            ));
        }

        let positives = labels.iter().filter(|l| **l).count();
        let base_rate = (positives as f64 / rows as f64).clamp(PROB_CLAMP, 1.0 - PROB_CLAMP);
        let base_score = (base_rate / (1.0 - base_rate)).ln();

        let mut scores = vec![base_score; rows];
        let mut stumps = Vec::new();
        let mut split_gains = vec![0.0; n_features];

        // Pre-sorted row indices per feature; the value ordering never
        // changes across rounds, only the gradients do.
        let sorted_rows: Vec<Vec<usize>> = (0..n_features)
            .map(|feature| {
                let mut order: Vec<usize> = (0..rows).collect();
                order.sort_by(|&a, &b| {
                    matrix[a][feature]
                        .partial_cmp(&matrix[b][feature])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                order
            })
            .collect();

        for _round in 0..params.rounds {
            let mut grad = vec![0.0; rows];
            let mut hess = vec![0.0; rows];
            for i in 0..rows {
                let p = sigmoid(scores[i]);
                grad[i] = if labels[i] { 1.0 - p } else { -p };
                hess[i] = p * (1.0 - p);
            }
            let total_grad: f64 = grad.iter().sum();
            let total_hess: f64 = hess.iter().sum();
            let root_score = total_grad * total_grad / (total_hess + LAMBDA);

            let mut best: Option<SplitCandidate> = None;
            for (feature, order) in sorted_rows.iter().enumerate() {
                let mut left_grad = 0.0;
                let mut left_hess = 0.0;
                for pair in order.windows(2) {
                    let (row, next) = (pair[0], pair[1]);
                    left_grad += grad[row];
                    left_hess += hess[row];

                    let value = matrix[row][feature];
                    let next_value = matrix[next][feature];
                    if value == next_value {
                        continue;
                    }

                    let right_grad = total_grad - left_grad;
                    let right_hess = total_hess - left_hess;
                    let gain = left_grad * left_grad / (left_hess + LAMBDA)
                        + right_grad * right_grad / (right_hess + LAMBDA)
                        - root_score;

                    let is_better = match &best {
                        Some(candidate) => gain > candidate.gain,
                        None => gain > MIN_GAIN,
                    };
                    if is_better {
                        best = Some(SplitCandidate {
                            gain,
                            feature,
                            threshold: (value + next_value) / 2.0,
                            left_value: params.learning_rate * left_grad / (left_hess + LAMBDA),
                            right_value: params.learning_rate * right_grad / (right_hess + LAMBDA),
                        });
                    }
                }
            }

            let Some(split) = best else {
                // No split improves the loss; later rounds see the same
                // gradients, so boosting is done.
                break;
            };

            let stump = Stump {
                feature: split.feature,
                threshold: split.threshold,
                left_value: split.left_value,
                right_value: split.right_value,
            };
            for (score, row) in scores.iter_mut().zip(matrix) {
                *score += stump.value(row);
            }
            split_gains[split.feature] += split.gain;
            stumps.push(stump);
        }

        Ok(Self {
            n_features,
            base_score,
            stumps,
            split_gains,
        })
    }

    /// Probability of the positive class for one standardized row.
    pub fn predict_probability(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(MintscoreError::Validation(format!(
                "classifier width mismatch: got {}, expected {}",
                row.len(),
                self.n_features
            )));
        }
        let score: f64 = self.base_score + self.stumps.iter().map(|s| s.value(row)).sum::<f64>();
        Ok(sigmoid(score))
    }

    /// Per-feature importance: split gains normalized to sum to 1 (all
    /// zeros if no split was ever made).
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.split_gains.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.n_features];
        }
        self.split_gains.iter().map(|g| g / total).collect()
    }
}

// Numerically-stable sigmoid.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
