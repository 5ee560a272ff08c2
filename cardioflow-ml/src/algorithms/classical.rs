//! Logistic regression fitted by full-batch gradient descent.

use crate::config::TrainingConfig;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Fitted binary logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub threshold: f64,
}

impl LogisticRegression {
    /// Fit on `rows` (all the same width) against 0/1 `labels`.
    ///
    /// Minimises mean log-loss plus `l2_penalty / 2 * |w|^2`; the bias is not
    /// penalised. Weights start at zero, so fitting is deterministic.
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[u8],
        config: &TrainingConfig,
    ) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::training("no training rows"));
        }
        if rows.len() != labels.len() {
            return Err(PipelineError::training(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let width = rows[0].len();
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(PipelineError::training(format!(
                "row {bad} has {} features, expected {width}",
                rows[bad].len()
            )));
        }

        let n = rows.len() as f64;
        let mut weights = vec![0.0; width];
        let mut bias = 0.0;

        for _ in 0..config.epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (row, &label) in rows.iter().zip(labels) {
                let err = sigmoid(dot(&weights, row) + bias) - f64::from(label);
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += err * x;
                }
                grad_b += err;
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= config.learning_rate * (g / n + config.l2_penalty * *w);
            }
            bias -= config.learning_rate * grad_b / n;
        }

        Ok(Self {
            weights,
            bias,
            threshold: config.threshold,
        })
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Probability of the positive class for one row.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(dot(&self.weights, row) + self.bias)
    }

    pub fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.predict_proba(row) >= self.threshold)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
