//! Per-column standardization to zero mean and unit variance.

use crate::config::ConstantColumnPolicy;
use crate::data::table::FeatureMatrix;
use serde::{Deserialize, Serialize};

/// Column statistics fitted on a feature matrix.
///
/// Uses the population standard deviation (divisor `n`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
    pub constant_policy: ConstantColumnPolicy,
}

impl StandardScaler {
    /// Compute mean and standard deviation of every column of `matrix`.
    pub fn fit(matrix: &FeatureMatrix, constant_policy: ConstantColumnPolicy) -> Self {
        let (means, std_devs) = (0..matrix.width())
            .map(|idx| mean_and_std(&matrix.column(idx)))
            .unzip();

        Self {
            columns: matrix.columns.clone(),
            means,
            std_devs,
            constant_policy,
        }
    }

    /// Indices of zero-variance columns.
    pub fn constant_columns(&self) -> Vec<usize> {
        self.std_devs
            .iter()
            .enumerate()
            .filter(|(_, sd)| !is_scalable(**sd))
            .map(|(i, _)| i)
            .collect()
    }

    /// Rescale every value to `(x - mean) / std_dev`.
    pub fn transform(&self, matrix: &FeatureMatrix) -> FeatureMatrix {
        let rows = matrix
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, &x)| self.scale_value(i, x))
                    .collect()
            })
            .collect();

        FeatureMatrix {
            columns: matrix.columns.clone(),
            rows,
        }
    }

    pub fn fit_transform(
        matrix: &FeatureMatrix,
        constant_policy: ConstantColumnPolicy,
    ) -> (Self, FeatureMatrix) {
        let scaler = Self::fit(matrix, constant_policy);
        let scaled = scaler.transform(matrix);
        (scaler, scaled)
    }

    fn scale_value(&self, idx: usize, x: f64) -> f64 {
        let sd = self.std_devs[idx];
        if is_scalable(sd) {
            return (x - self.means[idx]) / sd;
        }
        match self.constant_policy {
            ConstantColumnPolicy::Zero => 0.0,
            ConstantColumnPolicy::Passthrough => x,
        }
    }
}

fn is_scalable(sd: f64) -> bool {
    sd > f64::EPSILON
}

/// Mean and population standard deviation of `values`.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        FeatureMatrix {
            columns: (0..width).map(|i| format!("f{i}")).collect(),
            rows,
        }
    }

    #[test]
    fn test_standardize_zero_mean_unit_variance() {
        let m = matrix(vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ]);
        let (scaler, scaled) = StandardScaler::fit_transform(&m, ConstantColumnPolicy::Zero);
        assert!((scaler.means[0] - 2.5).abs() < 1e-12);

        for idx in 0..2 {
            let (mean, sd) = mean_and_std(&scaled.column(idx));
            assert!(mean.abs() < 1e-9);
            assert!((sd - 1.0).abs() < 1e-9);
        }
        assert_eq!(scaled.columns, m.columns);
    }

    #[test]
    fn test_constant_column_zero_policy() {
        let m = matrix(vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]]);
        let (scaler, scaled) = StandardScaler::fit_transform(&m, ConstantColumnPolicy::Zero);
        assert_eq!(scaler.constant_columns(), vec![0]);
        assert!(scaled.column(0).iter().all(|v| *v == 0.0));
        assert!(scaled.rows.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_constant_column_passthrough_policy() {
        let m = matrix(vec![vec![5.0, 1.0], vec![5.0, 2.0]]);
        let (_, scaled) = StandardScaler::fit_transform(&m, ConstantColumnPolicy::Passthrough);
        assert_eq!(scaled.column(0), vec![5.0, 5.0]);
    }

    #[test]
    fn test_empty_matrix() {
        let m = FeatureMatrix {
            columns: vec!["age".into()],
            rows: Vec::new(),
        };
        let (scaler, scaled) = StandardScaler::fit_transform(&m, ConstantColumnPolicy::Zero);
        assert_eq!(scaler.means, vec![0.0]);
        assert!(scaled.rows.is_empty());
    }
}
