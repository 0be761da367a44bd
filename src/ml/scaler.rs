//! Per-feature standardization (zero mean, unit variance).
//!
//! Means and deviations are fixed at fit time over the training set and
//! applied unchanged at inference.

use serde::{Deserialize, Serialize};

use crate::error::{MintscoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and population standard deviations over a row-major
    /// feature matrix. Constant features get a deviation of 1.0 so they
    /// pass through centered instead of exploding.
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self> {
        let rows = matrix.len();
        if rows == 0 {
            return Err(MintscoreError::Validation(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        let width = matrix[0].len();
        if width == 0 {
            return Err(MintscoreError::Validation(
                "cannot fit scaler on zero-width rows".to_string(),
            ));
        }
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != width {
                return Err(MintscoreError::Validation(format!(
                    "row {i} has width {} != {width}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(MintscoreError::Validation(format!(
                    "row {i} contains non-finite values"
                )));
            }
        }

        let n = rows as f64;
        let mut means = vec![0.0; width];
        for row in matrix {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = vec![0.0; width];
        for row in matrix {
            for ((std, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                let centered = value - mean;
                *std += centered * centered;
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
            if *std == 0.0 {
                *std = 1.0;
            }
        }

        Ok(Self { means, stds })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Standardize one row: (value − mean) / std per feature.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.width() {
            return Err(MintscoreError::Validation(format!(
                "scaler width mismatch: got {}, expected {}",
                row.len(),
                self.width()
            )));
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect())
    }

    pub fn transform(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        matrix.iter().map(|row| self.transform_row(row)).collect()
    }
}
