//! Feature standardization
//!
//! Mean/variance scaling fit only on the data handed to `fit`, so no
//! statistics from a held-out split ever leak into training.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SelectError};

/// Per-column standardization to zero mean and unit variance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit column means and standard deviations.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        if rows.is_empty() {
            return Err(SelectError::InvalidDataset(
                "cannot fit scaler on empty data".into(),
            ));
        }
        let cols = rows[0].len();
        let n = rows.len() as f64;

        let mut means = vec![0.0; cols];
        for row in rows {
            for (m, &v) in means.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut vars = vec![0.0; cols];
        for row in rows {
            for ((var, &v), &m) in vars.iter_mut().zip(row.iter()).zip(means.iter()) {
                let d = v - m;
                *var += d * d;
            }
        }

        // Constant columns keep their value at zero after centering.
        let stds = vars
            .iter()
            .map(|&v| {
                let s = (v / n).sqrt();
                if s > 0.0 {
                    s
                } else {
                    1.0
                }
            })
            .collect();

        self.means = means;
        self.stds = stds;
        Ok(())
    }

    /// Transform rows using the fitted statistics.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(self.stds.iter()))
                    .map(|(&v, (&m, &s))| (v - m) / s)
                    .collect()
            })
            .collect()
    }
}
