//! Gaussian naive Bayes
//!
//! Class-conditional Gaussian likelihoods with variance smoothing,
//! evaluated in log space. Works on unscaled features.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SelectError};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ClassStats {
    prior_ln: f64,
    means: Vec<f64>,
    variances: Vec<f64>,
}

/// Gaussian naive Bayes classifier.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GaussianNb {
    classes: Vec<ClassStats>,
}

impl GaussianNb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        if x.is_empty() {
            return Err(SelectError::InvalidDataset(
                "cannot fit naive Bayes on empty data".into(),
            ));
        }
        let dims = x[0].len();
        let n = x.len() as f64;

        // Smoothing proportional to the largest overall feature variance.
        let overall_var = {
            let mut max_var = 0.0f64;
            for d in 0..dims {
                let mean = x.iter().map(|r| r[d]).sum::<f64>() / n;
                let var = x.iter().map(|r| (r[d] - mean).powi(2)).sum::<f64>() / n;
                max_var = max_var.max(var);
            }
            max_var
        };
        let epsilon = 1e-9 * overall_var.max(1.0);

        let mut classes = Vec::with_capacity(2);
        for class in 0..2u8 {
            let rows: Vec<&Vec<f64>> = x
                .iter()
                .zip(y.iter())
                .filter(|(_, &l)| l == class)
                .map(|(r, _)| r)
                .collect();
            if rows.is_empty() {
                return Err(SelectError::InvalidDataset(format!(
                    "naive Bayes requires samples of class {class}"
                )));
            }
            let count = rows.len() as f64;

            let mut means = vec![0.0; dims];
            for row in &rows {
                for (m, &v) in means.iter_mut().zip(row.iter()) {
                    *m += v;
                }
            }
            for m in &mut means {
                *m /= count;
            }

            let mut variances = vec![0.0; dims];
            for row in &rows {
                for ((var, &v), &m) in variances.iter_mut().zip(row.iter()).zip(means.iter()) {
                    let d = v - m;
                    *var += d * d;
                }
            }
            for var in &mut variances {
                *var = *var / count + epsilon;
            }

            classes.push(ClassStats {
                prior_ln: (count / n).ln(),
                means,
                variances,
            });
        }

        self.classes = classes;
        Ok(())
    }

    fn log_posterior(&self, stats: &ClassStats, row: &[f64]) -> f64 {
        let mut lp = stats.prior_ln;
        for ((&v, &m), &var) in row
            .iter()
            .zip(stats.means.iter())
            .zip(stats.variances.iter())
        {
            let d = v - m;
            lp += -0.5 * ((2.0 * std::f64::consts::PI * var).ln() + d * d / var);
        }
        lp
    }

    /// Positive-class probabilities.
    pub fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                let lp0 = self.log_posterior(&self.classes[0], row);
                let lp1 = self.log_posterior(&self.classes[1], row);
                // P(1 | x) = 1 / (1 + exp(lp0 - lp1)), stable in log space.
                1.0 / (1.0 + (lp0 - lp1).exp())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            x.push(vec![i as f64 * 0.1, 5.0 + i as f64 * 0.1]);
            y.push(0);
            x.push(vec![10.0 + i as f64 * 0.1, -5.0 + i as f64 * 0.1]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_separates_blobs() {
        let (x, y) = two_blobs();
        let mut model = GaussianNb::new();
        model.fit(&x, &y).unwrap();

        for (score, &label) in model.scores(&x).iter().zip(y.iter()) {
            assert_eq!(u8::from(*score >= 0.5), label);
        }
    }

    #[test]
    fn test_scores_are_probabilities() {
        let (x, y) = two_blobs();
        let mut model = GaussianNb::new();
        model.fit(&x, &y).unwrap();
        for score in model.scores(&x) {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_single_class_rejected() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0, 0];
        let mut model = GaussianNb::new();
        assert!(model.fit(&x, &y).is_err());
    }
}
