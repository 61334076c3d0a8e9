//! Linear candidates: logistic regression and a hinge-loss linear SVM
//!
//! Both train by deterministic full-batch (sub)gradient descent and expect
//! standardized inputs. The SVM exposes only a decision margin; the
//! pipeline normalizes it into [0, 1].

use serde::{Deserialize, Serialize};

use crate::candidates::sigmoid;
use crate::errors::{Result, SelectError};

fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row.iter()).map(|(w, v)| w * v).sum()
}

fn check_shape(x: &[Vec<f64>]) -> Result<usize> {
    if x.is_empty() || x[0].is_empty() {
        return Err(SelectError::InvalidDataset(
            "cannot fit a linear model on empty data".into(),
        ));
    }
    Ok(x[0].len())
}

/// L2-regularized logistic regression via full-batch gradient descent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            weights: Vec::new(),
            bias: 0.0,
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        let dims = check_shape(x)?;
        let n = x.len() as f64;
        let mut weights = vec![0.0; dims];
        let mut bias = 0.0;

        for _ in 0..self.epochs {
            let mut grad_w = vec![0.0; dims];
            let mut grad_b = 0.0;
            for (row, &label) in x.iter().zip(y.iter()) {
                let err = sigmoid(dot(&weights, row) + bias) - f64::from(label);
                for (g, &v) in grad_w.iter_mut().zip(row.iter()) {
                    *g += err * v;
                }
                grad_b += err;
            }
            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= self.learning_rate * (g / n + self.l2 * *w);
            }
            bias -= self.learning_rate * grad_b / n;
        }

        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    /// Positive-class probabilities via the logistic link.
    pub fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| sigmoid(dot(&self.weights, row) + self.bias))
            .collect()
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.1, 500, 1e-4)
    }
}

/// Linear SVM trained on the hinge loss; yields raw decision margins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearSvm {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
    weights: Vec<f64>,
    bias: f64,
}

impl LinearSvm {
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            weights: Vec::new(),
            bias: 0.0,
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        let dims = check_shape(x)?;
        let n = x.len() as f64;
        // Hinge loss works on {-1, +1} targets.
        let signed: Vec<f64> = y.iter().map(|&l| if l == 1 { 1.0 } else { -1.0 }).collect();

        let mut weights = vec![0.0; dims];
        let mut bias = 0.0;

        for _ in 0..self.epochs {
            let mut grad_w: Vec<f64> = weights.iter().map(|w| self.l2 * w).collect();
            let mut grad_b = 0.0;
            for (row, &target) in x.iter().zip(signed.iter()) {
                let margin = target * (dot(&weights, row) + bias);
                if margin < 1.0 {
                    for (g, &v) in grad_w.iter_mut().zip(row.iter()) {
                        *g -= target * v / n;
                    }
                    grad_b -= target / n;
                }
            }
            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= self.learning_rate * g;
            }
            bias -= self.learning_rate * grad_b;
        }

        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    /// Raw decision margins (unbounded; positive favors class 1).
    pub fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| dot(&self.weights, row) + self.bias)
            .collect()
    }
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new(0.05, 500, 1e-2)
    }
}
