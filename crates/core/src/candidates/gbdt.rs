//! Gradient-boosted trees on the logistic loss
//!
//! Boosted regression trees over per-round gradients and hessians of the
//! binary logistic loss. Fully deterministic: no subsampling, exact-greedy
//! splits with tie-breaking from the shared tree builder.

use serde::{Deserialize, Serialize};

use crate::candidates::sigmoid;
use crate::candidates::tree::{CartBuilder, Tree, TreeConfig};
use crate::errors::{Result, SelectError};

/// Gradient boosting classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub num_trees: usize,
    pub learning_rate: f64,
    pub tree: TreeConfig,
    bias: f64,
    trees: Vec<Tree>,
}

impl GradientBoosting {
    pub fn new(num_trees: usize, learning_rate: f64, tree: TreeConfig) -> Self {
        Self {
            num_trees,
            learning_rate,
            tree,
            bias: 0.0,
            trees: Vec::new(),
        }
    }

    /// Fit the ensemble.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        let n = x.len();
        let positives = y.iter().filter(|&&l| l == 1).count();
        if positives == 0 || positives == n {
            return Err(SelectError::InvalidDataset(
                "gradient boosting requires both classes in the training data".into(),
            ));
        }

        // Log-odds prior of the positive class.
        let p = positives as f64 / n as f64;
        self.bias = (p / (1.0 - p)).ln();

        let feature_ids: Vec<usize> = (0..x[0].len()).collect();
        let mut raw = vec![self.bias; n];
        let mut trees = Vec::with_capacity(self.num_trees);

        for _ in 0..self.num_trees {
            let mut gradients = Vec::with_capacity(n);
            let mut hessians = Vec::with_capacity(n);
            for (i, &label) in y.iter().enumerate() {
                let prob = sigmoid(raw[i]);
                gradients.push(prob - label as f64);
                hessians.push((prob * (1.0 - prob)).max(1e-6));
            }

            let builder = CartBuilder::new(x, &gradients, &hessians, self.tree.clone());
            let indices: Vec<usize> = (0..n).collect();
            let tree = builder.build(&indices, &feature_ids);

            for (i, row) in x.iter().enumerate() {
                raw[i] += self.learning_rate * tree.evaluate(row);
            }
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    /// Positive-class probabilities.
    pub fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                let raw = self.bias
                    + self
                        .trees
                        .iter()
                        .map(|t| self.learning_rate * t.evaluate(row))
                        .sum::<f64>();
                sigmoid(raw)
            })
            .collect()
    }
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self::new(
            40,
            0.1,
            TreeConfig {
                max_depth: 3,
                min_samples_leaf: 5,
                lambda: 1.0,
                max_thresholds: 16,
            },
        )
    }
}
