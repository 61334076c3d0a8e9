//! Bagged regression trees (optional `forest` feature)
//!
//! Bootstrap-aggregated trees fit directly to the 0/1 labels with
//! per-tree feature subsampling. Randomness comes from a seeded
//! `StdRng`, so a given seed always grows the same forest.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::candidates::tree::{CartBuilder, Tree, TreeConfig};
use crate::errors::{Result, SelectError};

/// Random forest classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForest {
    pub num_trees: usize,
    pub seed: u64,
    pub tree: TreeConfig,
    trees: Vec<Tree>,
}

impl RandomForest {
    pub fn new(num_trees: usize, seed: u64, tree: TreeConfig) -> Self {
        Self {
            num_trees,
            seed,
            tree,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        let n = x.len();
        if n == 0 {
            return Err(SelectError::InvalidDataset(
                "cannot fit a forest on empty data".into(),
            ));
        }
        let feature_count = x[0].len();
        // sqrt(F) features per tree, the usual bagging heuristic.
        let subset_size = ((feature_count as f64).sqrt().ceil() as usize).max(1);

        // Regression trees on the raw labels: with g = -y and h = 1 the
        // shared builder's leaf value -G/(H+lambda) is the leaf label mean.
        let gradients: Vec<f64> = y.iter().map(|&l| -f64::from(l)).collect();
        let hessians = vec![1.0; n];

        let mut trees = Vec::with_capacity(self.num_trees);
        for tree_idx in 0..self.num_trees {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(tree_idx as u64));

            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut feature_ids: Vec<usize> = (0..feature_count).collect();
            feature_ids.shuffle(&mut rng);
            feature_ids.truncate(subset_size);
            feature_ids.sort_unstable();

            let builder = CartBuilder::new(x, &gradients, &hessians, self.tree.clone());
            trees.push(builder.build(&sample, &feature_ids));
        }

        self.trees = trees;
        Ok(())
    }

    /// Positive-class probabilities: mean leaf value across trees.
    pub fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                let sum: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
                (sum / self.trees.len().max(1) as f64).clamp(0.0, 1.0)
            })
            .collect()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(
            40,
            42,
            TreeConfig {
                max_depth: 5,
                min_samples_leaf: 2,
                lambda: 1e-3,
                max_thresholds: 16,
            },
        )
    }
}
