//! Exact-greedy regression tree on gradient/hessian sums
//!
//! Shared tree builder for the boosted and bagged candidates. Splits are
//! chosen by the G²/(H+λ) gain decomposition with deterministic
//! tie-breaking, so identical inputs always produce identical trees.

use serde::{Deserialize, Serialize};

/// One tree node; leaves carry `value`, internal nodes carry a split.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub feature_index: u32,
    pub threshold: f64,
    pub left: u32,
    pub right: u32,
    pub value: Option<f64>,
}

/// A regression tree stored as a flat node array rooted at index 0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Evaluate the tree on one feature row.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };
            if let Some(value) = node.value {
                return value;
            }
            let feature = features.get(node.feature_index as usize).copied().unwrap_or(0.0);
            idx = if feature <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}

/// Training parameters for a single tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// L2 regularization added to hessian sums in gains and leaf values.
    pub lambda: f64,
    /// Cap on candidate thresholds per feature per node.
    pub max_thresholds: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_leaf: 5,
            lambda: 1.0,
            max_thresholds: 16,
        }
    }
}

/// Deterministic tie-breaker for equal-gain splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SplitTieBreaker {
    feature_index: usize,
    threshold_bits: u64,
    node_id: usize,
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_index: usize,
    threshold: f64,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_index: usize, threshold: f64, gain: f64, node_id: usize) -> Self {
        Self {
            feature_index,
            threshold,
            gain,
            tie_breaker: SplitTieBreaker {
                feature_index,
                threshold_bits: threshold.to_bits(),
                node_id,
            },
        }
    }
}

/// Builds one regression tree over borrowed training data.
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        gradients: &'a [f64],
        hessians: &'a [f64],
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(features.len(), gradients.len());
        debug_assert_eq!(features.len(), hessians.len());
        Self {
            config,
            features,
            gradients,
            hessians,
        }
    }

    /// Build a tree over the rows in `indices`, considering only the
    /// features in `feature_ids` (absolute column indices).
    pub fn build(&self, indices: &[usize], feature_ids: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices, feature_ids, 0, &mut nodes, 0);
        Tree { nodes }
    }

    fn build_node(
        &self,
        indices: &[usize],
        feature_ids: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        node_id: usize,
    ) -> u32 {
        let current = nodes.len() as u32;
        let leaf_value = self.leaf_value(indices);

        if depth >= self.config.max_depth || indices.len() < 2 * self.config.min_samples_leaf {
            nodes.push(Self::leaf(leaf_value));
            return current;
        }

        let Some(split) = self.find_best_split(indices, feature_ids, node_id) else {
            nodes.push(Self::leaf(leaf_value));
            return current;
        };

        let (left_rows, right_rows) =
            self.partition(indices, split.feature_index, split.threshold);
        if left_rows.len() < self.config.min_samples_leaf
            || right_rows.len() < self.config.min_samples_leaf
        {
            nodes.push(Self::leaf(leaf_value));
            return current;
        }

        nodes.push(Node {
            feature_index: split.feature_index as u32,
            threshold: split.threshold,
            left: 0,
            right: 0,
            value: None,
        });

        let left = self.build_node(&left_rows, feature_ids, depth + 1, nodes, node_id * 2 + 1);
        let right = self.build_node(&right_rows, feature_ids, depth + 1, nodes, node_id * 2 + 2);

        nodes[current as usize].left = left;
        nodes[current as usize].right = right;
        current
    }

    fn leaf(value: f64) -> Node {
        Node {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }

    fn find_best_split(
        &self,
        indices: &[usize],
        feature_ids: &[usize],
        node_id: usize,
    ) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;

        for &feature_index in feature_ids {
            for threshold in self.thresholds(indices, feature_index) {
                let (left, right) = self.partition(indices, feature_index, threshold);
                if left.len() < self.config.min_samples_leaf
                    || right.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let gain = self.split_gain(&left, &right, indices);
                if gain <= 0.0 {
                    continue;
                }

                let candidate = SplitCandidate::new(feature_index, threshold, gain, node_id);
                best = match best {
                    None => Some(candidate),
                    Some(current) => {
                        if gain > current.gain
                            || (gain == current.gain && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }

        best
    }

    /// Midpoints between consecutive distinct values, capped at
    /// `max_thresholds` by even subsampling.
    fn thresholds(&self, indices: &[usize], feature_index: usize) -> Vec<f64> {
        let mut values: Vec<f64> = indices
            .iter()
            .map(|&i| self.features[i][feature_index])
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup();

        if values.len() < 2 {
            return Vec::new();
        }

        let midpoints: Vec<f64> = values
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect();

        if midpoints.len() <= self.config.max_thresholds {
            return midpoints;
        }

        let step = midpoints.len() as f64 / self.config.max_thresholds as f64;
        (0..self.config.max_thresholds)
            .map(|i| midpoints[(i as f64 * step) as usize])
            .collect()
    }

    fn partition(
        &self,
        indices: &[usize],
        feature_index: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &idx in indices {
            if self.features[idx][feature_index] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }
        (left, right)
    }

    /// Gain = G_l²/(H_l+λ) + G_r²/(H_r+λ) − G_p²/(H_p+λ).
    fn split_gain(&self, left: &[usize], right: &[usize], parent: &[usize]) -> f64 {
        let part = |rows: &[usize]| {
            let (g, h) = self.sums(rows);
            g * g / (h + self.config.lambda)
        };
        part(left) + part(right) - part(parent)
    }

    fn sums(&self, indices: &[usize]) -> (f64, f64) {
        let mut g = 0.0;
        let mut h = 0.0;
        for &idx in indices {
            g += self.gradients[idx];
            h += self.hessians[idx];
        }
        (g, h)
    }

    /// Optimal leaf value: −G/(H+λ).
    fn leaf_value(&self, indices: &[usize]) -> f64 {
        let (g, h) = self.sums(indices);
        if h + self.config.lambda <= 0.0 {
            return 0.0;
        }
        -g / (h + self.config.lambda)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_tree_splits_signal_feature() {
        // Gradient flips sign exactly at feature 0 = 2.5.
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let gradients = vec![-1.0, -1.0, 1.0, 1.0];
        let hessians = vec![1.0; 4];
        let config = TreeConfig {
            max_depth: 2,
            min_samples_leaf: 1,
            lambda: 0.0,
            max_thresholds: 16,
        };

        let builder = CartBuilder::new(&features, &gradients, &hessians, config);
        let tree = builder.build(&all_rows(4), &[0]);

        let root = &tree.nodes[0];
        assert!(root.value.is_none());
        assert_eq!(root.feature_index, 0);
        assert_eq!(root.threshold, 2.5);

        assert!(tree.evaluate(&[1.0]) > 0.0);
        assert!(tree.evaluate(&[4.0]) < 0.0);
    }

    #[test]
    fn test_leaf_only_when_too_few_samples() {
        let features = vec![vec![1.0], vec![2.0]];
        let gradients = vec![-1.0, 1.0];
        let hessians = vec![1.0, 1.0];
        let config = TreeConfig {
            min_samples_leaf: 5,
            ..TreeConfig::default()
        };

        let builder = CartBuilder::new(&features, &gradients, &hessians, config);
        let tree = builder.build(&all_rows(2), &[0]);

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].value.is_some());
    }

    #[test]
    fn test_build_is_deterministic() {
        let features: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, (i * 7 % 5) as f64])
            .collect();
        let gradients: Vec<f64> = (0..20).map(|i| if i < 10 { -1.0 } else { 1.0 }).collect();
        let hessians = vec![1.0; 20];
        let config = TreeConfig::default();

        let builder = CartBuilder::new(&features, &gradients, &hessians, config.clone());
        let t1 = builder.build(&all_rows(20), &[0, 1]);
        let builder2 = CartBuilder::new(&features, &gradients, &hessians, config);
        let t2 = builder2.build(&all_rows(20), &[0, 1]);

        assert_eq!(t1.nodes.len(), t2.nodes.len());
        for (a, b) in t1.nodes.iter().zip(t2.nodes.iter()) {
            assert_eq!(a.feature_index, b.feature_index);
            assert_eq!(a.threshold, b.threshold);
            assert_eq!(a.value, b.value);
        }
    }

    #[test]
    fn test_feature_subset_is_respected() {
        // Feature 0 separates perfectly, feature 1 is noise; restrict to 1.
        let features = vec![
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![3.0, 5.0],
            vec![4.0, 5.0],
        ];
        let gradients = vec![-1.0, -1.0, 1.0, 1.0];
        let hessians = vec![1.0; 4];
        let config = TreeConfig {
            min_samples_leaf: 1,
            ..TreeConfig::default()
        };

        let builder = CartBuilder::new(&features, &gradients, &hessians, config);
        let tree = builder.build(&all_rows(4), &[1]);

        // Constant column offers no split.
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].value.is_some());
    }
}
