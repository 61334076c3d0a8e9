//! k-nearest-neighbors classifier
//!
//! Inverse-distance weighted voting over the k closest training rows.
//! Neighbor order is made deterministic by breaking distance ties on the
//! training-row index.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SelectError};

/// k-NN classifier; stores the (scaled) training set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub k: usize,
    train_x: Vec<Vec<f64>>,
    train_y: Vec<u8>,
}

impl KnnClassifier {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            train_x: Vec::new(),
            train_y: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        if x.is_empty() {
            return Err(SelectError::InvalidDataset(
                "cannot fit k-NN on empty data".into(),
            ));
        }
        if self.k == 0 {
            return Err(SelectError::InvalidDataset("k must be at least 1".into()));
        }
        self.train_x = x.to_vec();
        self.train_y = y.to_vec();
        Ok(())
    }

    fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    fn score_one(&self, row: &[f64]) -> f64 {
        let mut neighbors: Vec<(f64, usize)> = self
            .train_x
            .iter()
            .enumerate()
            .map(|(i, train)| (Self::squared_distance(row, train), i))
            .collect();
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        neighbors.truncate(self.k.min(neighbors.len()));

        // Exact matches dominate: vote only among zero-distance rows.
        let exact: Vec<&(f64, usize)> = neighbors.iter().filter(|(d, _)| *d == 0.0).collect();
        if !exact.is_empty() {
            let pos = exact
                .iter()
                .filter(|(_, i)| self.train_y[*i] == 1)
                .count();
            return pos as f64 / exact.len() as f64;
        }

        let mut weight_sum = 0.0;
        let mut positive = 0.0;
        for (dist_sq, idx) in &neighbors {
            let w = 1.0 / dist_sq.sqrt();
            weight_sum += w;
            if self.train_y[*idx] == 1 {
                positive += w;
            }
        }
        positive / weight_sum
    }

    /// Positive-class probabilities.
    pub fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.score_one(row)).collect()
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> KnnClassifier {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<u8> = (0..10).map(|i| u8::from(i >= 5)).collect();
        let mut model = KnnClassifier::new(3);
        model.fit(&x, &y).unwrap();
        model
    }

    #[test]
    fn test_votes_with_local_neighborhood() {
        let model = fitted();
        let scores = model.scores(&[vec![0.5], vec![8.5]]);
        assert!(scores[0] < 0.5);
        assert!(scores[1] > 0.5);
    }

    #[test]
    fn test_exact_match_dominates() {
        let model = fitted();
        let scores = model.scores(&[vec![7.0]]);
        assert_eq!(scores[0], 1.0);
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let model = fitted();
        for score in model.scores(&[vec![-3.0], vec![4.7], vec![20.0]]) {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_zero_k_rejected() {
        let mut model = KnnClassifier::new(0);
        assert!(model.fit(&[vec![1.0]], &[1]).is_err());
    }
}
