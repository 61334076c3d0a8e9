//! Stratified splitting and cross-validation folds
//!
//! Both the holdout split and the k-fold assignment shuffle each class
//! separately with a seeded `StdRng`, so class balance is preserved on
//! every side and identical seeds reproduce identical partitions.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use selectml_core::{Result, SelectError};

fn class_indices(labels: &[u8]) -> Result<[Vec<usize>; 2]> {
    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, &label) in labels.iter().enumerate() {
        by_class[label as usize].push(i);
    }
    if by_class[0].is_empty() || by_class[1].is_empty() {
        return Err(SelectError::InvalidDataset(
            "stratification requires both classes".into(),
        ));
    }
    Ok(by_class)
}

/// Stratified holdout split: returns (train, test) index sets.
///
/// Each class contributes `test_fraction` of its rows (at least one row on
/// each side). Index sets come back sorted; only membership is random.
pub fn stratified_split(
    labels: &[u8],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(SelectError::InvalidDataset(format!(
            "test fraction {test_fraction} must be in (0, 1)"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for mut indices in class_indices(labels)? {
        if indices.len() < 2 {
            return Err(SelectError::InvalidDataset(
                "each class needs at least 2 samples to split".into(),
            ));
        }
        indices.shuffle(&mut rng);

        let mut take = (indices.len() as f64 * test_fraction).round() as usize;
        take = take.clamp(1, indices.len() - 1);

        test.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Stratified k-fold assignment over a label vector.
#[derive(Clone, Debug)]
pub struct StratifiedKFold {
    pub folds: usize,
    pub seed: u64,
}

impl StratifiedKFold {
    pub fn new(folds: usize, seed: u64) -> Self {
        Self { folds, seed }
    }

    /// Produce `(train, validation)` index pairs, one per fold.
    ///
    /// Every class is shuffled once and dealt round-robin across folds, so
    /// each fold's validation set keeps the class balance.
    pub fn splits(&self, labels: &[u8]) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.folds < 2 {
            return Err(SelectError::InvalidDataset(
                "cross-validation needs at least 2 folds".into(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fold_of = vec![0usize; labels.len()];

        for mut indices in class_indices(labels)? {
            if indices.len() < self.folds {
                return Err(SelectError::InvalidDataset(format!(
                    "class with {} samples cannot fill {} folds",
                    indices.len(),
                    self.folds
                )));
            }
            indices.shuffle(&mut rng);
            for (pos, &idx) in indices.iter().enumerate() {
                fold_of[idx] = pos % self.folds;
            }
        }

        let mut out = Vec::with_capacity(self.folds);
        for fold in 0..self.folds {
            let mut train = Vec::new();
            let mut validation = Vec::new();
            for (idx, &assigned) in fold_of.iter().enumerate() {
                if assigned == fold {
                    validation.push(idx);
                } else {
                    train.push(idx);
                }
            }
            out.push((train, validation));
        }
        Ok(out)
    }
}
