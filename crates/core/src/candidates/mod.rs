//! Candidate registry and classification pipelines
//!
//! Each candidate is a named pipeline: an optional standardization step in
//! front of one estimator. Estimators declare whether they emit calibrated
//! probabilities or raw decision margins; `Pipeline::positive_scores`
//! applies one monotone normalization for the decision case so every
//! candidate exposes a positive-class score in [0, 1].

pub mod bayes;
#[cfg(feature = "forest")]
pub mod forest;
pub mod gbdt;
pub mod knn;
pub mod linear;
pub mod tree;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SelectError};
use crate::scaler::StandardScaler;

pub use bayes::GaussianNb;
#[cfg(feature = "forest")]
pub use forest::RandomForest;
pub use gbdt::GradientBoosting;
pub use knn::KnnClassifier;
pub use linear::{LinearSvm, LogisticRegression};

/// Numerically stable logistic function.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// What an estimator's raw scores mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreKind {
    /// Scores are already positive-class probabilities in [0, 1].
    Probability,
    /// Scores are unbounded decision margins; larger favors class 1.
    Decision,
}

/// Concrete estimator dispatch; serde-friendly so the fitted winner can be
/// persisted without trait-object machinery.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    LinearSvm(LinearSvm),
    Knn(KnnClassifier),
    GaussianNb(GaussianNb),
    GradientBoosting(GradientBoosting),
    #[cfg(feature = "forest")]
    RandomForest(RandomForest),
}

impl Estimator {
    fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        match self {
            Estimator::LogisticRegression(m) => m.fit(x, y),
            Estimator::LinearSvm(m) => m.fit(x, y),
            Estimator::Knn(m) => m.fit(x, y),
            Estimator::GaussianNb(m) => m.fit(x, y),
            Estimator::GradientBoosting(m) => m.fit(x, y),
            #[cfg(feature = "forest")]
            Estimator::RandomForest(m) => m.fit(x, y),
        }
    }

    fn scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        match self {
            Estimator::LogisticRegression(m) => m.scores(x),
            Estimator::LinearSvm(m) => m.scores(x),
            Estimator::Knn(m) => m.scores(x),
            Estimator::GaussianNb(m) => m.scores(x),
            Estimator::GradientBoosting(m) => m.scores(x),
            #[cfg(feature = "forest")]
            Estimator::RandomForest(m) => m.scores(x),
        }
    }

    fn score_kind(&self) -> ScoreKind {
        match self {
            Estimator::LinearSvm(_) => ScoreKind::Decision,
            _ => ScoreKind::Probability,
        }
    }
}

/// Optional standardization step plus one estimator.
///
/// An unfitted pipeline clones to a fresh unfitted instance; fitted
/// estimators are never reused across folds or runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pipeline {
    scaler: Option<StandardScaler>,
    estimator: Estimator,
}

impl Pipeline {
    pub fn new(scaled: bool, estimator: Estimator) -> Self {
        Self {
            scaler: scaled.then(StandardScaler::new),
            estimator,
        }
    }

    /// Fit the scaler (on this data only) and then the estimator.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[u8]) -> Result<()> {
        if x.len() != y.len() {
            return Err(SelectError::InvalidDataset(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        match &mut self.scaler {
            Some(scaler) => {
                scaler.fit(x)?;
                let scaled = scaler.transform(x);
                self.estimator.fit(&scaled, y)
            }
            None => self.estimator.fit(x, y),
        }
    }

    /// Positive-class scores in [0, 1] for every row.
    ///
    /// Decision margins pass through one logistic squash; probability
    /// estimators pass through unchanged.
    pub fn positive_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        let raw = match &self.scaler {
            Some(scaler) => self.estimator.scores(&scaler.transform(x)),
            None => self.estimator.scores(x),
        };
        match self.estimator.score_kind() {
            ScoreKind::Probability => raw,
            ScoreKind::Decision => raw.into_iter().map(sigmoid).collect(),
        }
    }

    /// Hard labels at the 0.5 probability threshold.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<u8> {
        self.positive_scores(x)
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect()
    }

    pub fn score_kind(&self) -> ScoreKind {
        self.estimator.score_kind()
    }
}

/// One named, independently trainable candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub pipeline: Pipeline,
}

impl Candidate {
    fn new(name: &str, scaled: bool, estimator: Estimator) -> Self {
        Self {
            name: name.to_string(),
            pipeline: Pipeline::new(scaled, estimator),
        }
    }
}

/// Build a fresh, never-previously-fit candidate set.
///
/// Returns new unfitted instances on every call, in fixed registry order.
/// The bagged-trees candidate is present only when the `forest` feature is
/// compiled in; its absence just shrinks the field.
pub fn build_candidates() -> Vec<Candidate> {
    let mut candidates = vec![
        Candidate::new(
            "logistic_regression",
            true,
            Estimator::LogisticRegression(LogisticRegression::default()),
        ),
        Candidate::new("linear_svm", true, Estimator::LinearSvm(LinearSvm::default())),
        Candidate::new("knn", true, Estimator::Knn(KnnClassifier::default())),
        Candidate::new("gaussian_nb", false, Estimator::GaussianNb(GaussianNb::new())),
        Candidate::new(
            "gradient_boosting",
            false,
            Estimator::GradientBoosting(GradientBoosting::default()),
        ),
    ];

    #[cfg(feature = "forest")]
    candidates.push(Candidate::new(
        "random_forest",
        false,
        Estimator::RandomForest(RandomForest::default()),
    ));

    candidates
}
