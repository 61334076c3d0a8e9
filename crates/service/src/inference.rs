//! Lazily-loaded inference over the persisted model
//!
//! The model handle moves `Unloaded -> Loaded` exactly once per process:
//! the first prediction triggers the load under mutual exclusion, later
//! reads touch the frozen handle without locking. A missing artifact is a
//! deferred NotReady condition, never a startup crash.

use std::path::PathBuf;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

use selectml_core::{FeatureRecord, ModelArtifact, Result};

/// One scored record. `prediction` is 1 (benign) iff the positive-class
/// probability reaches 0.5; the two probabilities always sum to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: u8,
    pub probability_benign: f64,
    pub probability_malignant: f64,
}

impl Prediction {
    fn from_score(probability_benign: f64) -> Self {
        Self {
            prediction: u8::from(probability_benign >= 0.5),
            probability_benign,
            probability_malignant: 1.0 - probability_benign,
        }
    }
}

/// Thread-safe holder of the currently active fitted model.
#[derive(Debug)]
pub struct InferenceService {
    model_path: PathBuf,
    loaded: OnceCell<ModelArtifact>,
}

impl InferenceService {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            loaded: OnceCell::new(),
        }
    }

    /// Load the persisted model exactly once.
    ///
    /// Concurrent first callers block behind one loader; a failed load
    /// (e.g. no model trained yet) leaves the cell empty so a later call
    /// can succeed after training.
    pub fn ensure_loaded(&self) -> Result<&ModelArtifact> {
        self.loaded.get_or_try_init(|| {
            let artifact = ModelArtifact::load(&self.model_path)?;
            info!(
                winner = %artifact.winner,
                hash = %artifact.model_hash,
                "model loaded into inference service"
            );
            Ok(artifact)
        })
    }

    /// Score a single record.
    pub fn predict_one(&self, record: &FeatureRecord) -> Result<Prediction> {
        let artifact = self.ensure_loaded()?;
        let row = artifact.schema().vectorize(record)?;
        let scores = artifact.pipeline.positive_scores(&[row]);
        Ok(Prediction::from_score(scores[0]))
    }

    /// Score a batch of records as one matrix operation.
    ///
    /// All-or-nothing: any row missing required columns fails the whole
    /// call with the offending column names and no partial results.
    pub fn predict_many(&self, records: &[FeatureRecord]) -> Result<Vec<Prediction>> {
        let artifact = self.ensure_loaded()?;
        let matrix = artifact.schema().vectorize_batch(records)?;
        let scores = artifact.pipeline.positive_scores(&matrix);
        Ok(scores.into_iter().map(Prediction::from_score).collect())
    }
}
