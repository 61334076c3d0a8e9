//! Serving facade
//!
//! One `ModelService` is constructed by the hosting process at startup and
//! handed by reference to request handlers. It owns the dataset, the
//! inference handle, and the metrics cache; training runs are serialized
//! behind a mutex so a refit and a persist can never race on the artifact.

use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::info;

use selectml_core::{Dataset, EvaluationReport, FeatureRecord, Result};
use selectml_trainer::{train_and_select, SelectionOutcome, TrainConfig};

use crate::cache::MetricsCache;
use crate::inference::{InferenceService, Prediction};

/// Service configuration with documented defaults.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Optional CSV dataset; the bundled diagnostic table when `None`.
    pub data_path: Option<PathBuf>,
    /// Directory holding the model artifact and metrics document.
    pub artifacts_dir: PathBuf,
    /// Held-out test fraction (default 0.20).
    pub test_fraction: f64,
    /// Cross-validation fold count (default 5).
    pub folds: usize,
    /// Seed for all shuffling (default 42).
    pub seed: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            artifacts_dir: PathBuf::from("artifacts"),
            test_fraction: 0.20,
            folds: 5,
            seed: 42,
        }
    }
}

impl ServiceConfig {
    fn train_config(&self) -> TrainConfig {
        TrainConfig {
            test_fraction: self.test_fraction,
            folds: self.folds,
            seed: self.seed,
            ..TrainConfig::with_artifacts_dir(&self.artifacts_dir)
        }
    }
}

/// Injectable serving context for the external query layer.
#[derive(Debug)]
pub struct ModelService {
    dataset: Dataset,
    train_config: TrainConfig,
    inference: InferenceService,
    cache: MetricsCache,
    train_lock: Mutex<()>,
}

impl ModelService {
    /// Build the service; loads the dataset but defers any model loading
    /// until the first prediction.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let dataset = match &config.data_path {
            Some(path) => Dataset::from_csv(path)?,
            None => Dataset::builtin()?.clone(),
        };
        let train_config = config.train_config();
        info!(
            samples = dataset.len(),
            features = dataset.feature_count(),
            artifacts = %config.artifacts_dir.display(),
            "model service ready"
        );
        Ok(Self {
            inference: InferenceService::new(train_config.model_path.clone()),
            cache: MetricsCache::new(train_config.metrics_path.clone()),
            dataset,
            train_config,
            train_lock: Mutex::new(()),
        })
    }

    /// Canonical ordered feature names required of every request.
    pub fn list_feature_names(&self) -> &[String] {
        self.dataset.feature_names()
    }

    /// Score one record against the active model.
    pub fn predict_one(&self, record: &FeatureRecord) -> Result<Prediction> {
        self.inference.predict_one(record)
    }

    /// Score a batch of records; all-or-nothing on validation failures.
    pub fn predict_many(&self, records: &[FeatureRecord]) -> Result<Vec<Prediction>> {
        self.inference.predict_many(records)
    }

    /// Latest ranked evaluation reports, read-through.
    ///
    /// Returns the cached document when present and readable; otherwise
    /// runs a full selection pass (which rewrites the cache) and returns
    /// its results. The only path that triggers training implicitly.
    pub fn get_metrics(&self) -> Result<Vec<EvaluationReport>> {
        if let Some(reports) = self.cache.read() {
            return Ok(reports);
        }

        let _guard = self.train_lock.lock();
        // Another caller may have finished training while we waited.
        if let Some(reports) = self.cache.read() {
            return Ok(reports);
        }
        info!("metrics cache miss; running selection");
        let outcome = train_and_select(&self.dataset, &self.train_config)?;
        Ok(outcome.reports)
    }

    /// Run a full selection pass explicitly. Concurrent calls serialize.
    pub fn train(&self) -> Result<SelectionOutcome> {
        let _guard = self.train_lock.lock();
        train_and_select(&self.dataset, &self.train_config)
    }
}
