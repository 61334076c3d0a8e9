//! Evaluation orchestrator
//!
//! Splits the dataset, cross-validates every registry candidate on the
//! train split, scores the held-out split, ranks the field, refits the
//! winner on the full dataset, and persists both the model artifact and
//! the metrics document. Fail-fast: one failing candidate aborts the run
//! and leaves prior artifacts untouched.

pub mod split;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use selectml_core::metrics::{accuracy, classification_report, confusion_matrix, f1_score, roc_auc};
use selectml_core::{
    build_candidates, rank_reports, Candidate, Dataset, EvaluationReport, ModelArtifact, Result,
    SelectError,
};

use split::{stratified_split, StratifiedKFold};

/// Orchestrator configuration with documented defaults.
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Held-out fraction for the test split (default 0.20).
    pub test_fraction: f64,
    /// Cross-validation fold count (default 5).
    pub folds: usize,
    /// Seed for every shuffle in the run (default 42).
    pub seed: u64,
    /// Destination of the persisted model artifact.
    pub model_path: PathBuf,
    /// Destination of the persisted metrics document.
    pub metrics_path: PathBuf,
}

impl TrainConfig {
    /// Default parameters with artifacts rooted at `dir`.
    pub fn with_artifacts_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            test_fraction: 0.20,
            folds: 5,
            seed: 42,
            model_path: dir.join("model.json"),
            metrics_path: dir.join("metrics_cache.json"),
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::with_artifacts_dir("artifacts")
    }
}

/// Result of one complete selection run.
#[derive(Clone, Debug)]
pub struct SelectionOutcome {
    pub winner: String,
    pub reports: Vec<EvaluationReport>,
}

fn select_rows(rows: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    indices.iter().map(|&i| rows[i].clone()).collect()
}

fn select_labels(labels: &[u8], indices: &[usize]) -> Vec<u8> {
    indices.iter().map(|&i| labels[i]).collect()
}

fn training_failure(candidate: &str, err: SelectError) -> SelectError {
    SelectError::Training {
        candidate: candidate.to_string(),
        reason: err.to_string(),
    }
}

/// Cross-validate one candidate on the train split; returns per-fold ROC-AUC.
fn cross_validate(
    candidate: &Candidate,
    train_x: &[Vec<f64>],
    train_y: &[u8],
    kfold: &StratifiedKFold,
) -> Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(kfold.folds);
    for (fit_idx, val_idx) in kfold.splits(train_y)? {
        // Fresh unfitted instance per fold; fitted state never crosses folds.
        let mut pipeline = candidate.pipeline.clone();
        pipeline
            .fit(&select_rows(train_x, &fit_idx), &select_labels(train_y, &fit_idx))
            .map_err(|e| training_failure(&candidate.name, e))?;

        let val_scores = pipeline.positive_scores(&select_rows(train_x, &val_idx));
        let auc = roc_auc(&select_labels(train_y, &val_idx), &val_scores)
            .map_err(|e| training_failure(&candidate.name, e))?;
        scores.push(auc);
    }
    Ok(scores)
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Atomically overwrite the metrics document.
fn write_metrics(path: &Path, reports: &[EvaluationReport]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(reports)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Train every candidate, rank, refit the winner, and persist everything.
///
/// Returns the winner name and the ranked reports. Nothing is written to
/// disk until every candidate has evaluated successfully.
pub fn train_and_select(dataset: &Dataset, config: &TrainConfig) -> Result<SelectionOutcome> {
    info!(
        samples = dataset.len(),
        features = dataset.feature_count(),
        test_fraction = config.test_fraction,
        folds = config.folds,
        seed = config.seed,
        "starting selection run"
    );

    let (train_idx, test_idx) =
        stratified_split(dataset.labels(), config.test_fraction, config.seed)?;
    let (train_x, train_y) = dataset.select(&train_idx);
    let (test_x, test_y) = dataset.select(&test_idx);
    let kfold = StratifiedKFold::new(config.folds, config.seed);

    let mut reports = Vec::new();
    for candidate in build_candidates() {
        debug!(candidate = %candidate.name, "cross-validating");
        let cv_scores = cross_validate(&candidate, &train_x, &train_y, &kfold)?;
        let (cv_mean, cv_std) = mean_std(&cv_scores);

        // Fresh instance for the holdout evaluation.
        let mut pipeline = candidate.pipeline.clone();
        pipeline
            .fit(&train_x, &train_y)
            .map_err(|e| training_failure(&candidate.name, e))?;

        let scores = pipeline.positive_scores(&test_x);
        let predictions = pipeline.predict(&test_x);
        let auc =
            roc_auc(&test_y, &scores).map_err(|e| training_failure(&candidate.name, e))?;

        let report = EvaluationReport {
            model: candidate.name.clone(),
            accuracy: accuracy(&test_y, &predictions),
            f1: f1_score(&test_y, &predictions),
            roc_auc: auc,
            cv_mean_roc_auc: cv_mean,
            cv_std_roc_auc: cv_std,
            confusion_matrix: confusion_matrix(&test_y, &predictions),
            classification_report: classification_report(&test_y, &predictions),
        };
        info!(
            candidate = %report.model,
            roc_auc = report.roc_auc,
            f1 = report.f1,
            cv_mean = report.cv_mean_roc_auc,
            "candidate evaluated"
        );
        reports.push(report);
    }

    rank_reports(&mut reports);
    let winner = reports[0].model.clone();
    info!(winner = %winner, roc_auc = reports[0].roc_auc, "winner selected");

    // Refit a fresh winner instance on the entire dataset. This model is
    // never evaluated; it exists only to serve.
    let mut final_pipeline = build_candidates()
        .into_iter()
        .find(|c| c.name == winner)
        .map(|c| c.pipeline)
        .ok_or_else(|| SelectError::Training {
            candidate: winner.clone(),
            reason: "winner vanished from the registry".into(),
        })?;
    final_pipeline
        .fit(dataset.features(), dataset.labels())
        .map_err(|e| training_failure(&winner, e))?;

    let artifact = ModelArtifact::build(
        winner.clone(),
        dataset.feature_names().to_vec(),
        final_pipeline,
    )?;
    artifact.save(&config.model_path)?;
    write_metrics(&config.metrics_path, &reports)?;
    info!(path = %config.metrics_path.display(), "metrics document written");

    Ok(SelectionOutcome { winner, reports })
}
