//! Integration tests for the selection run
//!
//! A small, well-separated synthetic dataset keeps every candidate quick
//! to fit while still giving the ranking something to distinguish.

use anyhow::Result;
use tempfile::TempDir;

use selectml_core::{build_candidates, Dataset, ModelArtifact, SelectError};
use selectml_trainer::{train_and_select, TrainConfig};

/// 60 rows, 4 features; feature 0 carries the class signal with a little
/// deterministic jitter, the rest are structured noise.
fn synthetic_dataset() -> Result<Dataset> {
    let names = vec!["f1".into(), "f2".into(), "f3".into(), "f4".into()];
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..60u32 {
        let label = u8::from(i % 2 == 1);
        let jitter = ((i * 37) % 11) as f64 / 10.0;
        let base = if label == 1 { 8.0 } else { 2.0 };
        rows.push(vec![
            base + jitter,
            ((i * 13) % 7) as f64,
            1.0 + (i % 3) as f64,
            base / 2.0 - jitter,
        ]);
        labels.push(label);
    }
    Ok(Dataset::new(names, rows, labels)?)
}

fn config_in(dir: &TempDir) -> TrainConfig {
    TrainConfig::with_artifacts_dir(dir.path())
}

#[test]
fn test_selection_ranks_and_persists() -> Result<()> {
    let dataset = synthetic_dataset()?;
    let dir = TempDir::new()?;
    let config = config_in(&dir);

    let outcome = train_and_select(&dataset, &config)?;

    let names: Vec<String> = build_candidates().into_iter().map(|c| c.name).collect();
    assert!(names.contains(&outcome.winner));
    assert_eq!(outcome.reports.len(), names.len());

    // Ranking: roc_auc non-increasing, ties broken by f1 non-increasing.
    for pair in outcome.reports.windows(2) {
        assert!(pair[0].roc_auc >= pair[1].roc_auc);
        if pair[0].roc_auc == pair[1].roc_auc {
            assert!(pair[0].f1 >= pair[1].f1);
        }
    }
    assert_eq!(outcome.reports[0].model, outcome.winner);

    for report in &outcome.reports {
        assert!((0.0..=1.0).contains(&report.accuracy), "{}", report.model);
        assert!((0.0..=1.0).contains(&report.f1));
        assert!((0.0..=1.0).contains(&report.roc_auc));
        assert!((0.0..=1.0).contains(&report.cv_mean_roc_auc));
        assert!(report.cv_std_roc_auc >= 0.0);
        let total: u64 = report.confusion_matrix.iter().flatten().sum();
        assert_eq!(total, 12, "test split should hold 12 rows");
    }

    assert!(config.model_path.exists());
    assert!(config.metrics_path.exists());

    // Metrics document round-trips as ranked reports.
    let cached: Vec<selectml_core::EvaluationReport> =
        serde_json::from_str(&std::fs::read_to_string(&config.metrics_path)?)?;
    assert_eq!(cached.len(), outcome.reports.len());
    assert_eq!(cached[0].model, outcome.winner);

    Ok(())
}

#[test]
fn test_same_seed_reproduces_ranking() -> Result<()> {
    let dataset = synthetic_dataset()?;

    let dir_a = TempDir::new()?;
    let a = train_and_select(&dataset, &config_in(&dir_a))?;
    let dir_b = TempDir::new()?;
    let b = train_and_select(&dataset, &config_in(&dir_b))?;

    assert_eq!(a.winner, b.winner);
    for (ra, rb) in a.reports.iter().zip(b.reports.iter()) {
        assert_eq!(ra.model, rb.model);
        assert_eq!(ra.roc_auc, rb.roc_auc);
        assert_eq!(ra.f1, rb.f1);
        assert_eq!(ra.cv_mean_roc_auc, rb.cv_mean_roc_auc);
    }
    Ok(())
}

#[test]
fn test_persisted_winner_serves_training_rows() -> Result<()> {
    let dataset = synthetic_dataset()?;
    let dir = TempDir::new()?;
    let config = config_in(&dir);

    train_and_select(&dataset, &config)?;
    let artifact = ModelArtifact::load(&config.model_path)?;
    assert_eq!(artifact.feature_names, dataset.feature_names());

    // The refit-on-full-data winner should get this well-separated
    // training data almost entirely right.
    let predictions = artifact.pipeline.predict(dataset.features());
    let hits = predictions
        .iter()
        .zip(dataset.labels().iter())
        .filter(|(p, l)| p == l)
        .count();
    assert!(hits >= 57, "winner got only {hits}/60 training rows");
    Ok(())
}

#[test]
fn test_failed_run_writes_nothing() -> Result<()> {
    // 4 rows per class cannot fill 5 folds; the run must abort before
    // touching disk.
    let names = vec!["f1".into()];
    let rows: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
    let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
    let dataset = Dataset::new(names, rows, labels)?;

    let dir = TempDir::new()?;
    let config = config_in(&dir);

    let err = train_and_select(&dataset, &config);
    assert!(matches!(err, Err(SelectError::InvalidDataset(_))));
    assert!(!config.model_path.exists());
    assert!(!config.metrics_path.exists());
    Ok(())
}

#[test]
fn test_custom_seed_and_fraction_are_honored() -> Result<()> {
    let dataset = synthetic_dataset()?;
    let dir = TempDir::new()?;
    let mut config = config_in(&dir);
    config.test_fraction = 0.5;
    config.seed = 7;
    config.folds = 3;

    let outcome = train_and_select(&dataset, &config)?;
    // Half of 60 rows held out.
    let total: u64 = outcome.reports[0].confusion_matrix.iter().flatten().sum();
    assert_eq!(total, 30);
    Ok(())
}
