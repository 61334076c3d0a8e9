//! End-to-end tests for the serving facade

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use selectml_core::SelectError;
use selectml_service::{FeatureRecord, ModelService, ServiceConfig};

/// Write a small separable dataset: 40 rows, features f1..f5, class
/// decided by f1 with deterministic jitter.
fn write_dataset(dir: &TempDir) -> Result<PathBuf> {
    let path = dir.path().join("data.csv");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "f1,f2,f3,f4,f5,target")?;
    for i in 0..40u32 {
        let label = u8::from(i % 2 == 1);
        let jitter = ((i * 31) % 13) as f64 / 13.0;
        let base = if label == 1 { 9.0 } else { 1.0 };
        writeln!(
            file,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{}",
            base + jitter,
            (i % 5) as f64,
            2.0 + (i % 7) as f64 / 2.0,
            base - jitter,
            jitter * 3.0,
            label
        )?;
    }
    Ok(path)
}

fn service_in(dir: &TempDir) -> Result<ModelService> {
    let data_path = write_dataset(dir)?;
    let config = ServiceConfig {
        data_path: Some(data_path),
        artifacts_dir: dir.path().join("artifacts"),
        ..ServiceConfig::default()
    };
    Ok(ModelService::new(config)?)
}

fn full_record(service: &ModelService, seed: f64) -> FeatureRecord {
    service
        .list_feature_names()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), seed + i as f64))
        .collect()
}

#[test]
fn test_predict_before_training_is_not_ready() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;

    let record = full_record(&service, 1.0);
    assert!(matches!(
        service.predict_one(&record),
        Err(SelectError::ModelNotReady)
    ));
    assert!(matches!(
        service.predict_many(&[record]),
        Err(SelectError::ModelNotReady)
    ));
    Ok(())
}

#[test]
fn test_not_ready_recovers_after_training() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;

    let record = full_record(&service, 1.0);
    assert!(service.predict_one(&record).is_err());

    service.train()?;
    // The failed load must not have poisoned the model handle.
    assert!(service.predict_one(&record).is_ok());
    Ok(())
}

#[test]
fn test_get_metrics_is_read_through_and_idempotent() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;

    // Miss: triggers a training run and writes the cache.
    let first = service.get_metrics()?;
    assert!(!first.is_empty());
    assert!(dir.path().join("artifacts/metrics_cache.json").exists());

    // Hit: identical results, no retraining needed.
    let second = service.get_metrics()?;
    assert_eq!(
        serde_json::to_string(&first)?,
        serde_json::to_string(&second)?
    );
    Ok(())
}

#[test]
fn test_corrupt_metrics_cache_recovers_by_retraining() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;

    let artifacts = dir.path().join("artifacts");
    std::fs::create_dir_all(&artifacts)?;
    std::fs::write(artifacts.join("metrics_cache.json"), "garbage{{")?;

    // Corruption is a miss, not an error.
    let reports = service.get_metrics()?;
    assert!(!reports.is_empty());

    // The rewritten document now parses.
    let content = std::fs::read_to_string(artifacts.join("metrics_cache.json"))?;
    assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
    Ok(())
}

#[test]
fn test_prediction_probabilities_are_consistent() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;
    service.train()?;

    for seed in [0.0, 2.5, 9.0] {
        let prediction = service.predict_one(&full_record(&service, seed))?;
        let sum = prediction.probability_benign + prediction.probability_malignant;
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(
            prediction.prediction,
            u8::from(prediction.probability_benign >= 0.5)
        );
    }
    Ok(())
}

#[test]
fn test_batch_matches_single_predictions() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;
    service.train()?;

    let records: Vec<FeatureRecord> = [0.0, 1.0, 5.0, 8.0]
        .iter()
        .map(|&s| full_record(&service, s))
        .collect();

    let batch = service.predict_many(&records)?;
    assert_eq!(batch.len(), records.len());
    for (record, expected) in records.iter().zip(batch.iter()) {
        let single = service.predict_one(record)?;
        assert_eq!(&single, expected);
    }
    Ok(())
}

#[test]
fn test_missing_feature_is_named() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;
    service.train()?;

    let mut record = full_record(&service, 1.0);
    record.remove("f3");

    match service.predict_one(&record) {
        Err(SelectError::MissingFeatures(names)) => {
            assert_eq!(names, vec!["f3".to_string()]);
        }
        other => panic!("expected MissingFeatures, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_batch_with_one_bad_row_returns_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;
    service.train()?;

    let good = full_record(&service, 1.0);
    let mut bad = full_record(&service, 2.0);
    bad.remove("f3");

    match service.predict_many(&[good.clone(), bad, good]) {
        Err(SelectError::MissingFeatures(names)) => {
            assert_eq!(names, vec!["f3".to_string()]);
        }
        other => panic!("expected MissingFeatures, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_served_label_matches_winner_on_training_row() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;
    let outcome = service.train()?;

    let artifact = selectml_core::ModelArtifact::load(
        dir.path().join("artifacts/model.json"),
    )?;
    assert_eq!(artifact.winner, outcome.winner);

    // Row 1 of the dataset is a positive training sample (i = 1).
    let jitter = 31.0 % 13.0 / 13.0;
    let record: FeatureRecord = [
        ("f1", 9.0 + jitter),
        ("f2", 1.0),
        ("f3", 2.5),
        ("f4", 9.0 - jitter),
        ("f5", jitter * 3.0),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), *v))
    .collect();

    let served = service.predict_one(&record)?;
    let row = artifact.schema().vectorize(&record)?;
    let direct = artifact.pipeline.predict(&[row]);
    assert_eq!(served.prediction, direct[0]);
    Ok(())
}

#[test]
fn test_feature_names_match_dataset_header() -> Result<()> {
    let dir = TempDir::new()?;
    let service = service_in(&dir)?;
    assert_eq!(service.list_feature_names(), &["f1", "f2", "f3", "f4", "f5"]);
    Ok(())
}
