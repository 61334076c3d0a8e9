//! Durable metrics cache
//!
//! Holds the latest ranked evaluation reports between training runs. A
//! missing or unreadable document is a cache miss, never an error: the
//! facade recovers by retraining, which rewrites the document.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use selectml_core::EvaluationReport;

/// Read-side of the metrics document written by the trainer.
#[derive(Clone, Debug)]
pub struct MetricsCache {
    path: PathBuf,
}

impl MetricsCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Latest ranked reports, or `None` on miss (absent or corrupt file).
    pub fn read(&self) -> Option<Vec<EvaluationReport>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "metrics cache unreadable; treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(reports) => Some(reports),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "metrics cache corrupt; treating as miss");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_missing_file_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetricsCache::new(dir.path().join("metrics.json"));
        assert!(cache.read().is_none());
    }

    #[test]
    fn test_corrupt_file_is_miss() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, "{ definitely not reports")?;

        let cache = MetricsCache::new(path);
        assert!(cache.read().is_none());
        Ok(())
    }

    #[test]
    fn test_valid_document_round_trips() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("metrics.json");

        let reports = vec![EvaluationReport {
            model: "logistic_regression".into(),
            accuracy: 0.95,
            f1: 0.96,
            roc_auc: 0.99,
            cv_mean_roc_auc: 0.98,
            cv_std_roc_auc: 0.01,
            confusion_matrix: [[10, 1], [0, 19]],
            classification_report: "report".into(),
        }];
        std::fs::write(&path, serde_json::to_string(&reports)?)?;

        let cache = MetricsCache::new(path);
        let read = cache.read().expect("cache hit");
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].model, "logistic_regression");
        Ok(())
    }
}
