//! Persisted model artifact
//!
//! The single currently-active fitted pipeline, stored as JSON with an
//! embedded blake3 hash over the pipeline and feature order. Writes are
//! atomic (temp file + rename) so a crashed run never leaves a truncated
//! artifact; the hash is verified on every load.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::candidates::Pipeline;
use crate::errors::{Result, SelectError};
use crate::schema::FeatureSchema;

/// The persisted winner: fitted pipeline plus serving metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Name of the winning candidate.
    pub winner: String,
    /// Canonical feature order the pipeline was fit with.
    pub feature_names: Vec<String>,
    /// The fitted pipeline (refit on the full dataset).
    pub pipeline: Pipeline,
    /// Unix timestamp (seconds, UTC) of the training run.
    pub trained_at: i64,
    /// blake3 over the serialized pipeline and feature order.
    pub model_hash: String,
}

#[derive(Serialize)]
struct HashInput<'a> {
    feature_names: &'a [String],
    pipeline: &'a Pipeline,
}

fn content_hash(feature_names: &[String], pipeline: &Pipeline) -> Result<String> {
    let json = serde_json::to_string(&HashInput {
        feature_names,
        pipeline,
    })?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}

impl ModelArtifact {
    /// Package a fitted pipeline, computing the content hash.
    pub fn build(winner: String, feature_names: Vec<String>, pipeline: Pipeline) -> Result<Self> {
        let model_hash = content_hash(&feature_names, &pipeline)?;
        Ok(Self {
            winner,
            feature_names,
            pipeline,
            trained_at: chrono::Utc::now().timestamp(),
            model_hash,
        })
    }

    /// Serving schema in the exact training-time column order.
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.feature_names.clone())
    }

    /// Atomically overwrite the artifact at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, path)?;

        info!(
            winner = %self.winner,
            hash = %self.model_hash,
            path = %path.display(),
            "persisted model artifact"
        );
        Ok(())
    }

    /// Load and verify an artifact.
    ///
    /// A missing file is [`SelectError::ModelNotReady`]; an undecodable
    /// file or hash mismatch is [`SelectError::CorruptArtifact`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SelectError::ModelNotReady);
            }
            Err(e) => return Err(e.into()),
        };

        let artifact: ModelArtifact = serde_json::from_str(&content).map_err(|e| {
            SelectError::CorruptArtifact(format!("{}: {e}", path.display()))
        })?;

        let expected = content_hash(&artifact.feature_names, &artifact.pipeline)?;
        if artifact.model_hash != expected {
            return Err(SelectError::CorruptArtifact(format!(
                "{}: hash mismatch",
                path.display()
            )));
        }

        Ok(artifact)
    }
}
