//! Core types for binary-classification model selection and serving
//!
//! Modules:
//! - `dataset`: fixed tabular dataset provider (built-in table or CSV)
//! - `schema`: canonical feature order, request validation, vectorization
//! - `scaler`: standardization step shared by the scaled candidates
//! - `candidates`: candidate registry and estimator implementations
//! - `metrics`: held-out evaluation metrics, reports, and ranking
//! - `model`: persisted model artifact with hash verification
//! - `errors`: workspace-wide error taxonomy

pub mod candidates;
pub mod dataset;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod scaler;
pub mod schema;

pub use candidates::{build_candidates, Candidate, Estimator, Pipeline, ScoreKind};
pub use dataset::Dataset;
pub use errors::{Result, SelectError};
pub use metrics::{rank_reports, EvaluationReport};
pub use model::ModelArtifact;
pub use scaler::StandardScaler;
pub use schema::{FeatureRecord, FeatureSchema};

/// Crate version string for artifact metadata and logs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
