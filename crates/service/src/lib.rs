//! selectml serving layer
//!
//! Modules:
//! - `inference`: lazily-loaded, concurrency-safe prediction path
//! - `cache`: durable metrics cache with corrupt-read-as-miss semantics
//! - `service`: the facade handed to the external query layer

pub mod cache;
pub mod inference;
pub mod service;

pub use cache::MetricsCache;
pub use inference::{InferenceService, Prediction};
pub use service::{ModelService, ServiceConfig};

/// Re-export the shared error taxonomy for callers of the facade.
pub use selectml_core::{FeatureRecord, Result, SelectError};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
