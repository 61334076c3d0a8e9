//! Canonical feature schema and request vectorization
//!
//! The ordered feature-name list is the single source of truth for column
//! order at both training and serving time. Incoming records are validated
//! and vectorized strictly in schema order; extra keys are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::errors::{Result, SelectError};

/// A request-scoped feature record: name -> value.
pub type FeatureRecord = HashMap<String, f64>;

/// Ordered list of required feature names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Schema derived from a dataset's fixed column order.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            names: dataset.feature_names().to_vec(),
        }
    }

    /// Ordered feature names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of required features.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Vectorize one record in schema order.
    ///
    /// Fails with [`SelectError::MissingFeatures`] naming every absent
    /// column; extra keys in the record are ignored.
    pub fn vectorize(&self, record: &FeatureRecord) -> Result<Vec<f64>> {
        let mut row = Vec::with_capacity(self.names.len());
        let mut missing = Vec::new();
        for name in &self.names {
            match record.get(name) {
                Some(&value) => row.push(value),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(SelectError::MissingFeatures(missing));
        }
        Ok(row)
    }

    /// Vectorize a whole batch into one matrix.
    ///
    /// All-or-nothing: if any row is missing required columns, the call
    /// fails with the union of offending column names (in schema order)
    /// and no partial matrix is returned.
    pub fn vectorize_batch(&self, records: &[FeatureRecord]) -> Result<Vec<Vec<f64>>> {
        let mut missing: Vec<String> = Vec::new();
        for name in &self.names {
            if records.iter().any(|r| !r.contains_key(name)) {
                missing.push(name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(SelectError::MissingFeatures(missing));
        }

        records.iter().map(|r| self.vectorize(r)).collect()
    }
}
