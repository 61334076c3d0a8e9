//! Fixed tabular dataset provider
//!
//! Supplies the immutable feature matrix, binary label vector, and ordered
//! feature-name list shared by training and serving. Datasets load from a
//! CSV with a header row and a trailing `target` column, or from the
//! bundled diagnostic table parsed once per process.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::errors::{Result, SelectError};

/// Bundled breast-cancer style diagnostic table (benign = 1, malignant = 0).
const BUILTIN_CSV: &str = include_str!("../data/breast_diagnostic.csv");

static BUILTIN: OnceCell<Dataset> = OnceCell::new();

/// Immutable tabular dataset: N rows, F real-valued features, binary labels.
///
/// Column order of `features` matches `feature_names`; `features.len()`
/// equals `labels.len()`. Never mutated after construction.
#[derive(Clone, Debug)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Construct a dataset, checking structural invariants.
    pub fn new(feature_names: Vec<String>, features: Vec<Vec<f64>>, labels: Vec<u8>) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(SelectError::InvalidDataset("no feature columns".into()));
        }
        let unique: HashSet<&String> = feature_names.iter().collect();
        if unique.len() != feature_names.len() {
            return Err(SelectError::InvalidDataset("duplicate feature names".into()));
        }
        if features.len() != labels.len() {
            return Err(SelectError::InvalidDataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(SelectError::InvalidDataset("dataset is empty".into()));
        }
        for (i, row) in features.iter().enumerate() {
            if row.len() != feature_names.len() {
                return Err(SelectError::InvalidDataset(format!(
                    "row {}: expected {} features, got {}",
                    i,
                    feature_names.len(),
                    row.len()
                )));
            }
        }
        if let Some(&bad) = labels.iter().find(|&&l| l > 1) {
            return Err(SelectError::InvalidDataset(format!(
                "label {bad} is not binary"
            )));
        }
        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Load a dataset from a CSV file with a header row.
    ///
    /// Expected format: `name1,name2,...,target` followed by numeric rows;
    /// the final column is the 0/1 label.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_csv(&content)
    }

    /// The bundled diagnostic dataset, parsed once per process.
    pub fn builtin() -> Result<&'static Dataset> {
        BUILTIN.get_or_try_init(|| Self::parse_csv(BUILTIN_CSV))
    }

    fn parse_csv(content: &str) -> Result<Self> {
        let mut lines = content.lines().enumerate().filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        });

        let (_, header) = lines
            .next()
            .ok_or_else(|| SelectError::InvalidDataset("missing header row".into()))?;
        let mut columns: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();
        if columns.len() < 2 {
            return Err(SelectError::InvalidDataset(
                "header must contain at least one feature and a target".into(),
            ));
        }
        let target = columns.pop().unwrap_or_default();
        if target != "target" {
            return Err(SelectError::InvalidDataset(format!(
                "last header column must be 'target', got '{target}'"
            )));
        }
        let feature_count = columns.len();

        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (line_idx, line) in lines {
            let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
            if parts.len() != feature_count + 1 {
                return Err(SelectError::InvalidDataset(format!(
                    "line {}: expected {} columns, got {}",
                    line_idx + 1,
                    feature_count + 1,
                    parts.len()
                )));
            }

            let mut row = Vec::with_capacity(feature_count);
            for (i, part) in parts.iter().take(feature_count).enumerate() {
                let val: f64 = part.parse().map_err(|_| {
                    SelectError::InvalidDataset(format!(
                        "line {}, column '{}': invalid number '{}'",
                        line_idx + 1,
                        columns[i],
                        part
                    ))
                })?;
                row.push(val);
            }

            let label: u8 = parts[feature_count].parse().map_err(|_| {
                SelectError::InvalidDataset(format!("line {}: invalid target", line_idx + 1))
            })?;

            features.push(row);
            labels.push(label);
        }

        Self::new(columns, features, labels)
    }

    /// Ordered feature-name list.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature matrix rows.
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Binary label vector (1 = benign, 0 = malignant).
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True when the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of feature columns.
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Materialize the sub-dataset selected by `indices` as (rows, labels).
    pub fn select(&self, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<u8>) {
        let rows = indices.iter().map(|&i| self.features[i].clone()).collect();
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        (rows, labels)
    }
}
