//! Evaluation metrics and per-candidate reports
//!
//! Binary-classification metrics computed on held-out predictions:
//! accuracy, F1, tie-aware rank ROC-AUC, confusion matrix, and a
//! plain-text classification report. Ranking is a strict total order on
//! (ROC-AUC desc, F1 desc) with ties beyond that kept stable.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SelectError};

/// Display names for the two classes, indexed by label.
pub const CLASS_NAMES: [&str; 2] = ["malignant(0)", "benign(1)"];

/// One candidate's evaluation on the held-out split, immutable once produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model: String,
    pub accuracy: f64,
    pub f1: f64,
    pub roc_auc: f64,
    pub cv_mean_roc_auc: f64,
    pub cv_std_roc_auc: f64,
    /// Rows are actual class, columns are predicted class.
    pub confusion_matrix: [[u64; 2]; 2],
    pub classification_report: String,
}

/// Confusion matrix with rows = actual class, columns = predicted class.
pub fn confusion_matrix(y_true: &[u8], y_pred: &[u8]) -> [[u64; 2]; 2] {
    let mut matrix = [[0u64; 2]; 2];
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        matrix[t as usize][p as usize] += 1;
    }
    matrix
}

/// Fraction of predictions matching the true labels.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Precision and recall for one class label.
fn precision_recall(y_true: &[u8], y_pred: &[u8], class: u8) -> (f64, f64) {
    let tp = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(&t, &p)| t == class && p == class)
        .count() as f64;
    let predicted = y_pred.iter().filter(|&&p| p == class).count() as f64;
    let actual = y_true.iter().filter(|&&t| t == class).count() as f64;

    let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
    let recall = if actual > 0.0 { tp / actual } else { 0.0 };
    (precision, recall)
}

fn f1_from(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// F1 score of the positive class (label 1).
pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let (precision, recall) = precision_recall(y_true, y_pred, 1);
    f1_from(precision, recall)
}

/// Area under the ROC curve via tie-aware average ranks (Mann-Whitney).
///
/// Requires both classes to be present in `y_true`.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Result<f64> {
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(SelectError::InvalidDataset(
            "ROC-AUC requires both classes in the evaluation split".into(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average 1-based ranks over tied score groups.
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&t, _)| t == 1)
        .map(|(_, &r)| r)
        .sum();

    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Ok(u / (n_pos as f64 * n_neg as f64))
}

/// Plain-text per-class precision/recall/F1/support summary.
pub fn classification_report(y_true: &[u8], y_pred: &[u8]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>14} {:>10} {:>10} {:>10} {:>10}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));

    for class in 0..2u8 {
        let (precision, recall) = precision_recall(y_true, y_pred, class);
        let f1 = f1_from(precision, recall);
        let support = y_true.iter().filter(|&&t| t == class).count();
        out.push_str(&format!(
            "{:>14} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
            CLASS_NAMES[class as usize], precision, recall, f1, support
        ));
    }

    out.push_str(&format!(
        "\n{:>14} {:>10} {:>10} {:>10.4} {:>10}\n",
        "accuracy",
        "",
        "",
        accuracy(y_true, y_pred),
        y_true.len()
    ));
    out
}

/// Sort reports by (ROC-AUC desc, F1 desc); full ties keep registry order.
pub fn rank_reports(reports: &mut [EvaluationReport]) {
    reports.sort_by(|a, b| {
        b.roc_auc
            .total_cmp(&a.roc_auc)
            .then_with(|| b.f1.total_cmp(&a.f1))
    });
}
