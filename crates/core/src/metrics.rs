//! Evaluation metrics over string labels.
//!
//! All metrics are computed from a [`ConfusionMatrix`] built over the union of
//! true and predicted labels, sorted.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Accuracy,
    BalancedAccuracy,
    Informedness,
    CohenKappa,
    F1,
    Mcc,
}

impl Metric {
    /// Every metric in the order results are reported.
    pub const ALL: [Metric; 6] = [
        Metric::Accuracy,
        Metric::BalancedAccuracy,
        Metric::Informedness,
        Metric::CohenKappa,
        Metric::F1,
        Metric::Mcc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "Accuracy",
            Metric::BalancedAccuracy => "Balanced accuracy",
            Metric::Informedness => "Informedness",
            Metric::CohenKappa => "Cohen's kappa score",
            Metric::F1 => "F1 score",
            Metric::Mcc => "MCC",
        }
    }

    pub fn compute(&self, y_true: &[String], y_pred: &[String]) -> Result<f64> {
        let cm = ConfusionMatrix::new(y_true, y_pred)?;
        Ok(match self {
            Metric::Accuracy => cm.accuracy(),
            Metric::BalancedAccuracy => cm.balanced_accuracy(),
            Metric::Informedness => cm.informedness(),
            Metric::CohenKappa => cm.cohen_kappa(),
            Metric::F1 => cm.f1(),
            Metric::Mcc => cm.mcc(),
        })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counts indexed `[true][predicted]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<usize>>,
    total: usize,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[String], y_pred: &[String]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::PredictionMismatch {
                predictions: y_pred.len(),
                labels: y_true.len(),
            });
        }
        if y_true.is_empty() {
            return Err(Error::EmptyEvaluation);
        }
        let mut labels: Vec<String> = y_true.iter().chain(y_pred).cloned().collect();
        labels.sort();
        labels.dedup();
        let index = |l: &String| labels.binary_search(l).unwrap_or(0);
        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            counts[index(t)][index(p)] += 1;
        }
        Ok(Self {
            labels,
            counts,
            total: y_true.len(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self, truth: usize, predicted: usize) -> usize {
        self.counts[truth][predicted]
    }

    fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        self.correct() as f64 / self.total as f64
    }

    /// Mean recall over the classes that occur in the true labels.
    pub fn balanced_accuracy(&self) -> f64 {
        let recalls: Vec<f64> = (0..self.labels.len())
            .filter(|&c| self.support(c) > 0)
            .map(|c| self.counts[c][c] as f64 / self.support(c) as f64)
            .collect();
        recalls.iter().sum::<f64>() / recalls.len() as f64
    }

    /// Balanced accuracy rescaled so that chance scores 0 and perfect scores 1.
    pub fn informedness(&self) -> f64 {
        let present = (0..self.labels.len())
            .filter(|&c| self.support(c) > 0)
            .count();
        if present < 2 {
            return 0.0;
        }
        let chance = 1.0 / present as f64;
        (self.balanced_accuracy() - chance) / (1.0 - chance)
    }

    pub fn cohen_kappa(&self) -> f64 {
        let n = self.total as f64;
        let observed = self.accuracy();
        let expected: f64 = (0..self.labels.len())
            .map(|c| (self.support(c) as f64 / n) * (self.predicted(c) as f64 / n))
            .sum();
        if expected >= 1.0 {
            return 0.0;
        }
        (observed - expected) / (1.0 - expected)
    }

    fn f1_of(&self, class: usize) -> f64 {
        let tp = self.counts[class][class] as f64;
        let fp = self.predicted(class) as f64 - tp;
        let fn_ = self.support(class) as f64 - tp;
        let denom = 2.0 * tp + fp + fn_;
        if denom == 0.0 {
            0.0
        } else {
            2.0 * tp / denom
        }
    }

    /// F1 of the positive label for two classes, unweighted mean over all
    /// classes otherwise.
    pub fn f1(&self) -> f64 {
        if self.labels.len() <= 2 {
            let positive = match self.labels.iter().position(|l| is_truthy(l)) {
                Some(p) => p,
                // the positive class never occurred
                None if self.labels.len() == 1 => return 0.0,
                None => self.labels.len() - 1,
            };
            return self.f1_of(positive);
        }
        let total: f64 = (0..self.labels.len()).map(|c| self.f1_of(c)).sum();
        total / self.labels.len() as f64
    }

    /// Matthews correlation coefficient, 0 when either marginal is constant.
    pub fn mcc(&self) -> f64 {
        let s = self.total as f64;
        let c = self.correct() as f64;
        let k = self.labels.len();
        let t: Vec<f64> = (0..k).map(|i| self.support(i) as f64).collect();
        let p: Vec<f64> = (0..k).map(|i| self.predicted(i) as f64).collect();
        let cov_tp = c * s - t.iter().zip(&p).map(|(a, b)| a * b).sum::<f64>();
        let cov_pp = s * s - p.iter().map(|v| v * v).sum::<f64>();
        let cov_tt = s * s - t.iter().map(|v| v * v).sum::<f64>();
        if cov_pp * cov_tt == 0.0 {
            return 0.0;
        }
        cov_tp / (cov_pp * cov_tt).sqrt()
    }
}

fn is_truthy(label: &str) -> bool {
    matches!(
        label.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "1.0" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn binary_scores() {
        let y_true = labels(&["a", "a", "b", "b"]);
        let y_pred = labels(&["a", "b", "b", "b"]);
        let score = |m: Metric| m.compute(&y_true, &y_pred).unwrap();
        assert!(close(score(Metric::Accuracy), 0.75));
        assert!(close(score(Metric::BalancedAccuracy), 0.75));
        assert!(close(score(Metric::Informedness), 0.5));
        assert!(close(score(Metric::CohenKappa), 0.5));
        assert!(close(score(Metric::F1), 0.8));
        assert!(close(score(Metric::Mcc), 4.0 / 48f64.sqrt()));
    }

    #[test]
    fn f1_prefers_truthy_positive_label() {
        let y_true = labels(&["1", "9", "1"]);
        let y_pred = labels(&["1", "1", "9"]);
        // positive "1": tp 1, fp 1, fn 1
        assert!(close(Metric::F1.compute(&y_true, &y_pred).unwrap(), 0.5));
        let y_true = labels(&["True", "False", "True"]);
        let y_pred = labels(&["True", "True", "True"]);
        assert!(close(Metric::F1.compute(&y_true, &y_pred).unwrap(), 0.8));
    }

    #[test]
    fn f1_without_positive_label_is_zero() {
        let y = labels(&["False", "False", "False"]);
        assert_eq!(Metric::F1.compute(&y, &y).unwrap(), 0.0);
        let y = labels(&["0", "0"]);
        assert_eq!(Metric::F1.compute(&y, &y).unwrap(), 0.0);
        let y = labels(&["True", "True"]);
        assert!(close(Metric::F1.compute(&y, &y).unwrap(), 1.0));
    }

    #[test]
    fn f1_is_macro_for_three_classes() {
        let y_true = labels(&["a", "b", "c"]);
        let y_pred = labels(&["a", "b", "b"]);
        let f1 = Metric::F1.compute(&y_true, &y_pred).unwrap();
        assert!(close(f1, (1.0 + 2.0 / 3.0 + 0.0) / 3.0));
    }

    #[test]
    fn balanced_accuracy_ignores_classes_only_predicted() {
        let y_true = labels(&["a", "a", "b"]);
        let y_pred = labels(&["a", "c", "b"]);
        let cm = ConfusionMatrix::new(&y_true, &y_pred).unwrap();
        assert_eq!(cm.labels(), &["a", "b", "c"]);
        assert_eq!(cm.count(0, 2), 1);
        assert!(close(cm.balanced_accuracy(), 0.75));
    }

    #[test]
    fn degenerate_predictions_score_zero() {
        let y_true = labels(&["a", "b", "a", "b"]);
        let y_pred = labels(&["a", "a", "a", "a"]);
        assert!(close(Metric::Mcc.compute(&y_true, &y_pred).unwrap(), 0.0));
        assert!(close(Metric::CohenKappa.compute(&y_true, &y_pred).unwrap(), 0.0));
        assert!(close(Metric::Informedness.compute(&y_true, &y_true).unwrap(), 1.0));
    }

    #[test]
    fn perfect_multiclass_mcc() {
        let y = labels(&["a", "b", "c", "a"]);
        assert!(close(Metric::Mcc.compute(&y, &y).unwrap(), 1.0));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = Metric::Accuracy
            .compute(&labels(&["a"]), &labels(&["a", "b"]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PredictionMismatch { predictions: 2, labels: 1 }
        ));
        assert!(matches!(
            Metric::Accuracy.compute(&[], &[]),
            Err(Error::EmptyEvaluation)
        ));
    }

    #[test]
    fn names_match_report_lines() {
        let names: Vec<&str> = Metric::ALL.iter().map(Metric::name).collect();
        assert_eq!(
            names,
            vec![
                "Accuracy",
                "Balanced accuracy",
                "Informedness",
                "Cohen's kappa score",
                "F1 score",
                "MCC"
            ]
        );
    }
}
