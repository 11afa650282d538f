//! Accuracy metrics reported by the benchmark.
use std::collections::BTreeSet;

use serde::Serialize;

/// Number of positions where prediction and truth agree.
pub fn correct_count(y_true: &[i64], y_pred: &[i64]) -> usize {
    y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count()
}

/// Fraction of correct predictions. Returns 0 for empty input.
pub fn accuracy(y_true: &[i64], y_pred: &[i64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    correct_count(y_true, y_pred) as f64 / y_true.len() as f64
}

/// Correct predictions and support for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassRecall {
    pub label: i64,
    pub correct: usize,
    pub support: usize,
}

impl ClassRecall {
    pub fn recall(&self) -> f64 {
        if self.support == 0 {
            0.0
        } else {
            self.correct as f64 / self.support as f64
        }
    }
}

/// Recall of `label`: how many of its samples were predicted as `label`.
pub fn class_recall(y_true: &[i64], y_pred: &[i64], label: i64) -> ClassRecall {
    let mut correct = 0;
    let mut support = 0;
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        if *t == label {
            support += 1;
            if p == t {
                correct += 1;
            }
        }
    }
    ClassRecall {
        label,
        correct,
        support,
    }
}

/// Mean recall over the classes present in `y_true`.
pub fn balanced_accuracy(y_true: &[i64], y_pred: &[i64]) -> f64 {
    let classes: BTreeSet<i64> = y_true.iter().copied().collect();
    if classes.is_empty() {
        return 0.0;
    }
    let total: f64 = classes
        .iter()
        .map(|&c| class_recall(y_true, y_pred, c).recall())
        .sum();
    total / classes.len() as f64
}

/// Everything the benchmark prints about one prediction run.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationSummary {
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    /// Sorted by label, descending, so a binary problem lists class 1 first.
    pub per_class: Vec<ClassRecall>,
    pub balanced_accuracy: f64,
}

impl ClassificationSummary {
    pub fn compute(y_true: &[i64], y_pred: &[i64]) -> Self {
        let classes: BTreeSet<i64> = y_true.iter().copied().collect();
        let per_class = classes
            .iter()
            .rev()
            .map(|&c| class_recall(y_true, y_pred, c))
            .collect();
        Self {
            accuracy: accuracy(y_true, y_pred),
            correct: correct_count(y_true, y_pred),
            total: y_true.len(),
            per_class,
            balanced_accuracy: balanced_accuracy(y_true, y_pred),
        }
    }

    /// Correct predictions among samples of `label`, 0 if it never occurs.
    pub fn correct_for(&self, label: i64) -> usize {
        self.per_class
            .iter()
            .find(|c| c.label == label)
            .map_or(0, |c| c.correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_and_counts() {
        let y = [1, 0, 1, 1];
        let p = [1, 1, 1, 0];
        assert_eq!(correct_count(&y, &p), 2);
        assert!((accuracy(&y, &p) - 0.5).abs() < 1e-12);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn balanced_accuracy_averages_class_recall() {
        // class 1: 2/3 recalled, class 0: 1/1 recalled
        let y = [1, 1, 1, 0];
        let p = [1, 1, 0, 0];
        let expected = (2.0 / 3.0 + 1.0) / 2.0;
        assert!((balanced_accuracy(&y, &p) - expected).abs() < 1e-12);
    }

    #[test]
    fn summary_lists_positive_class_first() {
        let summary = ClassificationSummary::compute(&[0, 1, 1], &[0, 1, 0]);
        assert_eq!(summary.per_class[0].label, 1);
        assert_eq!(summary.per_class[0].correct, 1);
        assert_eq!(summary.per_class[1].label, 0);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.correct_for(1), 1);
        assert_eq!(summary.correct_for(0), 1);
        assert_eq!(summary.correct_for(7), 0);
    }
}
