//! Evaluation metrics for trained pipelines.
//!
//! Used by the training binary to report held-out quality; they play no
//! part in fitting.

/// A scalar quality measure over predictions and 0/1 labels.
pub trait Metric: Send + Sync {
    /// Compute the metric value.
    fn compute(&self, preds: &[f64], labels: &[f64]) -> f64;

    /// Whether higher values indicate better performance.
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Accuracy
// =============================================================================

/// Proportion of correct predictions.
///
/// Predictions are class probabilities (or classes); `p >= threshold`
/// counts as class 1.
#[derive(Debug, Clone, Copy)]
pub struct Accuracy {
    /// Decision threshold (default: 0.5).
    pub threshold: f64,
}

impl Default for Accuracy {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl Metric for Accuracy {
    fn compute(&self, preds: &[f64], labels: &[f64]) -> f64 {
        debug_assert_eq!(preds.len(), labels.len());
        if preds.is_empty() {
            return 0.0;
        }
        let correct = preds
            .iter()
            .zip(labels)
            .filter(|(p, l)| {
                let class = if **p >= self.threshold { 1.0 } else { 0.0 };
                (class - **l).abs() < 0.5
            })
            .count();
        correct as f64 / preds.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

// =============================================================================
// LogLoss
// =============================================================================

/// Binary cross-entropy over probabilities in (0, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLoss;

impl Metric for LogLoss {
    fn compute(&self, preds: &[f64], labels: &[f64]) -> f64 {
        debug_assert_eq!(preds.len(), labels.len());
        if preds.is_empty() {
            return 0.0;
        }
        let eps = 1e-15;
        preds
            .iter()
            .zip(labels)
            .map(|(p, l)| {
                let p = p.clamp(eps, 1.0 - eps);
                -(l * p.ln() + (1.0 - l) * (1.0 - p).ln())
            })
            .sum::<f64>()
            / preds.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "logloss"
    }
}

// =============================================================================
// Confusion counts
// =============================================================================

/// Binary confusion matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl Confusion {
    /// Tally predicted classes against 0/1 labels.
    pub fn from_classes(predicted: &[u8], labels: &[f64]) -> Self {
        debug_assert_eq!(predicted.len(), labels.len());
        let mut counts = Self::default();
        for (&p, &l) in predicted.iter().zip(labels) {
            match (p == 1, l >= 0.5) {
                (true, true) => counts.true_positive += 1,
                (true, false) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (false, true) => counts.false_negative += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// `tp / (tp + fp)`, or 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// `tp / (tp + fn)`, or 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn accuracy_thresholds_probabilities() {
        let acc = Accuracy::default().compute(&[0.9, 0.2, 0.5, 0.4], &[1.0, 0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(acc, 0.5);
        assert!(Accuracy::default().higher_is_better());
    }

    #[test]
    fn logloss_perfect_is_near_zero() {
        let loss = LogLoss.compute(&[1.0, 0.0], &[1.0, 0.0]);
        assert!(loss < 1e-10);
        assert_abs_diff_eq!(LogLoss.compute(&[0.5], &[1.0]), std::f64::consts::LN_2, epsilon = 1e-12);
    }

    #[test]
    fn confusion_counts() {
        let c = Confusion::from_classes(&[1, 1, 0, 0, 1], &[1.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(
            c,
            Confusion {
                true_positive: 2,
                false_positive: 1,
                true_negative: 1,
                false_negative: 1,
            }
        );
        assert_eq!(c.total(), 5);
        assert_abs_diff_eq!(c.precision(), 2.0 / 3.0);
        assert_abs_diff_eq!(c.recall(), 2.0 / 3.0);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(Accuracy::default().compute(&[], &[]), 0.0);
        assert_eq!(Confusion::default().precision(), 0.0);
    }
}
