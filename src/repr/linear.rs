//! Linear (logistic) classifier.

use ndarray::{Array1, ArrayView1};

use super::{Classifier, ReprValidationError};

/// Logistic classifier: `p = sigmoid(w · x + b)`.
///
/// Class 1 is predicted when `p >= 0.5`, i.e. when the margin is
/// non-negative.
///
/// # Example
///
/// ```
/// use diabeto::repr::{Classifier, LinearClassifier};
/// use ndarray::array;
///
/// let model = LinearClassifier::new(array![2.0, -1.0], 0.5);
/// assert_eq!(model.predict_row(array![1.0, 1.0].view()), 1);
/// assert_eq!(model.predict_row(array![0.0, 3.0].view()), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearClassifier {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearClassifier {
    /// Create a classifier from weights and bias.
    pub fn new(weights: Array1<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Zero-initialized classifier.
    pub fn zeros(n_features: usize) -> Self {
        Self::new(Array1::zeros(n_features), 0.0)
    }

    /// Coefficient of a feature.
    #[inline]
    pub fn weight(&self, feature: usize) -> f64 {
        self.weights[feature]
    }

    /// All coefficients.
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Intercept.
    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Raw score `w · x + b`.
    #[inline]
    pub fn margin(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.weights.dot(&x) + self.bias
    }

    /// Check that every parameter is finite.
    pub fn validate(&self) -> Result<(), ReprValidationError> {
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(ReprValidationError::NonFiniteWeight { index: i });
        }
        if !self.bias.is_finite() {
            return Err(ReprValidationError::NonFiniteWeight {
                index: self.weights.len(),
            });
        }
        Ok(())
    }
}

impl Classifier for LinearClassifier {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba_row(&self, x: ArrayView1<'_, f64>) -> f64 {
        sigmoid(self.margin(x))
    }

    fn predict_row(&self, x: ArrayView1<'_, f64>) -> u8 {
        u8::from(self.margin(x) >= 0.0)
    }
}

/// Numerically stable sigmoid.
/// Clamps input to [-500, 500] to prevent overflow.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn sigmoid_zero_is_half() {
        assert_abs_diff_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_large_values_stable() {
        assert!(sigmoid(-1000.0) < 1e-100);
        assert!(sigmoid(1000.0) > 1.0 - 1e-12);
        assert!(sigmoid(f64::NAN).is_nan());
    }

    #[test]
    fn margin_is_dot_plus_bias() {
        let model = LinearClassifier::new(array![1.0, 2.0, 3.0], -1.0);
        assert_abs_diff_eq!(model.margin(array![1.0, 1.0, 1.0].view()), 5.0);
    }

    #[test]
    fn boundary_predicts_positive() {
        let model = LinearClassifier::new(array![1.0], -2.0);
        assert_eq!(model.predict_row(array![2.0].view()), 1);
        assert_abs_diff_eq!(model.predict_proba_row(array![2.0].view()), 0.5);
    }

    #[test]
    fn validate_rejects_nan() {
        let model = LinearClassifier::new(array![1.0, f64::NAN], 0.0);
        assert_eq!(
            model.validate(),
            Err(ReprValidationError::NonFiniteWeight { index: 1 })
        );
    }
}
