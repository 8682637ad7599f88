//! Logistic-regression trainer.
//!
//! Full-batch gradient descent on standardized features with an L2 penalty
//! of strength `1 / (c · n_samples)`. Standardization is folded back into
//! the returned weights, so the model consumes raw encoded features.

use bon::Builder;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use super::{check_training_data, TrainError};
use crate::repr::{sigmoid, LinearClassifier};

/// Parameters for [`LogisticTrainer`].
#[derive(Clone, Debug, Builder)]
pub struct LogisticParams {
    /// Inverse regularization strength (default: 1.0).
    #[builder(default = 1.0)]
    pub c: f64,
    /// Gradient step size on standardized features (default: 0.5).
    #[builder(default = 0.5)]
    pub learning_rate: f64,
    /// Maximum number of full-batch iterations (default: 1000).
    #[builder(default = 1000)]
    pub max_iterations: u32,
    /// Stop once the largest gradient component falls below this (default: 1e-6).
    #[builder(default = 1e-6)]
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Trains a [`LinearClassifier`].
#[derive(Clone, Debug, Default)]
pub struct LogisticTrainer {
    params: LogisticParams,
}

impl LogisticTrainer {
    pub fn new(params: LogisticParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }

    /// Fit weights on `x` (`[n_samples, n_features]`) and 0/1 targets `y`.
    pub fn train(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<LinearClassifier, TrainError> {
        check_training_data(x, y)?;
        let params = &self.params;
        if params.c.is_nan() || params.c <= 0.0 {
            return Err(TrainError::InvalidParams(format!("c must be positive, got {}", params.c)));
        }
        if params.learning_rate.is_nan() || params.learning_rate <= 0.0 {
            return Err(TrainError::InvalidParams(format!(
                "learning_rate must be positive, got {}",
                params.learning_rate
            )));
        }

        let n_samples = x.nrows() as f64;
        let means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
        let stds = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 0.0 { s } else { 1.0 });
        let z = (&x - &means) / &stds;

        let lambda = 1.0 / (params.c * n_samples);
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        let mut iterations = 0;

        for iter in 0..params.max_iterations {
            iterations = iter + 1;
            let residual = (z.dot(&w) + b).mapv(sigmoid) - &y;
            let grad_w = z.t().dot(&residual) / n_samples + &w * lambda;
            let grad_b = residual.sum() / n_samples;

            w.scaled_add(-params.learning_rate, &grad_w);
            b -= params.learning_rate * grad_b;

            let max_grad = grad_w.iter().fold(grad_b.abs(), |m, g| m.max(g.abs()));
            if max_grad < params.tolerance {
                break;
            }
        }

        let weights = &w / &stds;
        let bias = b - weights.dot(&means);
        tracing::debug!(iterations, n_features = x.ncols(), "trained logistic regression");

        let model = LinearClassifier::new(weights, bias);
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::Classifier;
    use ndarray::array;

    #[test]
    fn separates_linearly_separable_data() {
        let x = array![[0.0, 10.0], [1.0, 11.0], [2.0, 10.0], [8.0, 10.0], [9.0, 12.0], [10.0, 11.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let model = LogisticTrainer::default().train(x.view(), y.view()).unwrap();
        let predicted = model.predict(x.view());
        assert_eq!(predicted, array![0u8, 0, 0, 1, 1, 1]);
        assert!(model.weight(0) > 0.0);
    }

    #[test]
    fn constant_feature_gets_zero_weight() {
        let x = array![[0.0, 3.0], [1.0, 3.0], [2.0, 3.0], [3.0, 3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let model = LogisticTrainer::default().train(x.view(), y.view()).unwrap();
        assert_eq!(model.weight(1), 0.0);
    }

    #[test]
    fn rejects_non_positive_c() {
        let params = LogisticParams::builder().c(0.0).build();
        let err = LogisticTrainer::new(params)
            .train(array![[1.0]].view(), array![1.0].view())
            .unwrap_err();
        assert!(matches!(err, TrainError::InvalidParams(_)));
    }
}
