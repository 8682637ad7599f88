//! Fitted prediction pipelines.
//!
//! A [`Pipeline`] chains the three fitted stages:
//!
//! ```text
//! Frame ──► IqrClipper ──► OneHotEncoder ──► Model ──► Prediction
//! ```
//!
//! Pipelines are immutable once fitted or loaded and are shared read-only
//! between request handlers.

mod kind;

use bon::Builder;
use ndarray::{Array1, Array2, ArrayView1};
use thiserror::Error;

use crate::data::Frame;
use crate::error::Result;
use crate::features::{FeatureRow, NUMERIC_FIELDS};
use crate::preprocess::{IqrClipper, OneHotEncoder, DEFAULT_MULTIPLIER};
use crate::repr::{Classifier, DecisionTree, LinearClassifier};
use crate::training::{LogisticParams, LogisticTrainer, TreeParams, TreeTrainer};

pub use kind::{PipelineKind, Prediction};

/// The fitted stages cannot be chained or cannot consume the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// The encoder produced a different width than the model expects.
    #[error("inference error: model expects {expected} features, encoder produced {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// A feature seen at fit time is absent from the input.
    #[error("inference error: missing feature `{0}`")]
    MissingFeature(String),

    /// The model family does not match the pipeline kind.
    #[error("inference error: {kind} pipeline cannot hold a {model} model")]
    KindMismatch { kind: PipelineKind, model: PipelineKind },

    /// A stage was assembled without being fitted.
    #[error("inference error: {0} stage is not fitted")]
    Unfitted(&'static str),
}

/// Classifier at the end of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Linear(LinearClassifier),
    Tree(DecisionTree),
}

impl Model {
    /// Pipeline kind this model belongs to.
    pub fn kind(&self) -> PipelineKind {
        match self {
            Self::Linear(_) => PipelineKind::Logistic,
            Self::Tree(_) => PipelineKind::Tree,
        }
    }
}

impl Classifier for Model {
    fn n_features(&self) -> usize {
        match self {
            Self::Linear(m) => m.n_features(),
            Self::Tree(m) => m.n_features(),
        }
    }

    fn predict_proba_row(&self, x: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Linear(m) => m.predict_proba_row(x),
            Self::Tree(m) => m.predict_proba_row(x),
        }
    }

    fn predict_row(&self, x: ArrayView1<'_, f64>) -> u8 {
        match self {
            Self::Linear(m) => m.predict_row(x),
            Self::Tree(m) => m.predict_row(x),
        }
    }
}

/// Settings used by [`Pipeline::fit`].
#[derive(Clone, Debug, Builder)]
pub struct TrainConfig {
    /// Columns the clipper fits fences for (default: the numeric fields).
    #[builder(default = NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect())]
    pub clip_columns: Vec<String>,
    /// IQR fence multiplier (default: 1.5).
    #[builder(default = DEFAULT_MULTIPLIER)]
    pub multiplier: f64,
    #[builder(default)]
    pub logistic: LogisticParams,
    #[builder(default)]
    pub tree: TreeParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Clipper, encoder and classifier fitted together.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    kind: PipelineKind,
    feature_names: Vec<String>,
    clipper: IqrClipper,
    encoder: OneHotEncoder,
    model: Model,
}

impl Pipeline {
    /// Fit every stage on `frame` and 0/1 `targets`.
    ///
    /// The clipper is fitted and applied first, the encoder is fitted on the
    /// clipped frame, and the classifier on the encoded matrix.
    pub fn fit(kind: PipelineKind, frame: &Frame, targets: ArrayView1<'_, f64>, config: &TrainConfig) -> Result<Self> {
        let mut clipper = IqrClipper::with_multiplier(config.multiplier);
        let clipped = clipper.fit_transform(frame, config.clip_columns.as_slice())?;

        let mut encoder = OneHotEncoder::new();
        let x = encoder.fit_transform(&clipped)?;

        let model = match kind {
            PipelineKind::Logistic => Model::Linear(LogisticTrainer::new(config.logistic.clone()).train(x.view(), targets)?),
            PipelineKind::Tree => Model::Tree(TreeTrainer::new(config.tree.clone()).train(x.view(), targets)?),
        };

        tracing::info!(
            %kind,
            n_rows = frame.n_rows(),
            n_columns = frame.n_columns(),
            n_features = model.n_features(),
            "fitted pipeline"
        );

        Ok(Self {
            kind,
            feature_names: frame.names().to_vec(),
            clipper,
            encoder,
            model,
        })
    }

    /// Assemble a pipeline from already fitted stages.
    pub fn from_parts(
        kind: PipelineKind,
        feature_names: Vec<String>,
        clipper: IqrClipper,
        encoder: OneHotEncoder,
        model: Model,
    ) -> Result<Self, InferenceError> {
        if model.kind() != kind {
            return Err(InferenceError::KindMismatch {
                kind,
                model: model.kind(),
            });
        }
        if !clipper.is_fitted() {
            return Err(InferenceError::Unfitted("clipper"));
        }
        let width = encoder.n_outputs().ok_or(InferenceError::Unfitted("encoder"))?;
        if width != model.n_features() {
            return Err(InferenceError::FeatureMismatch {
                expected: model.n_features(),
                actual: width,
            });
        }
        Ok(Self {
            kind,
            feature_names,
            clipper,
            encoder,
            model,
        })
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Input columns in training order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn clipper(&self) -> &IqrClipper {
        &self.clipper
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Width of the encoded rows the classifier consumes.
    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Predict one normalized row.
    ///
    /// The row is treated as a one-row frame, so clipping replaces an
    /// out-of-fence value by that row's own value (the median of a single
    /// value).
    pub fn predict_row(&self, row: &FeatureRow) -> Result<Prediction> {
        if let Some(missing) = self.feature_names.iter().find(|name| row.get(name).is_none()) {
            return Err(InferenceError::MissingFeature(missing.clone()).into());
        }
        let frame = Frame::from_rows(std::slice::from_ref(row))?;
        let x = self.encode(&frame)?;
        let prediction = Prediction::from_class(self.model.predict_row(x.row(0)));
        tracing::debug!(kind = %self.kind, %prediction, "predicted row");
        Ok(prediction)
    }

    /// Predict classes (0 or 1) for every row of `frame`.
    pub fn predict_frame(&self, frame: &Frame) -> Result<Array1<u8>> {
        let x = self.encode(frame)?;
        Ok(self.model.predict(x.view()))
    }

    /// Probability of class 1 for every row of `frame`.
    pub fn predict_proba_frame(&self, frame: &Frame) -> Result<Array1<f64>> {
        let x = self.encode(frame)?;
        Ok(x.rows().into_iter().map(|row| self.model.predict_proba_row(row)).collect())
    }

    /// Clip and encode `frame` into the classifier's input matrix.
    pub fn encode(&self, frame: &Frame) -> Result<Array2<f64>> {
        let clipped = self.clipper.transform(frame)?;
        let x = self.encoder.transform(&clipped)?;
        if x.ncols() != self.model.n_features() {
            return Err(InferenceError::FeatureMismatch {
                expected: self.model.n_features(),
                actual: x.ncols(),
            }
            .into());
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::features::{normalize, FeatureValue};
    use crate::testing::{sample_record, synthetic_frame};
    use ndarray::array;

    fn tiny_frame() -> Frame {
        Frame::from_columns([
            ("age", Column::Numeric(array![20.0, 25.0, 30.0, 35.0, 60.0, 65.0, 70.0, 75.0])),
            (
                "gender",
                Column::Categorical(
                    ["Male", "Female", "Male", "Female", "Male", "Female", "Male", "Female"]
                        .map(String::from)
                        .to_vec(),
                ),
            ),
        ])
        .unwrap()
    }

    fn tiny_config() -> TrainConfig {
        TrainConfig::builder().clip_columns(vec!["age".to_string()]).build()
    }

    #[test]
    fn fit_both_kinds_on_tiny_frame() {
        let frame = tiny_frame();
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        for kind in PipelineKind::ALL {
            let pipeline = Pipeline::fit(kind, &frame, y.view(), &tiny_config()).unwrap();
            assert_eq!(pipeline.kind(), kind);
            assert_eq!(pipeline.n_features(), 3);
            assert_eq!(pipeline.predict_frame(&frame).unwrap(), array![0u8, 0, 0, 0, 1, 1, 1, 1]);
        }
    }

    #[test]
    fn predicts_sample_record() {
        let (frame, y) = synthetic_frame(200, 7).unwrap();
        let pipeline = Pipeline::fit(PipelineKind::Tree, &frame, y.view(), &TrainConfig::default()).unwrap();
        let row = normalize(&sample_record());
        let prediction = pipeline.predict_row(&row).unwrap();
        assert!(matches!(prediction, Prediction::Smoker | Prediction::NonSmoker));
    }

    #[test]
    fn missing_feature_is_reported() {
        let frame = tiny_frame();
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let pipeline = Pipeline::fit(PipelineKind::Logistic, &frame, y.view(), &tiny_config()).unwrap();

        let row = FeatureRow::from_pairs(vec![("age", FeatureValue::Int(30))]);
        let err = pipeline.predict_row(&row).unwrap_err();
        assert!(err.to_string().contains("gender"));
    }

    #[test]
    fn from_parts_checks_kind_and_width() {
        let frame = tiny_frame();
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let fitted = Pipeline::fit(PipelineKind::Logistic, &frame, y.view(), &tiny_config()).unwrap();

        let err = Pipeline::from_parts(
            PipelineKind::Tree,
            fitted.feature_names().to_vec(),
            fitted.clipper().clone(),
            fitted.encoder().clone(),
            fitted.model().clone(),
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::KindMismatch { .. }));

        let err = Pipeline::from_parts(
            PipelineKind::Logistic,
            fitted.feature_names().to_vec(),
            fitted.clipper().clone(),
            fitted.encoder().clone(),
            Model::Linear(LinearClassifier::zeros(5)),
        )
        .unwrap_err();
        assert_eq!(err, InferenceError::FeatureMismatch { expected: 5, actual: 3 });
    }
}
