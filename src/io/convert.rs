//! Conversion between pipelines and payloads, and the file-level API.
//!
//! ```ignore
//! use diabeto::pipeline::{Pipeline, PipelineKind};
//!
//! pipeline.save("diabeto_LR.dbto")?;
//! let loaded = Pipeline::load_expecting("diabeto_LR.dbto", PipelineKind::Logistic)?;
//! ```

use std::io::{Read, Write};
use std::path::Path;

use crate::io::native::{DeserializeError, NativeCodec, SerializeError};
use crate::io::payload::{
    CategoricalPayload, ClipperPayload, EncoderPayload, FencePayload, JsonEnvelope, ModelPayload,
    Payload, PipelineV1, TreePayload, JSON_FORMAT_VERSION,
};
use crate::pipeline::{Model, Pipeline, PipelineKind};
use crate::preprocess::{is_valid_multiplier, CategoricalColumn, Fence, IqrClipper, OneHotEncoder};
use crate::repr::{DecisionTree, LinearClassifier, TreeArrays};

// ============================================================================
// Pipeline Serialization API
// ============================================================================

impl Pipeline {
    /// Save the pipeline to a file in native `.dbto` format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::info!(kind = %self.kind(), path = %path.as_ref().display(), "saved pipeline");
        Ok(())
    }

    /// Load a pipeline from a file in native `.dbto` format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path.as_ref())?;
        let pipeline = Self::from_bytes(&bytes)?;
        tracing::info!(
            kind = %pipeline.kind(),
            path = %path.as_ref().display(),
            n_features = pipeline.n_features(),
            "loaded pipeline"
        );
        Ok(pipeline)
    }

    /// Load a pipeline and check that it is of the `expected` kind.
    pub fn load_expecting(path: impl AsRef<Path>, expected: PipelineKind) -> Result<Self, DeserializeError> {
        let pipeline = Self::load(path)?;
        if pipeline.kind() != expected {
            return Err(DeserializeError::KindMismatch {
                expected,
                actual: pipeline.kind(),
            });
        }
        Ok(pipeline)
    }

    /// Serialize the pipeline to bytes, header included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        let payload = Payload::V1(PipelineV1::from(self));
        NativeCodec::new().serialize(self.kind(), self.n_features() as u32, &payload)
    }

    /// Deserialize a pipeline from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let (header, payload): (_, Payload) = NativeCodec::new().deserialize(bytes)?;
        let Payload::V1(v1) = payload;
        if v1.kind != header.kind {
            return Err(DeserializeError::CorruptPayload(format!(
                "header says {} but payload holds {}",
                header.kind, v1.kind
            )));
        }
        let pipeline = Self::try_from(v1)?;
        if pipeline.n_features() != header.num_features as usize {
            return Err(DeserializeError::CorruptPayload(format!(
                "header declares {} features, model has {}",
                header.num_features,
                pipeline.n_features()
            )));
        }
        Ok(pipeline)
    }

    /// Write the JSON mirror of the pipeline.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), SerializeError> {
        let envelope = JsonEnvelope {
            format_version: JSON_FORMAT_VERSION,
            kind: self.kind(),
            pipeline: PipelineV1::from(self),
        };
        serde_json::to_writer_pretty(writer, &envelope)?;
        Ok(())
    }

    /// Read a pipeline from its JSON mirror.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, DeserializeError> {
        let envelope: JsonEnvelope = serde_json::from_reader(reader)?;
        if envelope.format_version > JSON_FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion {
                major: u8::try_from(envelope.format_version).unwrap_or(u8::MAX),
                minor: 0,
            });
        }
        if envelope.kind != envelope.pipeline.kind {
            return Err(DeserializeError::KindMismatch {
                expected: envelope.kind,
                actual: envelope.pipeline.kind,
            });
        }
        Self::try_from(envelope.pipeline)
    }
}

// ============================================================================
// Runtime -> Payload
// ============================================================================

impl From<&Pipeline> for PipelineV1 {
    fn from(pipeline: &Pipeline) -> Self {
        Self {
            kind: pipeline.kind(),
            feature_names: pipeline.feature_names().to_vec(),
            clipper: ClipperPayload::from(pipeline.clipper()),
            encoder: EncoderPayload::from(pipeline.encoder()),
            model: ModelPayload::from(pipeline.model()),
        }
    }
}

impl From<&IqrClipper> for ClipperPayload {
    fn from(clipper: &IqrClipper) -> Self {
        let fences = clipper
            .fences()
            .unwrap_or_default()
            .iter()
            .map(|(column, fence)| FencePayload {
                column: column.clone(),
                lower: fence.lower,
                upper: fence.upper,
            })
            .collect();
        Self {
            multiplier: clipper.multiplier(),
            fences,
        }
    }
}

impl From<&OneHotEncoder> for EncoderPayload {
    fn from(encoder: &OneHotEncoder) -> Self {
        Self {
            numeric: encoder.numeric_columns().unwrap_or_default().to_vec(),
            categorical: encoder
                .categorical_columns()
                .unwrap_or_default()
                .iter()
                .map(|c| CategoricalPayload {
                    name: c.name.clone(),
                    categories: c.categories.clone(),
                })
                .collect(),
        }
    }
}

impl From<&Model> for ModelPayload {
    fn from(model: &Model) -> Self {
        match model {
            Model::Linear(m) => Self::Linear {
                weights: m.weights().to_vec(),
                bias: m.bias(),
            },
            Model::Tree(t) => {
                let arrays = t.to_arrays();
                Self::Tree(TreePayload {
                    n_features: arrays.n_features as u32,
                    split_features: arrays.split_features,
                    thresholds: arrays.thresholds,
                    left_children: arrays.left_children,
                    right_children: arrays.right_children,
                    is_leaf: arrays.is_leaf,
                    leaf_values: arrays.leaf_values,
                })
            }
        }
    }
}

// ============================================================================
// Payload -> Runtime
// ============================================================================

impl TryFrom<PipelineV1> for Pipeline {
    type Error = DeserializeError;

    fn try_from(payload: PipelineV1) -> Result<Self, Self::Error> {
        let clipper = IqrClipper::try_from(payload.clipper)?;
        let encoder = OneHotEncoder::try_from(payload.encoder)?;
        let model = Model::try_from(payload.model)?;
        Ok(Pipeline::from_parts(
            payload.kind,
            payload.feature_names,
            clipper,
            encoder,
            model,
        )?)
    }
}

impl TryFrom<ClipperPayload> for IqrClipper {
    type Error = DeserializeError;

    fn try_from(payload: ClipperPayload) -> Result<Self, Self::Error> {
        if !is_valid_multiplier(payload.multiplier) {
            return Err(DeserializeError::CorruptPayload(format!(
                "invalid fence multiplier {}",
                payload.multiplier
            )));
        }
        let mut fences = Vec::with_capacity(payload.fences.len());
        for f in payload.fences {
            if f.lower.is_nan() || f.upper.is_nan() || f.lower > f.upper {
                return Err(DeserializeError::CorruptPayload(format!(
                    "invalid fence [{}, {}] for `{}`",
                    f.lower, f.upper, f.column
                )));
            }
            fences.push((
                f.column,
                Fence {
                    lower: f.lower,
                    upper: f.upper,
                },
            ));
        }
        Ok(IqrClipper::from_fences(payload.multiplier, fences))
    }
}

impl TryFrom<EncoderPayload> for OneHotEncoder {
    type Error = DeserializeError;

    fn try_from(payload: EncoderPayload) -> Result<Self, Self::Error> {
        let mut categorical = Vec::with_capacity(payload.categorical.len());
        for c in payload.categorical {
            if c.categories.windows(2).any(|w| w[0] >= w[1]) {
                return Err(DeserializeError::CorruptPayload(format!(
                    "categories of `{}` are not sorted and distinct",
                    c.name
                )));
            }
            categorical.push(CategoricalColumn {
                name: c.name,
                categories: c.categories,
            });
        }
        Ok(OneHotEncoder::from_parts(payload.numeric, categorical))
    }
}

impl TryFrom<ModelPayload> for Model {
    type Error = DeserializeError;

    fn try_from(payload: ModelPayload) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::repr::ReprValidationError| DeserializeError::CorruptPayload(e.to_string());
        match payload {
            ModelPayload::Linear { weights, bias } => {
                let model = LinearClassifier::new(weights.into(), bias);
                model.validate().map_err(corrupt)?;
                Ok(Model::Linear(model))
            }
            ModelPayload::Tree(t) => {
                let tree = DecisionTree::from_arrays(TreeArrays {
                    n_features: t.n_features as usize,
                    split_features: t.split_features,
                    thresholds: t.thresholds,
                    left_children: t.left_children,
                    right_children: t.right_children,
                    is_leaf: t.is_leaf,
                    leaf_values: t.leaf_values,
                })
                .map_err(corrupt)?;
                Ok(Model::Tree(tree))
            }
        }
    }
}
