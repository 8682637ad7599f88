//! Serialized form of a pipeline.
//!
//! Payload types mirror the runtime types field by field but stay plain
//! data, so the runtime types can change without breaking stored files.
//! Every enum is externally tagged so that Postcard can encode it.

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineKind;

/// Versioned top-level payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    V1(PipelineV1),
}

/// Version 1 of the pipeline payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineV1 {
    pub kind: PipelineKind,
    pub feature_names: Vec<String>,
    pub clipper: ClipperPayload,
    pub encoder: EncoderPayload,
    pub model: ModelPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipperPayload {
    pub multiplier: f64,
    pub fences: Vec<FencePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FencePayload {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderPayload {
    pub numeric: Vec<String>,
    pub categorical: Vec<CategoricalPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalPayload {
    pub name: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelPayload {
    Linear { weights: Vec<f64>, bias: f64 },
    Tree(TreePayload),
}

/// Node arrays of a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePayload {
    pub n_features: u32,
    pub split_features: Vec<u32>,
    pub thresholds: Vec<f64>,
    pub left_children: Vec<u32>,
    pub right_children: Vec<u32>,
    pub is_leaf: Vec<bool>,
    pub leaf_values: Vec<f64>,
}

/// Current JSON mirror format version.
pub const JSON_FORMAT_VERSION: u32 = 1;

/// JSON mirror of a pipeline artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub format_version: u32,
    pub kind: PipelineKind,
    pub pipeline: PipelineV1,
}
