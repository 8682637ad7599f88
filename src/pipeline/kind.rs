//! Pipeline selector and prediction labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two pipelines serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// IQR clipping, one-hot encoding, logistic regression.
    Logistic,
    /// IQR clipping, one-hot encoding, decision tree.
    Tree,
}

impl PipelineKind {
    pub const ALL: [Self; 2] = [Self::Logistic, Self::Tree];

    /// Lowercase name, also the last route segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logistic => "logistic",
            Self::Tree => "tree",
        }
    }

    /// HTTP route served by this pipeline.
    pub fn route(self) -> &'static str {
        match self {
            Self::Logistic => "/diabeto/logistic",
            Self::Tree => "/diabeto/tree",
        }
    }

    /// File name the artifact is saved under by default.
    pub fn default_artifact(self) -> &'static str {
        match self {
            Self::Logistic => "diabeto_LR.dbto",
            Self::Tree => "diabeto_DC.dbto",
        }
    }

    /// Identifier stored in the artifact header.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Logistic => 0,
            Self::Tree => 1,
        }
    }

    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Logistic),
            1 => Some(Self::Tree),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "Smoker")]
    Smoker,
    #[serde(rename = "Non-Smoker")]
    NonSmoker,
}

impl Prediction {
    /// Class 1 is `Smoker`, anything else `NonSmoker`.
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Self::Smoker
        } else {
            Self::NonSmoker
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Smoker => "Smoker",
            Self::NonSmoker => "Non-Smoker",
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
