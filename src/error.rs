//! Crate-level error type.
//!
//! Each subsystem owns its own error enum; [`Error`] aggregates them so the
//! boundary layer can treat every core failure as one class of bad request.

use thiserror::Error;

use crate::data::FrameError;
use crate::features::ValidationError;
use crate::io::{DeserializeError, SerializeError};
use crate::pipeline::InferenceError;
use crate::preprocess::{ClipError, EncodeError};
use crate::training::TrainError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong configuration, e.g. a named column is missing at fit time.
    Configuration,
    /// A fitted stage was used before `fit`.
    State,
    /// Malformed or incomplete caller input.
    Validation,
    /// The fitted model cannot consume the produced features.
    Inference,
    /// Artifact could not be read or written.
    Persist,
}

/// Any error produced by the diabeto core.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Clip(#[from] ClipError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error(transparent)]
    Deserialize(#[from] DeserializeError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl Error {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Clip(e) => e.kind(),
            Self::Encode(e) => e.kind(),
            Self::Frame(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::Inference(_) => ErrorKind::Inference,
            Self::Train(TrainError::InvalidParams(_)) => ErrorKind::Configuration,
            Self::Train(_) => ErrorKind::Validation,
            Self::Deserialize(_) | Self::Serialize(_) => ErrorKind::Persist,
        }
    }
}

/// Result alias using the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
