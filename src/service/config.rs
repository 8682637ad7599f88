//! Server configuration read from the environment.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::PipelineKind;

/// Listen address variable.
pub const ADDR_VAR: &str = "DIABETO_ADDR";
/// Logistic artifact path variable.
pub const LOGISTIC_MODEL_VAR: &str = "DIABETO_LOGISTIC_MODEL";
/// Tree artifact path variable.
pub const TREE_MODEL_VAR: &str = "DIABETO_TREE_MODEL";

pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {var}={value:?} is not a socket address: {source}")]
    InvalidAddr {
        var: &'static str,
        value: String,
        #[source]
        source: AddrParseError,
    },
}

/// Where to listen and which artifacts to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub logistic_model: PathBuf,
    pub tree_model: PathBuf,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults
    /// for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = raw_addr.parse().map_err(|source| ConfigError::InvalidAddr {
            var: ADDR_VAR,
            value: raw_addr.clone(),
            source,
        })?;
        let path = |var: &str, kind: PipelineKind| {
            lookup(var)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(kind.default_artifact()))
        };
        Ok(Self {
            addr,
            logistic_model: path(LOGISTIC_MODEL_VAR, PipelineKind::Logistic),
            tree_model: path(TREE_MODEL_VAR, PipelineKind::Tree),
        })
    }

    /// Artifact path for `kind`.
    pub fn model_path(&self, kind: PipelineKind) -> &Path {
        match kind {
            PipelineKind::Logistic => &self.logistic_model,
            PipelineKind::Tree => &self.tree_model,
        }
    }
}
