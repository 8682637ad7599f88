//! HTTP boundary.
//!
//! ```text
//! POST /diabeto/logistic   record JSON -> {"prediction": "Smoker" | "Non-Smoker"}
//! POST /diabeto/tree       record JSON -> {"prediction": "Smoker" | "Non-Smoker"}
//! GET  /health             {"status": "ok"}
//! ```
//!
//! Every failure is answered with `400` and `{"detail": <message>}`.

mod config;
mod error;
mod handlers;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::io::DeserializeError;
use crate::pipeline::{Pipeline, PipelineKind};

pub use config::{ConfigError, ServerConfig, ADDR_VAR, DEFAULT_ADDR, LOGISTIC_MODEL_VAR, TREE_MODEL_VAR};
pub use error::ApiError;
pub use handlers::{HealthResponse, PredictResponse};

/// Read-only state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    logistic: Arc<Pipeline>,
    tree: Arc<Pipeline>,
}

impl AppState {
    /// Wrap two fitted pipelines, checking that each is of the right kind.
    pub fn new(logistic: Pipeline, tree: Pipeline) -> Result<Self, DeserializeError> {
        for (expected, pipeline) in [(PipelineKind::Logistic, &logistic), (PipelineKind::Tree, &tree)] {
            if pipeline.kind() != expected {
                return Err(DeserializeError::KindMismatch {
                    expected,
                    actual: pipeline.kind(),
                });
            }
        }
        Ok(Self {
            logistic: Arc::new(logistic),
            tree: Arc::new(tree),
        })
    }

    /// Load both artifacts named by `config`.
    pub fn load(config: &ServerConfig) -> Result<Self, DeserializeError> {
        let logistic = Pipeline::load_expecting(config.model_path(PipelineKind::Logistic), PipelineKind::Logistic)?;
        let tree = Pipeline::load_expecting(config.model_path(PipelineKind::Tree), PipelineKind::Tree)?;
        Self::new(logistic, tree)
    }

    pub fn pipeline(&self, kind: PipelineKind) -> &Pipeline {
        match kind {
            PipelineKind::Logistic => &self.logistic,
            PipelineKind::Tree => &self.tree,
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let mut router = Router::new().route("/health", get(handlers::health));
    for kind in PipelineKind::ALL {
        router = router.route(
            kind.route(),
            post(move |state: State<AppState>, body: Bytes| handlers::predict(state, kind, body)),
        );
    }
    router.layer(TraceLayer::new_for_http()).layer(cors).with_state(state)
}
