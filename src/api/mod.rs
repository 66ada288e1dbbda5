//! HTTP API for classifier inference
//!
//! ## Endpoints
//!
//! - `GET /` - Service documentation with example payloads
//! - `GET /health` - Artifact availability (200 healthy, 503 unhealthy)
//! - `GET /model` - Loaded scaler/classifier description
//! - `POST /predict` - Scale and classify one feature vector
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabserve::api::{create_router, AppState};
//!
//! let state = AppState::demo()?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::debug;

use crate::{
    artifact::Artifacts,
    config::ServeConfig,
    error::{ArtifactError, Result, ServeError},
    input::PredictInput,
    pipeline::InferencePipeline,
};

mod types;

pub use types::{
    ArtifactErrors, EndpointInfo, ErrorResponse, HealthResponse, ModelInfoResponse,
    PredictResponse, ServiceInfo,
};

/// Application state shared across handlers
///
/// Holds the artifacts loaded at startup. They are never mutated, so handlers
/// read them without locking.
#[derive(Clone)]
pub struct AppState {
    artifacts: Arc<Artifacts>,
}

impl AppState {
    /// Wrap already-loaded artifacts
    #[must_use]
    pub fn new(artifacts: Artifacts) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }

    /// Load artifacts from the configured paths (fail-soft)
    #[must_use]
    pub fn from_config(config: &ServeConfig) -> Self {
        Self::new(Artifacts::load(&config.scaler_path, &config.model_path))
    }

    /// State backed by the bundled diabetes-screening artifacts
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled artifacts fail to parse.
    pub fn demo() -> std::result::Result<Self, ArtifactError> {
        Artifacts::demo().map(Self::new)
    }

    /// Loaded artifacts
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Whether both artifacts loaded
    pub fn is_ready(&self) -> bool {
        self.artifacts.is_ready()
    }

    fn pipeline(&self) -> Result<InferencePipeline> {
        self.artifacts.pipeline().ok_or(ServeError::Unavailable)
    }

    /// Decode a request body, scale it and classify it
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Unavailable`] if either artifact is missing,
    /// and an input or pipeline error for a bad body.
    pub fn predict_body(&self, body: &[u8]) -> Result<PredictResponse> {
        let pipeline = self.pipeline()?;
        let input = PredictInput::from_body(body)?;
        let features = input.into_vector(pipeline.feature_names())?;
        let prediction = pipeline.predict(&features)?;

        debug!(
            n_features = features.len(),
            label = prediction.label,
            "prediction served"
        );

        Ok(PredictResponse {
            prediction: prediction.label,
            probability: prediction.probabilities,
        })
    }

    /// Current health snapshot
    pub fn health(&self) -> HealthResponse {
        let artifacts = &self.artifacts;
        let errors = ArtifactErrors {
            model: artifacts.classifier.reason().map(str::to_string),
            scaler: artifacts.scaler.reason().map(str::to_string),
        };
        let has_errors = errors.model.is_some() || errors.scaler.is_some();

        HealthResponse {
            status: if artifacts.is_ready() {
                "healthy"
            } else {
                "unhealthy"
            }
            .to_string(),
            model_loaded: artifacts.classifier.is_loaded(),
            scaler_loaded: artifacts.scaler.is_loaded(),
            errors: has_errors.then_some(errors),
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/model", get(model_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
}

/// Service documentation handler
async fn root_handler(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(service_info(&state))
}

/// Build the service documentation document
pub fn service_info(state: &AppState) -> ServiceInfo {
    let feature_names = state
        .artifacts
        .pipeline()
        .and_then(|p| p.feature_names().map(<[String]>::to_vec));

    ServiceInfo {
        service: "tabserve".to_string(),
        version: crate::VERSION.to_string(),
        endpoints: vec![
            EndpointInfo {
                method: "GET".to_string(),
                path: "/health".to_string(),
                description: "Artifact availability; 503 when the scaler or model is missing"
                    .to_string(),
                example_request: None,
                example_response: Some(json!({
                    "status": "healthy",
                    "model_loaded": true,
                    "scaler_loaded": true
                })),
            },
            EndpointInfo {
                method: "GET".to_string(),
                path: "/model".to_string(),
                description: "Loaded scaler and classifier description".to_string(),
                example_request: None,
                example_response: None,
            },
            EndpointInfo {
                method: "POST".to_string(),
                path: "/predict".to_string(),
                description: "Positional feature vector".to_string(),
                example_request: Some(json!({"features": [1.0, 2.0, 3.0, 4.0]})),
                example_response: Some(json!({"prediction": 1, "probability": [0.23, 0.77]})),
            },
            EndpointInfo {
                method: "POST".to_string(),
                path: "/predict".to_string(),
                description: "Named fields matching the model's feature names".to_string(),
                example_request: Some(json!({
                    "Pregnancies": 6,
                    "Glucose": 148,
                    "BloodPressure": 72,
                    "SkinThickness": 35,
                    "Insulin": 0,
                    "BMI": 33.6,
                    "DiabetesPedigreeFunction": 0.627,
                    "Age": 50
                })),
                example_response: Some(json!({"prediction": 1, "probability": [0.28, 0.72]})),
            },
        ],
        feature_names,
    }
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(state.health()))
}

/// Model description handler
async fn model_handler(State(state): State<AppState>) -> Result<Json<ModelInfoResponse>> {
    let pipeline = state.pipeline()?;
    let classifier = pipeline.classifier();
    Ok(Json(ModelInfoResponse {
        scaler_kind: pipeline.scaler().kind().to_string(),
        classifier_kind: classifier.kind().to_string(),
        n_features: pipeline.n_features(),
        classes: classifier.classes().to_vec(),
        feature_names: pipeline.feature_names().map(<[String]>::to_vec),
        probabilities: classifier.supports_probabilities(),
    }))
}

/// Prediction handler
///
/// The body is read raw so it is parsed as JSON whatever its content type.
/// Bodies over axum's default limit (2 MB) are answered with the JSON error
/// envelope and 413.
async fn predict_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>> {
    let body = body.map_err(|rejection| ServeError::BodyRejected {
        status: rejection.status(),
        reason: rejection.body_text(),
    })?;
    state.predict_body(&body).map(Json)
}

#[cfg(test)]
mod test_helpers;
