//! API request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when both artifacts loaded, otherwise "unhealthy"
    pub status: String,
    /// Whether the classifier artifact loaded
    pub model_loaded: bool,
    /// Whether the scaler artifact loaded
    pub scaler_loaded: bool,
    /// Load failure reasons for unavailable artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ArtifactErrors>,
}

/// Per-artifact load failure reasons
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArtifactErrors {
    /// Why the classifier is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Why the scaler is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<String>,
}

/// Prediction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted class label
    pub prediction: i64,
    /// Per-class probabilities, when the classifier supports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<Vec<f64>>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Loaded model description (`GET /model`)
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    /// Scaler kind, e.g. "standard"
    pub scaler_kind: String,
    /// Classifier kind, e.g. "logistic_regression"
    pub classifier_kind: String,
    /// Number of input features
    pub n_features: usize,
    /// Class labels
    pub classes: Vec<i64>,
    /// Ordered input field names, if known
    pub feature_names: Option<Vec<String>>,
    /// Whether predictions carry probabilities
    pub probabilities: bool,
}

/// One documented endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointInfo {
    /// HTTP method
    pub method: String,
    /// Route path
    pub path: String,
    /// What it does
    pub description: String,
    /// Example request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_request: Option<Value>,
    /// Example response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_response: Option<Value>,
}

/// Service documentation (`GET /`)
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Available endpoints
    pub endpoints: Vec<EndpointInfo>,
    /// Named fields accepted by `/predict`, if the loaded model defines them
    pub feature_names: Option<Vec<String>>,
}
