//! Error types for tabserve
//!
//! Each concern has its own error enum; [`ServeError`] is the umbrella type
//! that request handlers return and that maps onto HTTP responses.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ErrorResponse;

/// Result type alias for serving operations
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors raised while loading or validating a fitted artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file could not be read
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Artifact file is not valid JSON for the expected artifact type
    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Artifact parsed but its parameters are inconsistent
    #[error("Invalid {artifact} artifact: {reason}")]
    Invalid {
        /// Artifact kind ("scaler" or "classifier")
        artifact: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Scaler and classifier were fitted on different feature layouts
    #[error("Classifier is incompatible with scaler: {0}")]
    Incompatible(String),
}

/// Errors raised while decoding a prediction request body
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// Body is not JSON at all
    #[error("Request body is not valid JSON: {0}")]
    MalformedJson(String),

    /// Body is JSON but not an object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// `features` is present but not an array
    #[error("'features' must be an array of numbers")]
    FeaturesNotArray,

    /// `features` is an empty array
    #[error("'features' must not be empty")]
    EmptyFeatures,

    /// An element of `features` is not a finite number
    #[error("'features[{index}]' must be a finite number")]
    InvalidElement {
        /// Position of the offending element
        index: usize,
    },

    /// A required named field is absent
    #[error("Missing required field '{0}'")]
    MissingField(String),

    /// A named field is present but not a finite number
    #[error("Field '{0}' must be a finite number")]
    InvalidField(String),

    /// Named-field input was sent but the loaded artifacts define no field names
    #[error("Named-field input is not supported by the loaded model; send {{\"features\": [...]}}")]
    NamedInputUnsupported,
}

/// Errors raised by the scale-then-classify pipeline
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// Feature vector length differs from what the artifacts were fitted on
    #[error("Invalid input dimension: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Fitted dimensionality
        expected: usize,
        /// Dimensionality of the request
        actual: usize,
    },

    /// The numeric pipeline produced a non-finite value
    #[error("Prediction produced a non-finite value")]
    NonFinite,
}

/// Umbrella error returned by request handlers
#[derive(Debug, Error)]
pub enum ServeError {
    /// Scaler or classifier is not loaded
    #[error("Model or scaler not loaded")]
    Unavailable,

    /// Request body could not be decoded
    #[error(transparent)]
    Input(#[from] InputError),

    /// Prediction failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Request body could not be read (too large, aborted stream)
    #[error("Request body could not be read: {reason}")]
    BodyRejected {
        /// Status reported by the body extractor
        status: StatusCode,
        /// Extractor message
        reason: String,
    },

    /// Artifact loading failed (CLI paths only)
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Server could not bind or run
    #[error("Server error: {0}")]
    Server(String),
}

impl ServeError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable | Self::Artifact(_) => "ARTIFACTS_UNAVAILABLE",
            Self::BodyRejected { .. }
            | Self::Input(InputError::MalformedJson(_) | InputError::NotAnObject) => {
                "MALFORMED_BODY"
            },
            Self::Input(_) => "INVALID_INPUT",
            Self::Pipeline(PipelineError::DimensionMismatch { .. }) => "DIMENSION_MISMATCH",
            Self::Pipeline(PipelineError::NonFinite) => "INVALID_INPUT",
            Self::Server(_) => "INTERNAL",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unavailable | Self::Artifact(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BodyRejected { status, .. } => *status,
            Self::Input(_) | Self::Pipeline(_) => StatusCode::BAD_REQUEST,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: Some(self.code().to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}
