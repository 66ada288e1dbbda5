//! Artifact loading
//!
//! Scaler and classifier artifacts are read from disk once at startup. Loading
//! is fail-soft: a missing or invalid file yields an
//! [`ArtifactSlot::Unavailable`] slot carrying the reason, and the service
//! keeps running so the condition can be seen through `/health`.

use std::{fs, path::Path, sync::Arc};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{
    classifier::Classifier, error::ArtifactError, pipeline::InferencePipeline, scaler::Scaler,
};

const DEMO_SCALER: &str = include_str!("../artifacts/standard_scaler.json");
const DEMO_MODEL: &str = include_str!("../artifacts/logistic_regression_model.json");

/// A loaded-or-not artifact
#[derive(Debug, Clone)]
pub enum ArtifactSlot<T> {
    /// Artifact loaded and validated
    Loaded(Arc<T>),
    /// Artifact could not be loaded
    Unavailable {
        /// Why loading failed
        reason: String,
    },
}

impl<T> ArtifactSlot<T> {
    /// Wrap a load outcome
    pub fn from_result(result: Result<T, ArtifactError>) -> Self {
        match result {
            Ok(value) => Self::Loaded(Arc::new(value)),
            Err(e) => Self::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    /// Whether the artifact is available
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Shared handle to the artifact, if loaded
    pub fn get(&self) -> Option<&Arc<T>> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    /// Failure reason, if not loaded
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

/// Read and deserialize a JSON artifact
///
/// # Errors
///
/// Returns [`ArtifactError::Io`] if the file cannot be read and
/// [`ArtifactError::Parse`] if it is not the expected JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a scaler artifact
///
/// # Errors
///
/// Returns an [`ArtifactError`] if the file is unreadable, malformed, or
/// describes an inconsistent scaler.
pub fn load_scaler(path: &Path) -> Result<Scaler, ArtifactError> {
    let scaler: Scaler = read_json(path)?;
    scaler.validate()?;
    Ok(scaler)
}

/// Load and validate a classifier artifact
///
/// # Errors
///
/// Returns an [`ArtifactError`] if the file is unreadable, malformed, or
/// describes an inconsistent classifier.
pub fn load_classifier(path: &Path) -> Result<Classifier, ArtifactError> {
    let classifier: Classifier = read_json(path)?;
    classifier.validate()?;
    Ok(classifier)
}

/// Check that a classifier was fitted on the scaler's feature layout
///
/// # Errors
///
/// Returns [`ArtifactError::Incompatible`] when dimensionality differs, or
/// when both artifacts record column names and those names differ.
pub fn check_compatible(scaler: &Scaler, classifier: &Classifier) -> Result<(), ArtifactError> {
    if scaler.n_features() != classifier.n_features() {
        return Err(ArtifactError::Incompatible(format!(
            "scaler expects {} features, classifier expects {}",
            scaler.n_features(),
            classifier.n_features()
        )));
    }
    if let (Some(a), Some(b)) = (scaler.feature_names(), classifier.feature_names()) {
        if a != b {
            return Err(ArtifactError::Incompatible(
                "feature names differ between scaler and classifier".to_string(),
            ));
        }
    }
    Ok(())
}

/// The pair of artifacts held for the process lifetime
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Fitted scaler
    pub scaler: ArtifactSlot<Scaler>,
    /// Fitted classifier
    pub classifier: ArtifactSlot<Classifier>,
}

impl Artifacts {
    /// Load both artifacts from disk, never failing
    pub fn load(scaler_path: &Path, model_path: &Path) -> Self {
        let artifacts = Self::from_results(load_scaler(scaler_path), load_classifier(model_path));

        match artifacts.scaler.reason() {
            None => info!(path = %scaler_path.display(), "scaler loaded"),
            Some(reason) => warn!(path = %scaler_path.display(), %reason, "scaler unavailable"),
        }
        match artifacts.classifier.reason() {
            None => info!(path = %model_path.display(), "classifier loaded"),
            Some(reason) => warn!(path = %model_path.display(), %reason, "classifier unavailable"),
        }
        artifacts
    }

    /// Build from individual load outcomes
    ///
    /// A classifier that is incompatible with a loaded scaler is treated as
    /// not loaded.
    pub fn from_results(
        scaler: Result<Scaler, ArtifactError>,
        classifier: Result<Classifier, ArtifactError>,
    ) -> Self {
        let classifier = match (&scaler, classifier) {
            (Ok(s), Ok(c)) => check_compatible(s, &c).map(|()| c),
            (_, other) => other,
        };
        Self {
            scaler: ArtifactSlot::from_result(scaler),
            classifier: ArtifactSlot::from_result(classifier),
        }
    }

    /// Both artifacts already in memory
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] if either artifact is invalid or they are
    /// incompatible.
    pub fn from_loaded(scaler: Scaler, classifier: Classifier) -> Result<Self, ArtifactError> {
        scaler.validate()?;
        classifier.validate()?;
        check_compatible(&scaler, &classifier)?;
        Ok(Self {
            scaler: ArtifactSlot::Loaded(Arc::new(scaler)),
            classifier: ArtifactSlot::Loaded(Arc::new(classifier)),
        })
    }

    /// Bundled diabetes-screening artifacts (8 named features, binary)
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] only if the bundled files are corrupt.
    pub fn demo() -> Result<Self, ArtifactError> {
        let parse = |name: &str, source| ArtifactError::Parse {
            path: name.into(),
            source,
        };
        let scaler: Scaler =
            serde_json::from_str(DEMO_SCALER).map_err(|e| parse("standard_scaler.json", e))?;
        let classifier: Classifier = serde_json::from_str(DEMO_MODEL)
            .map_err(|e| parse("logistic_regression_model.json", e))?;
        Self::from_loaded(scaler, classifier)
    }

    /// Neither artifact loaded
    pub fn unavailable(reason: &str) -> Self {
        Self {
            scaler: ArtifactSlot::Unavailable {
                reason: reason.to_string(),
            },
            classifier: ArtifactSlot::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    /// Whether both artifacts loaded
    pub fn is_ready(&self) -> bool {
        self.scaler.is_loaded() && self.classifier.is_loaded()
    }

    /// The scale-then-classify pipeline, if both artifacts loaded
    pub fn pipeline(&self) -> Option<InferencePipeline> {
        let scaler = self.scaler.get()?;
        let classifier = self.classifier.get()?;
        Some(InferencePipeline::new(Arc::clone(scaler), Arc::clone(classifier)))
    }
}
