//! Scale-then-classify inference pipeline

use std::sync::Arc;

use crate::{
    classifier::{Classifier, Prediction},
    error::PipelineError,
    scaler::Scaler,
};

/// A scaler and classifier pair ready for inference
///
/// Cheap to clone; both artifacts are shared read-only.
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    scaler: Arc<Scaler>,
    classifier: Arc<Classifier>,
}

impl InferencePipeline {
    /// Pair a scaler with a compatible classifier
    ///
    /// Compatibility is checked when the artifacts are loaded, see
    /// [`crate::artifact::check_compatible`].
    pub fn new(scaler: Arc<Scaler>, classifier: Arc<Classifier>) -> Self {
        Self { scaler, classifier }
    }

    /// The fitted scaler
    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// The fitted classifier
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Number of raw features a request must carry
    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// Ordered column names, from the scaler or else the classifier
    pub fn feature_names(&self) -> Option<&[String]> {
        self.scaler
            .feature_names()
            .or_else(|| self.classifier.feature_names())
    }

    /// Scale a raw feature vector and classify it
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DimensionMismatch`] if `raw` has the wrong
    /// length and [`PipelineError::NonFinite`] if scaling or scoring
    /// overflows.
    pub fn predict(&self, raw: &[f64]) -> Result<Prediction, PipelineError> {
        let expected = self.n_features();
        if raw.len() != expected {
            return Err(PipelineError::DimensionMismatch {
                expected,
                actual: raw.len(),
            });
        }

        let scaled = self.scaler.transform(raw);
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::NonFinite);
        }

        let scores = self.classifier.decision_function(&scaled);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PipelineError::NonFinite);
        }

        let prediction = self.classifier.predict_from_scores(&scores);
        if let Some(probs) = &prediction.probabilities {
            if probs.iter().any(|p| !p.is_finite()) {
                return Err(PipelineError::NonFinite);
            }
        }
        Ok(prediction)
    }
}
