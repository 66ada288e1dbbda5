//! Fitted feature scalers
//!
//! A scaler is loaded once from its JSON artifact and applied read-only to
//! every request. Two kinds are supported:
//!
//! - `standard`: `z = (x - mean) / scale`
//! - `min_max`: `z = x * scale + min`
//!
//! ```json
//! {"kind": "standard", "mean": [3.8, 120.9], "scale": [3.4, 31.9]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// A fitted scaler artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// Standardization to zero mean and unit variance
    Standard {
        /// Per-feature mean learned at fit time
        mean: Vec<f64>,
        /// Per-feature standard deviation (zeros already replaced by 1.0)
        scale: Vec<f64>,
        /// Column names the scaler was fitted on, in order
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
    /// Rescaling into a fixed range
    MinMax {
        /// Per-feature additive offset
        min: Vec<f64>,
        /// Per-feature multiplicative factor
        scale: Vec<f64>,
        /// Column names the scaler was fitted on, in order
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
}

impl Scaler {
    /// Short name of the scaler kind, as written in the artifact
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
        }
    }

    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
        }
    }

    /// Fitted column names, if the artifact recorded them
    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => {
                feature_names.as_deref()
            },
        }
    }

    /// Check internal consistency of the fitted parameters
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if the parameter vectors are empty,
    /// disagree in length, contain non-finite values, or (for `standard`)
    /// contain a zero scale.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let (offset, scale, offset_name) = match self {
            Self::Standard { mean, scale, .. } => (mean, scale, "mean"),
            Self::MinMax { min, scale, .. } => (min, scale, "min"),
        };

        if offset.is_empty() {
            return Err(invalid(format!("'{offset_name}' must not be empty")));
        }
        if offset.len() != scale.len() {
            return Err(invalid(format!(
                "'{offset_name}' has {} entries but 'scale' has {}",
                offset.len(),
                scale.len()
            )));
        }
        if offset.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(invalid("parameters must be finite".to_string()));
        }
        if matches!(self, Self::Standard { .. }) && scale.iter().any(|s| *s == 0.0) {
            return Err(invalid("'scale' must not contain zeros".to_string()));
        }
        if let Some(names) = self.feature_names() {
            if names.len() != offset.len() {
                return Err(invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    offset.len()
                )));
            }
        }
        Ok(())
    }

    /// Apply the fitted transform to a raw feature vector
    ///
    /// The caller guarantees `raw.len() == self.n_features()`.
    pub fn transform(&self, raw: &[f64]) -> Vec<f64> {
        match self {
            Self::Standard { mean, scale, .. } => raw
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            Self::MinMax { min, scale, .. } => raw
                .iter()
                .zip(min.iter().zip(scale.iter()))
                .map(|(x, (lo, s))| x * s + lo)
                .collect(),
        }
    }
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        artifact: "scaler",
        reason,
    }
}
