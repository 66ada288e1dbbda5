//! Fitted linear classifiers
//!
//! Both supported kinds share the same parameter layout: a class list, a
//! coefficient matrix and an intercept vector. With two classes the matrix
//! has a single row (one binary decision function); with three or more it
//! has one row per class.
//!
//! ```json
//! {
//!   "kind": "logistic_regression",
//!   "classes": [0, 1],
//!   "coef": [[0.41, 1.12]],
//!   "intercept": [-0.87]
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// Linear model parameters shared by all classifier kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    /// Class labels, in the order the model scores them
    pub classes: Vec<i64>,
    /// Coefficient rows (1 for binary, one per class otherwise)
    pub coef: Vec<Vec<f64>>,
    /// Intercept per coefficient row
    pub intercept: Vec<f64>,
    /// Column names the classifier was fitted on, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

/// A fitted classifier artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Logistic regression (supports class probabilities)
    LogisticRegression(LinearParams),
    /// Linear support vector classifier (labels only)
    LinearSvc(LinearParams),
}

/// Output of a single classification
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted class label
    pub label: i64,
    /// Per-class probabilities in `classes` order, when the model supports them
    pub probabilities: Option<Vec<f64>>,
}

impl Classifier {
    /// Short name of the classifier kind, as written in the artifact
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::LinearSvc(_) => "linear_svc",
        }
    }

    fn params(&self) -> &LinearParams {
        match self {
            Self::LogisticRegression(p) | Self::LinearSvc(p) => p,
        }
    }

    /// Class labels known to the model
    pub fn classes(&self) -> &[i64] {
        &self.params().classes
    }

    /// Number of input features
    pub fn n_features(&self) -> usize {
        self.params().coef.first().map_or(0, Vec::len)
    }

    /// Fitted column names, if the artifact recorded them
    pub fn feature_names(&self) -> Option<&[String]> {
        self.params().feature_names.as_deref()
    }

    /// Whether [`Classifier::predict`] returns probabilities
    pub fn supports_probabilities(&self) -> bool {
        matches!(self, Self::LogisticRegression(_))
    }

    /// Check internal consistency of the fitted parameters
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] when the class list, coefficient
    /// matrix and intercepts do not describe a usable linear model.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let p = self.params();
        let n_classes = p.classes.len();

        if n_classes < 2 {
            return Err(invalid(format!("need at least 2 classes, got {n_classes}")));
        }
        let distinct: HashSet<i64> = p.classes.iter().copied().collect();
        if distinct.len() != n_classes {
            return Err(invalid("class labels must be distinct".to_string()));
        }

        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if p.coef.len() != expected_rows {
            return Err(invalid(format!(
                "expected {expected_rows} coefficient rows for {n_classes} classes, got {}",
                p.coef.len()
            )));
        }
        if p.intercept.len() != expected_rows {
            return Err(invalid(format!(
                "expected {expected_rows} intercepts, got {}",
                p.intercept.len()
            )));
        }

        let width = self.n_features();
        if width == 0 {
            return Err(invalid("coefficient rows must not be empty".to_string()));
        }
        if p.coef.iter().any(|row| row.len() != width) {
            return Err(invalid("coefficient rows differ in length".to_string()));
        }
        if p.coef.iter().flatten().chain(p.intercept.iter()).any(|v| !v.is_finite()) {
            return Err(invalid("parameters must be finite".to_string()));
        }
        if let Some(names) = &p.feature_names {
            if names.len() != width {
                return Err(invalid(format!(
                    "{} feature names for {width} features",
                    names.len()
                )));
            }
        }
        Ok(())
    }

    /// Raw decision scores, one per coefficient row
    pub fn decision_function(&self, x: &[f64]) -> Vec<f64> {
        let p = self.params();
        p.coef
            .iter()
            .zip(p.intercept.iter())
            .map(|(row, b)| row.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect()
    }

    /// Classify a scaled feature vector
    ///
    /// The caller guarantees `x.len() == self.n_features()`.
    pub fn predict(&self, x: &[f64]) -> Prediction {
        self.predict_from_scores(&self.decision_function(x))
    }

    /// Classify from precomputed decision scores
    ///
    /// `scores` must come from [`Classifier::decision_function`].
    pub fn predict_from_scores(&self, scores: &[f64]) -> Prediction {
        let classes = self.classes();

        if let &[d] = scores {
            let label = if d > 0.0 { classes[1] } else { classes[0] };
            let probabilities = self.supports_probabilities().then(|| {
                let p1 = sigmoid(d);
                vec![1.0 - p1, p1]
            });
            return Prediction {
                label,
                probabilities,
            };
        }

        let best = argmax(scores);
        Prediction {
            label: classes[best],
            probabilities: self.supports_probabilities().then(|| softmax(scores)),
        }
    }
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        artifact: "classifier",
        reason,
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max_val = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max_val).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest score; first index wins ties
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, s) in scores.iter().enumerate().skip(1) {
        if *s > scores[best] {
            best = i;
        }
    }
    best
}
