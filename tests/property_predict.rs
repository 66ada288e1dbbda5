//! Property-based tests for prediction invariants
//!
//! For every well-formed request the predicted label belongs to the model's
//! classes, probabilities form a distribution, and repeated requests agree.

use std::sync::Arc;

use proptest::prelude::*;
use tabserve::{
    api::AppState,
    classifier::{Classifier, LinearParams},
    error::PipelineError,
    pipeline::InferencePipeline,
    scaler::Scaler,
};

fn feature_vector(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e3..1.0e3f64, len)
}

fn multiclass_pipeline(
    n_features: usize,
    n_classes: usize,
) -> impl Strategy<Value = InferencePipeline> {
    (
        prop::collection::vec(-10.0..10.0f64, n_features),
        prop::collection::vec(0.1..10.0f64, n_features),
        prop::collection::vec(prop::collection::vec(-5.0..5.0f64, n_features), n_classes),
        prop::collection::vec(-5.0..5.0f64, n_classes),
    )
        .prop_map(move |(mean, scale, coef, intercept)| {
            let scaler = Scaler::Standard {
                mean,
                scale,
                feature_names: None,
            };
            let classifier = Classifier::LogisticRegression(LinearParams {
                classes: (0..n_classes as i64).map(|c| c * 10).collect(),
                coef,
                intercept,
                feature_names: None,
            });
            InferencePipeline::new(Arc::new(scaler), Arc::new(classifier))
        })
}

fn assert_distribution(probs: &[f64], n_classes: usize) -> Result<(), TestCaseError> {
    prop_assert_eq!(probs.len(), n_classes);
    prop_assert!(probs.iter().all(|p| *p >= 0.0 && *p <= 1.0));
    prop_assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_demo_prediction_in_classes(features in feature_vector(8)) {
        let state = AppState::demo().unwrap();
        let body = serde_json::json!({"features": features}).to_string();
        let response = state.predict_body(body.as_bytes()).unwrap();
        prop_assert!(response.prediction == 0 || response.prediction == 1);
        assert_distribution(&response.probability.unwrap(), 2)?;
    }

    #[test]
    fn prop_demo_prediction_is_idempotent(features in feature_vector(8)) {
        let state = AppState::demo().unwrap();
        let body = serde_json::json!({"features": features}).to_string();
        let first = state.predict_body(body.as_bytes()).unwrap();
        let second = state.predict_body(body.as_bytes()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_wrong_length_is_client_error(len in (1usize..20).prop_filter("not 8", |l| *l != 8)) {
        let state = AppState::demo().unwrap();
        let body = serde_json::json!({"features": vec![1.0; len]}).to_string();
        let err = state.predict_body(body.as_bytes()).unwrap_err();
        prop_assert_eq!(err.status().as_u16(), 400);
        prop_assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn prop_multiclass_probabilities(
        (pipeline, x) in multiclass_pipeline(4, 3).prop_flat_map(|p| (Just(p), feature_vector(4)))
    ) {
        let prediction = pipeline.predict(&x).unwrap();
        let classes = pipeline.classifier().classes();
        prop_assert!(classes.contains(&prediction.label));

        let probs = prediction.probabilities.unwrap();
        assert_distribution(&probs, 3)?;

        // label is the most probable class
        let best = probs
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > probs[best] { i } else { best });
        prop_assert_eq!(prediction.label, classes[best]);
    }

    #[test]
    fn prop_pipeline_dimension_check(len in 0usize..10) {
        let scaler = Scaler::MinMax { min: vec![0.0; 5], scale: vec![1.0; 5], feature_names: None };
        let classifier = Classifier::LinearSvc(LinearParams {
            classes: vec![0, 1],
            coef: vec![vec![1.0; 5]],
            intercept: vec![0.0],
            feature_names: None,
        });
        let pipeline = InferencePipeline::new(Arc::new(scaler), Arc::new(classifier));
        let result = pipeline.predict(&vec![0.5; len]);
        if len == 5 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                PipelineError::DimensionMismatch { expected: 5, actual: len }
            );
        }
    }
}
