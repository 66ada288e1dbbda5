//! Prediction request decoding
//!
//! Two body shapes are accepted:
//!
//! - `{"features": [v1, v2, ...]}` - a positional feature vector
//! - `{"Glucose": 148, "BMI": 33.6, ...}` - named fields, resolved against
//!   the column names recorded in the loaded artifacts
//!
//! Bodies are decoded into [`PredictInput`] and validated before any numeric
//! work happens, so malformed requests never reach the scaler or classifier.

use serde_json::{Map, Value};

use crate::error::InputError;

/// Key that selects the positional vector shape
pub const FEATURES_KEY: &str = "features";

/// A decoded prediction request
#[derive(Debug, Clone, PartialEq)]
pub enum PredictInput {
    /// Positional feature vector
    Vector(Vec<f64>),
    /// Named fields, kept as the raw JSON object until a schema resolves them
    Named(Map<String, Value>),
}

impl PredictInput {
    /// Decode a raw request body
    ///
    /// The body is parsed as JSON regardless of its declared content type.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] when the body is not a JSON object, or when
    /// `features` is present but is not a non-empty array of finite numbers.
    pub fn from_body(body: &[u8]) -> Result<Self, InputError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| InputError::MalformedJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value
    ///
    /// # Errors
    ///
    /// See [`PredictInput::from_body`].
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        let Value::Object(mut object) = value else {
            return Err(InputError::NotAnObject);
        };

        match object.remove(FEATURES_KEY) {
            Some(Value::Array(items)) => {
                if items.is_empty() {
                    return Err(InputError::EmptyFeatures);
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        finite(item).ok_or(InputError::InvalidElement { index })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Vector)
            },
            Some(_) => Err(InputError::FeaturesNotArray),
            None => Ok(Self::Named(object)),
        }
    }

    /// Resolve into an ordered raw feature vector
    ///
    /// `schema` is the ordered list of fitted column names, if known. Named
    /// input requires a schema; keys outside it are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NamedInputUnsupported`] for named input without a
    /// schema, [`InputError::MissingField`] for an absent column, and
    /// [`InputError::InvalidField`] for a non-numeric value.
    pub fn into_vector(self, schema: Option<&[String]>) -> Result<Vec<f64>, InputError> {
        match self {
            Self::Vector(values) => Ok(values),
            Self::Named(object) => {
                let names = schema.ok_or(InputError::NamedInputUnsupported)?;
                names
                    .iter()
                    .map(|name| {
                        let value = object
                            .get(name)
                            .ok_or_else(|| InputError::MissingField(name.clone()))?;
                        finite(value).ok_or_else(|| InputError::InvalidField(name.clone()))
                    })
                    .collect()
            },
        }
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema() -> Vec<String> {
        vec!["Glucose".to_string(), "BMI".to_string()]
    }

    #[test]
    fn test_vector_shape() {
        let input = PredictInput::from_body(br#"{"features": [1.0, 2, -3.5]}"#).expect("test");
        assert_eq!(input, PredictInput::Vector(vec![1.0, 2.0, -3.5]));
    }

    #[test]
    fn test_named_shape() {
        let input = PredictInput::from_body(br#"{"Glucose": 148, "BMI": 33.6}"#).expect("test");
        assert!(matches!(input, PredictInput::Named(_)));
        let v = input.into_vector(Some(&schema())).expect("test");
        assert_eq!(v, vec![148.0, 33.6]);
    }

    #[test]
    fn test_named_order_follows_schema() {
        let input = PredictInput::from_value(json!({"BMI": 20.0, "Glucose": 90.0})).expect("test");
        assert_eq!(input.into_vector(Some(&schema())).expect("test"), vec![90.0, 20.0]);
    }

    #[test]
    fn test_named_extra_keys_ignored() {
        let input =
            PredictInput::from_value(json!({"Glucose": 1, "BMI": 2, "Name": "x"})).expect("test");
        assert_eq!(input.into_vector(Some(&schema())).expect("test"), vec![1.0, 2.0]);
    }

    #[test]
    fn test_named_missing_field() {
        let input = PredictInput::from_value(json!({"Glucose": 1})).expect("test");
        assert_eq!(
            input.into_vector(Some(&schema())),
            Err(InputError::MissingField("BMI".to_string()))
        );
    }

    #[test]
    fn test_named_non_numeric_field() {
        let input = PredictInput::from_value(json!({"Glucose": "high", "BMI": 2})).expect("test");
        assert_eq!(
            input.into_vector(Some(&schema())),
            Err(InputError::InvalidField("Glucose".to_string()))
        );
    }

    #[test]
    fn test_named_without_schema() {
        let input = PredictInput::from_value(json!({"Glucose": 1})).expect("test");
        assert_eq!(input.into_vector(None), Err(InputError::NamedInputUnsupported));
    }

    #[test]
    fn test_vector_ignores_schema() {
        let input = PredictInput::Vector(vec![1.0, 2.0, 3.0]);
        assert_eq!(input.into_vector(Some(&schema())).expect("test").len(), 3);
    }

    #[test]
    fn test_malformed_json() {
        let err = PredictInput::from_body(b"{not json").expect_err("test");
        assert!(matches!(err, InputError::MalformedJson(_)));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            PredictInput::from_body(b"[1, 2, 3]"),
            Err(InputError::NotAnObject)
        );
    }

    #[test]
    fn test_features_not_array() {
        assert_eq!(
            PredictInput::from_value(json!({"features": 3})),
            Err(InputError::FeaturesNotArray)
        );
    }

    #[test]
    fn test_features_empty() {
        assert_eq!(
            PredictInput::from_value(json!({"features": []})),
            Err(InputError::EmptyFeatures)
        );
    }

    #[test]
    fn test_features_bad_element() {
        assert_eq!(
            PredictInput::from_value(json!({"features": [1.0, null, 2.0]})),
            Err(InputError::InvalidElement { index: 1 })
        );
    }

    #[test]
    fn test_empty_object_is_named() {
        let input = PredictInput::from_body(b"{}").expect("test");
        assert_eq!(
            input.into_vector(Some(&schema())),
            Err(InputError::MissingField("Glucose".to_string()))
        );
    }
}
