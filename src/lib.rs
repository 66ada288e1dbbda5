//! # Tabserve
//!
//! Minimal HTTP inference server for fitted tabular classifiers.
//!
//! A fitted scaler and a fitted linear classifier are loaded once at startup
//! from JSON artifacts. Each prediction request is decoded, validated against
//! the model's feature layout, standardized by the scaler and classified.
//!
//! ## Example
//!
//! ```rust
//! use tabserve::api::AppState;
//!
//! let state = AppState::demo().unwrap();
//! let body = br#"{"features": [6, 148, 72, 35, 0, 33.6, 0.627, 50]}"#;
//! let response = state.predict_body(body).unwrap();
//! assert_eq!(response.prediction, 1);
//! ```
//!
//! ## Startup
//!
//! Loading is fail-soft. A missing or invalid artifact leaves the server
//! running but unhealthy: `/health` reports which artifact is unavailable and
//! `/predict` answers 503 until the process is restarted with valid files.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::float_cmp)] // Allow float comparisons in tests
#![allow(clippy::cast_precision_loss)]

pub mod api;
/// Artifact loading with fail-soft availability slots
pub mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
/// Request body decoding (positional vector or named fields)
pub mod input;
pub mod pipeline;
pub mod scaler;

// Re-exports for convenience
pub use error::{Result, ServeError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
