//! Server configuration
//!
//! Values are layered: built-in defaults, then `TABSERVE_*` environment
//! variables, then command-line flags (applied by the binary).

use std::{net::SocketAddr, path::PathBuf};

use crate::error::{Result, ServeError};

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port
pub const DEFAULT_PORT: u16 = 5000;
/// Default classifier artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "logistic_regression_model.json";
/// Default scaler artifact, relative to the working directory
pub const DEFAULT_SCALER_PATH: &str = "standard_scaler.json";

/// Environment variable overriding [`ServeConfig::host`]
pub const ENV_HOST: &str = "TABSERVE_HOST";
/// Environment variable overriding [`ServeConfig::port`]
pub const ENV_PORT: &str = "TABSERVE_PORT";
/// Environment variable overriding [`ServeConfig::model_path`]
pub const ENV_MODEL_PATH: &str = "TABSERVE_MODEL_PATH";
/// Environment variable overriding [`ServeConfig::scaler_path`]
pub const ENV_SCALER_PATH: &str = "TABSERVE_SCALER_PATH";

/// Configuration for the inference server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Path to the classifier artifact
    pub model_path: PathBuf,
    /// Path to the scaler artifact
    pub scaler_path: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
        }
    }
}

impl ServeConfig {
    /// Defaults with environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a variable lookup
    ///
    /// Empty values are ignored, as is a port that does not parse.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_HOST) {
            self.host = v;
        }
        if let Some(v) = non_empty(ENV_PORT) {
            if let Ok(parsed) = v.trim().parse::<u16>() {
                self.port = parsed;
            }
        }
        if let Some(v) = non_empty(ENV_MODEL_PATH) {
            self.model_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_SCALER_PATH) {
            self.scaler_path = PathBuf::from(v);
        }
    }

    /// Set the bind host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the classifier artifact path
    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Set the scaler artifact path
    #[must_use]
    pub fn with_scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = path.into();
        self
    }

    /// Socket address to bind
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Server`] if host and port do not form a valid
    /// socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServeError::Server(format!("Invalid address: {e}")))
    }
}
