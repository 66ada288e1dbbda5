//! Tabserve CLI - classifier inference server
//!
//! # Commands
//!
//! - `serve` - Load artifacts and start the HTTP server
//! - `predict` - One-shot prediction from a JSON body
//! - `info` - Show version info

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tabserve::{
    api::{create_router, AppState},
    artifact::{load_classifier, load_scaler, Artifacts},
    config::ServeConfig,
    error::{Result, ServeError},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset or unparsable
const DEFAULT_LOG_FILTER: &str = "info";

/// Tabserve - scaler + classifier inference over HTTP
#[derive(Parser)]
#[command(name = "tabserve")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the inference server
    ///
    /// Examples:
    ///   tabserve serve
    ///   tabserve serve --model model.json --scaler scaler.json --port 8080
    ///   tabserve serve --demo
    Serve {
        /// Host to bind to (default 127.0.0.1, env TABSERVE_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default 5000, env TABSERVE_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Classifier artifact (env TABSERVE_MODEL_PATH)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Scaler artifact (env TABSERVE_SCALER_PATH)
        #[arg(short, long)]
        scaler: Option<PathBuf>,

        /// Serve the bundled diabetes-screening artifacts
        #[arg(long)]
        demo: bool,
    },
    /// Predict once from a JSON body and print the result
    ///
    /// Examples:
    ///   tabserve predict '{"features": [6, 148, 72, 35, 0, 33.6, 0.627, 50]}'
    Predict {
        /// Request body, same shape as POST /predict
        #[arg(value_name = "JSON")]
        body: String,

        /// Classifier artifact
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Scaler artifact
        #[arg(short, long)]
        scaler: Option<PathBuf>,

        /// Use the bundled diabetes-screening artifacts
        #[arg(long)]
        demo: bool,
    },
    /// Show version information
    Info,
}

fn resolve_config(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
    scaler: Option<PathBuf>,
) -> ServeConfig {
    let mut config = ServeConfig::from_env();
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(model) = model {
        config = config.with_model_path(model);
    }
    if let Some(scaler) = scaler {
        config = config.with_scaler_path(scaler);
    }
    config
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            model,
            scaler,
            demo,
        } => {
            let config = resolve_config(host, port, model, scaler);
            let state = if demo {
                AppState::demo()?
            } else {
                AppState::from_config(&config)
            };
            serve(&config, state).await?;
        },
        Commands::Predict {
            body,
            model,
            scaler,
            demo,
        } => {
            let state = if demo {
                AppState::demo()?
            } else {
                let config = resolve_config(None, None, model, scaler);
                // Offline mode fails hard on a missing artifact
                let artifacts = Artifacts::from_loaded(
                    load_scaler(&config.scaler_path)?,
                    load_classifier(&config.model_path)?,
                )?;
                AppState::new(artifacts)
            };
            let response = state.predict_body(body.as_bytes())?;
            let json = serde_json::to_string(&response)
                .map_err(|e| ServeError::Server(format!("Failed to encode response: {e}")))?;
            println!("{json}");
        },
        Commands::Info => {
            println!("tabserve {}", tabserve::VERSION);
        },
    }

    Ok(())
}

async fn serve(config: &ServeConfig, state: AppState) -> Result<()> {
    if state.is_ready() {
        info!("artifacts ready");
    } else {
        warn!("starting without a usable model; /predict will answer 503");
    }

    let app = create_router(state);
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServeError::Server(e.to_string()))?;

    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServeError::Server(e.to_string()))?;

    info!("server stopped");
    Ok(())
}

async fn bind(config: &ServeConfig) -> Result<TcpListener> {
    let addr = config.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServeError::Server(format!("Failed to bind {addr}: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_serve_defaults() {
        let cli = Cli::parse_from(["tabserve", "serve"]);
        match cli.command {
            Commands::Serve {
                host,
                port,
                model,
                demo,
                ..
            } => {
                assert!(host.is_none());
                assert!(port.is_none());
                assert!(model.is_none());
                assert!(!demo);
            },
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parsing_serve_flags() {
        let cli = Cli::parse_from([
            "tabserve", "serve", "-H", "0.0.0.0", "-p", "8080", "--model", "m.json", "--scaler",
            "s.json",
        ]);
        match cli.command {
            Commands::Serve {
                host,
                port,
                model,
                scaler,
                ..
            } => {
                let config = resolve_config(host, port, model, scaler);
                assert_eq!(config.host, "0.0.0.0");
                assert_eq!(config.port, 8080);
                assert_eq!(config.model_path, PathBuf::from("m.json"));
                assert_eq!(config.scaler_path, PathBuf::from("s.json"));
            },
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parsing_predict() {
        let cli = Cli::parse_from(["tabserve", "predict", "--demo", r#"{"features": [1]}"#]);
        match cli.command {
            Commands::Predict { body, demo, .. } => {
                assert!(demo);
                assert!(body.contains("features"));
            },
            _ => panic!("Expected Predict command"),
        }
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
    }

    #[test]
    fn test_log_filter_honors_directives() {
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
    }

    #[tokio::test]
    async fn test_bind_reports_assigned_port() {
        let config = ServeConfig::default().with_port(0);
        let listener = bind(&config).await.expect("test");
        assert_ne!(listener.local_addr().expect("test").port(), 0);
    }

    #[test]
    fn test_cli_parsing_info() {
        let cli = Cli::parse_from(["tabserve", "info"]);
        assert!(matches!(cli.command, Commands::Info));
    }
}
