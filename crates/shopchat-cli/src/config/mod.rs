//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, OpenAPI, recovery/timeouts
//! ├── service: ServiceConfig       # Firestore, products, model endpoint
//! └── mock: MockConfig             # Fixed model reply (feature-gated)
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure credentials and port
//! shopchat-cli --firestore-credentials ./service_account.json --port 8080
//!
//! # Or via environment variables
//! FIRESTORE_CREDENTIALS=./service_account.json PORT=8080 shopchat-cli
//! ```

mod middleware;
mod provider;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
pub use provider::create_completion_service;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use shopchat_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the shopchat server:
/// - [`ServerConfig`]: Network binding and shutdown
/// - [`MiddlewareConfig`]: HTTP middleware (CORS, OpenAPI, recovery)
/// - [`ServiceConfig`]: Firestore and model endpoint connections
/// - `MockConfig`: Mock model configuration (feature-gated)
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "shopchat")]
#[command(about = "Product-aware chat gateway")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// External service configuration (Firestore, model endpoint).
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Mock model configuration.
    #[cfg(feature = "mock")]
    #[clap(flatten)]
    pub mock: shopchat_core::MockConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so that clap's `env` fallbacks see its
    /// values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration at info level (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            credentials = %self.service.firestore_credentials.display(),
            project_id = ?self.service.firestore_project_id,
            database = %self.service.firestore_database,
            emulator_host = ?self.service.firestore_emulator_host,
            collection = %self.service.product_collection,
            missing_product_policy = %self.service.missing_product_policy,
            "Product store configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            base_url = %self.service.openai_base_url,
            model = %self.service.openai_model,
            api_key_set = self.service.openai_api_key.is_some(),
            upstream_timeout_secs = self.service.upstream_timeout,
            "Model configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "mock").then_some("mock"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
