//! Configuration management for the listing price classifier

use crate::models::classifier::ModelKind;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Location of the four inference artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the artifact files
    pub dir: String,
    pub logistic_file: String,
    pub random_forest_file: String,
    pub svm_file: String,
    pub scaler_file: String,
    /// Intra-op threads per ONNX session
    pub onnx_threads: usize,
}

impl ArtifactsConfig {
    /// Path of the artifact for a model
    pub fn model_path(&self, kind: ModelKind) -> PathBuf {
        let file = match kind {
            ModelKind::LogisticRegression => &self.logistic_file,
            ModelKind::RandomForest => &self.random_forest_file,
            ModelKind::Svm => &self.svm_file,
        };
        Path::new(&self.dir).join(file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.scaler_file)
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            logistic_file: "logistic_model.onnx".to_string(),
            random_forest_file: "rf_model.onnx".to_string(),
            svm_file: "svm_model.onnx".to_string(),
            scaler_file: "scaler.json".to_string(),
            onnx_threads: 1,
        }
    }
}

/// HTTP front-end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between logged summaries, 0 disables periodic reporting
    pub report_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from a specific path.
    ///
    /// Values from the file are layered over the defaults; a missing file
    /// yields the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to build default configuration")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_ref()).required(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig::default(),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                report_interval_secs: 300,
            },
        }
    }
}
