//! Error types
//!
//! Artifact errors are fatal: the process cannot serve predictions without
//! all four artifacts. A missing probability capability is recoverable and is
//! rendered as a per-model warning.

use crate::models::classifier::ModelKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load an inference artifact
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// File missing or unreadable
    #[error("Failed to read {artifact} artifact from {}: {source}", .path.display())]
    Read {
        artifact: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scaler document is malformed or its parameters are inconsistent
    #[error("Failed to parse {artifact} artifact from {}: {source}", .path.display())]
    Parse {
        artifact: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// ONNX Runtime rejected the model file
    #[error("Failed to create {artifact} session from {}: {reason}", .path.display())]
    Session {
        artifact: String,
        path: PathBuf,
        reason: String,
    },

    /// Session opened but does not have the expected signature
    #[error("Invalid {artifact} artifact in {}: {reason}", .path.display())]
    Invalid {
        artifact: String,
        path: PathBuf,
        reason: String,
    },
}

/// Failure while running a loaded model
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("{model} inference failed: {reason}")]
    Run { model: ModelKind, reason: String },

    #[error("{model} returned unknown class id {class_id}")]
    UnknownClass { model: ModelKind, class_id: i64 },
}

/// The model was not exported with probability estimates
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Probabilities not available for {model}.")]
pub struct ProbabilityUnavailable {
    pub model: ModelKind,
}

pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;
