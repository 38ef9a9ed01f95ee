//! ML model inference components

pub mod aggregator;
pub mod classifier;
pub mod inference;
pub mod loader;
pub mod scaler;

pub use classifier::{ModelKind, ModelOutput};
pub use inference::InferenceEngine;
pub use loader::{ArtifactLoader, LoadedModel, ModelArtifacts};
pub use scaler::StandardScaler;
