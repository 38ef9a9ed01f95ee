//! Listing Price Classifier Library
//!
//! Runs pre-trained logistic regression, random forest and SVM classifiers
//! (ONNX, via ONNX Runtime) plus a fitted feature scaler, and predicts whether a listing falls in the
//! low or high price category.

pub mod config;
pub mod error;
pub mod feature_transformer;
pub mod metrics;
pub mod models;
pub mod render;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactError, InferenceError, ProbabilityUnavailable};
pub use feature_transformer::FeatureTransformer;
pub use models::inference::InferenceEngine;
pub use types::{listing::ListingFeatures, prediction::PredictionReport};
