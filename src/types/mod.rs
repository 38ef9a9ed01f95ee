//! Type definitions for the listing price classifier

pub mod listing;
pub mod prediction;

pub use listing::{FeatureVector, ListingFeatures, ListingInput, FEATURE_COUNT};
pub use prediction::{ModelPrediction, PredictionReport, PriceClass, ProbabilityOutcome};
