//! Prediction result data structures

use crate::models::classifier::ModelKind;
use crate::types::listing::{FeatureVector, ListingFeatures};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Price category predicted by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceClass {
    /// Class id 0
    Low,
    /// Class id 1
    High,
}

impl PriceClass {
    /// Map a model label to a price class. Only 0 and 1 are valid.
    pub fn from_class_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(PriceClass::Low),
            1 => Some(PriceClass::High),
            _ => None,
        }
    }

    pub fn class_id(self) -> u8 {
        match self {
            PriceClass::Low => 0,
            PriceClass::High => 1,
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            PriceClass::Low => "low price",
            PriceClass::High => "high price",
        }
    }
}

impl fmt::Display for PriceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label predicted by one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPrediction {
    pub model: ModelKind,
    pub class: PriceClass,
    pub label: &'static str,
}

impl ModelPrediction {
    pub fn new(model: ModelKind, class: PriceClass) -> Self {
        Self {
            model,
            class,
            label: class.label(),
        }
    }
}

/// Outcome of a probability query against one model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbabilityOutcome {
    /// Probability of the high price class, as a percentage rounded to 2 places
    Available { model: ModelKind, high_price_pct: f64 },
    /// The model has no probability estimates
    Unavailable { model: ModelKind, warning: String },
}

impl ProbabilityOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, ProbabilityOutcome::Available { .. })
    }
}

/// Convert a probability to a percentage rounded to two decimal places
pub fn to_percentage(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

/// Vote summary across all models
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Consensus {
    /// Models predicting high price
    pub high_votes: usize,
    /// Models that voted
    pub total: usize,
    /// High on a strict majority, low otherwise
    pub majority: PriceClass,
    pub unanimous: bool,
}

/// Everything produced by one render pass
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    /// Unique pass identifier
    pub pass_id: Uuid,

    /// Pass timestamp
    pub generated_at: DateTime<Utc>,

    /// Collected input
    pub features: ListingFeatures,

    /// Input after the scaler transform
    pub scaled_features: FeatureVector,

    /// One prediction per model, in load order
    pub predictions: Vec<ModelPrediction>,

    /// Present only when the probability toggle is on
    pub probabilities: Option<Vec<ProbabilityOutcome>>,

    pub consensus: Option<Consensus>,
}

impl PredictionReport {
    /// Create a report for the given input and predictions
    pub fn new(
        features: ListingFeatures,
        scaled_features: FeatureVector,
        predictions: Vec<ModelPrediction>,
    ) -> Self {
        let consensus = crate::models::aggregator::consensus(&predictions);

        Self {
            pass_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            features,
            scaled_features,
            predictions,
            probabilities: None,
            consensus,
        }
    }

    /// Attach probability outcomes
    pub fn with_probabilities(mut self, probabilities: Vec<ProbabilityOutcome>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    /// Number of probability warnings in this pass
    pub fn warning_count(&self) -> usize {
        self.probabilities
            .as_ref()
            .map(|outcomes| outcomes.iter().filter(|o| !o.is_available()).count())
            .unwrap_or(0)
    }
}
