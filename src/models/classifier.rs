//! Model families and per-run classifier output

use crate::error::ProbabilityUnavailable;
use crate::types::prediction::PriceClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three model families served by the application, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    Svm,
}

impl ModelKind {
    /// Load and render order
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LogisticRegression,
        ModelKind::RandomForest,
        ModelKind::Svm,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::Svm => "SVM",
        }
    }

    /// Stable identifier used in logs, metrics and JSON
    pub fn key(self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::RandomForest => "random_forest",
            ModelKind::Svm => "svm",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of running one model session on a single row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    pub model: ModelKind,
    pub class: PriceClass,
    /// `[p(low), p(high)]`, present when the session exposes probabilities
    pub probabilities: Option<[f64; 2]>,
}

impl ModelOutput {
    pub fn probability(&self) -> Result<[f64; 2], ProbabilityUnavailable> {
        self.probabilities
            .ok_or(ProbabilityUnavailable { model: self.model })
    }
}
