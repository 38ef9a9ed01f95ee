//! Vote aggregation across the three classifiers

use crate::types::prediction::{Consensus, ModelPrediction, PriceClass};

/// Summarise the per-model votes. `None` when no model voted.
pub fn consensus(predictions: &[ModelPrediction]) -> Option<Consensus> {
    if predictions.is_empty() {
        return None;
    }

    let total = predictions.len();
    let high_votes = predictions
        .iter()
        .filter(|p| p.class == PriceClass::High)
        .count();

    let majority = if high_votes * 2 > total {
        PriceClass::High
    } else {
        PriceClass::Low
    };

    Some(Consensus {
        high_votes,
        total,
        majority,
        unanimous: high_votes == 0 || high_votes == total,
    })
}

/// Fraction of models voting high price
pub fn voting_score(predictions: &[ModelPrediction]) -> f64 {
    match consensus(predictions) {
        Some(c) => c.high_votes as f64 / c.total as f64,
        None => 0.0,
    }
}
