//! Feature transformation for price category model inference.
//!
//! Assembles the listing features in the order used when the scaler and the
//! classifiers were fitted, then applies the fitted scaler.

use crate::models::scaler::StandardScaler;
use crate::types::listing::{FeatureVector, ListingFeatures, FEATURE_NAMES};

/// Transforms collected listing features into scaled model input.
pub struct FeatureTransformer {
    scaler: StandardScaler,
}

impl FeatureTransformer {
    pub fn new(scaler: StandardScaler) -> Self {
        Self { scaler }
    }

    /// Raw single-row vector: `[minimum_nights, number_of_reviews, reviews_per_month]`.
    pub fn assemble(&self, features: &ListingFeatures) -> FeatureVector {
        features.to_vector()
    }

    /// Assemble and scale.
    pub fn transform(&self, features: &ListingFeatures) -> FeatureVector {
        self.scaler.transform(&self.assemble(features))
    }

    /// Model input column names, in order
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer() -> FeatureTransformer {
        FeatureTransformer::new(
            StandardScaler::new(vec![5.0, 20.0, 1.0], vec![4.0, 10.0, 0.5]).unwrap(),
        )
    }

    #[test]
    fn test_assemble_order() {
        let t = transformer();
        let raw = t.assemble(&ListingFeatures::new(3, 10, 1.2));
        assert_eq!(raw, [3.0, 10.0, 1.2]);
        assert_eq!(
            t.feature_names(),
            ["minimum_nights", "number_of_reviews", "reviews_per_month"]
        );
    }

    #[test]
    fn test_transform_boundary_minimums() {
        let scaled = transformer().transform(&ListingFeatures::new(1, 0, 0.0));
        assert_eq!(scaled, [-1.0, -2.0, -2.0]);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let t = transformer();
        let features = ListingFeatures::default();
        assert_eq!(t.transform(&features), t.transform(&features));
    }
}
