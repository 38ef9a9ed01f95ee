//! Listing feature data structures and input collection

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features consumed by the scaler and every classifier
pub const FEATURE_COUNT: usize = 3;

/// Feature names in the order used when the artifacts were fitted
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["minimum_nights", "number_of_reviews", "reviews_per_month"];

/// Single-row model input in fixed feature order
pub type FeatureVector = [f64; FEATURE_COUNT];

pub const DEFAULT_MINIMUM_NIGHTS: u32 = 3;
pub const DEFAULT_NUMBER_OF_REVIEWS: u32 = 10;
pub const DEFAULT_REVIEWS_PER_MONTH: f64 = 1.2;

pub const MIN_MINIMUM_NIGHTS: u32 = 1;
pub const MIN_NUMBER_OF_REVIEWS: u32 = 0;
pub const MIN_REVIEWS_PER_MONTH: f64 = 0.0;

/// Increment of the reviews-per-month control
pub const REVIEWS_PER_MONTH_STEP: f64 = 0.1;

/// Validated listing characteristics for one render pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListingFeatures {
    /// Minimum number of nights per booking (>= 1)
    pub minimum_nights: u32,

    /// Total number of reviews (>= 0)
    pub number_of_reviews: u32,

    /// Average reviews per month (>= 0.0)
    pub reviews_per_month: f64,
}

impl ListingFeatures {
    /// Build features, clamping each value to its control minimum
    pub fn new(minimum_nights: u32, number_of_reviews: u32, reviews_per_month: f64) -> Self {
        let reviews_per_month = if reviews_per_month.is_finite() {
            reviews_per_month.max(MIN_REVIEWS_PER_MONTH)
        } else {
            DEFAULT_REVIEWS_PER_MONTH
        };

        Self {
            minimum_nights: minimum_nights.max(MIN_MINIMUM_NIGHTS),
            number_of_reviews: number_of_reviews.max(MIN_NUMBER_OF_REVIEWS),
            reviews_per_month,
        }
    }

    /// Raw feature vector in fitted order
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.minimum_nights as f64,
            self.number_of_reviews as f64,
            self.reviews_per_month,
        ]
    }
}

impl Default for ListingFeatures {
    fn default() -> Self {
        Self {
            minimum_nights: DEFAULT_MINIMUM_NIGHTS,
            number_of_reviews: DEFAULT_NUMBER_OF_REVIEWS,
            reviews_per_month: DEFAULT_REVIEWS_PER_MONTH,
        }
    }
}

/// Raw form values as submitted by the input surface.
///
/// Every field is optional text so that empty or malformed controls fall back
/// to their defaults instead of rejecting the whole interaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingInput {
    pub minimum_nights: Option<String>,
    pub number_of_reviews: Option<String>,
    pub reviews_per_month: Option<String>,
    /// Checkbox state ("on", "true", "1", "yes")
    pub probabilities: Option<String>,
}

impl ListingInput {
    /// Collect features from the raw values
    pub fn collect(&self) -> ListingFeatures {
        let minimum_nights = parse_count(
            "minimum_nights",
            self.minimum_nights.as_deref(),
            MIN_MINIMUM_NIGHTS,
            DEFAULT_MINIMUM_NIGHTS,
        );
        let number_of_reviews = parse_count(
            "number_of_reviews",
            self.number_of_reviews.as_deref(),
            MIN_NUMBER_OF_REVIEWS,
            DEFAULT_NUMBER_OF_REVIEWS,
        );
        let reviews_per_month = parse_rate(self.reviews_per_month.as_deref());

        ListingFeatures::new(minimum_nights, number_of_reviews, reviews_per_month)
    }

    /// Whether the probability toggle is checked
    pub fn show_probabilities(&self) -> bool {
        matches!(
            self.probabilities
                .as_deref()
                .map(|v| v.trim().to_ascii_lowercase())
                .as_deref(),
            Some("on" | "true" | "1" | "yes")
        )
    }
}

/// Parse an integer control. Negative values clamp to `min`.
fn parse_count(field: &str, raw: Option<&str>, min: u32, default: u32) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return default;
    };

    // Number inputs may submit "3.0"
    let parsed = raw
        .parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64));

    match parsed {
        Some(value) => value.clamp(min as i64, u32::MAX as i64) as u32,
        None => {
            debug!(field = %field, value = %raw, "Unparseable input, using default");
            default
        }
    }
}

fn parse_rate(raw: Option<&str>) -> f64 {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_REVIEWS_PER_MONTH;
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value.max(MIN_REVIEWS_PER_MONTH),
        _ => {
            debug!(field = "reviews_per_month", value = %raw, "Unparseable input, using default");
            DEFAULT_REVIEWS_PER_MONTH
        }
    }
}
