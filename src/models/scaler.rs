//! Standard scaler artifact

use crate::types::listing::{FeatureVector, FEATURE_COUNT};
use serde::Deserialize;

/// Fitted standardisation: `(x - mean) / scale` per feature.
///
/// Parameters are checked on construction and on deserialization, so a
/// scaler always matches the listing feature width.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ScalerParams")]
pub struct StandardScaler {
    mean: FeatureVector,
    scale: FeatureVector,
}

/// Scaler document as exported at fit time
#[derive(Debug, Deserialize)]
struct ScalerParams {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<ScalerParams> for StandardScaler {
    type Error = String;

    fn try_from(params: ScalerParams) -> Result<Self, Self::Error> {
        Self::new(params.mean, params.scale)
    }
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        let mean = fixed_width("mean", mean)?;
        let scale = fixed_width("scale", scale)?;

        if let Some(i) = mean.iter().chain(scale.iter()).position(|v| !v.is_finite()) {
            return Err(format!("non-finite parameter at position {}", i));
        }

        Ok(Self { mean, scale })
    }

    /// Apply the transform. A zero scale leaves the centred value unscaled.
    pub fn transform(&self, x: &FeatureVector) -> FeatureVector {
        let mut scaled = *x;
        for ((value, mean), scale) in scaled.iter_mut().zip(&self.mean).zip(&self.scale) {
            let scale = if *scale == 0.0 { 1.0 } else { *scale };
            *value = (*value - mean) / scale;
        }
        scaled
    }
}

fn fixed_width(name: &str, values: Vec<f64>) -> Result<FeatureVector, String> {
    let len = values.len();
    let fixed: Result<FeatureVector, _> = values.try_into();
    fixed.map_err(|_| format!("{} has {} entries, expected {}", name, len, FEATURE_COUNT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> StandardScaler {
        StandardScaler::new(vec![5.0, 20.0, 1.0], vec![4.0, 10.0, 0.5]).unwrap()
    }

    #[test]
    fn test_transform() {
        let scaled = fitted().transform(&[3.0, 10.0, 1.2]);
        assert!((scaled[0] + 0.5).abs() < 1e-12);
        assert!((scaled[1] + 1.0).abs() < 1e-12);
        assert!((scaled[2] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale() {
        let scaler = StandardScaler::new(vec![1.0, 1.0, 1.0], vec![2.0, 0.0, 1.0]).unwrap();
        let scaled = scaler.transform(&[3.0, 3.0, 3.0]);
        assert_eq!(scaled, [1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_deterministic() {
        let scaler = fitted();
        let input = [1.0, 0.0, 0.0];
        assert_eq!(scaler.transform(&input), scaler.transform(&input));
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let err = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap_err();
        assert_eq!(err, "mean has 2 entries, expected 3");

        let err = StandardScaler::new(vec![0.0; 3], vec![1.0; 4]).unwrap_err();
        assert_eq!(err, "scale has 4 entries, expected 3");
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let err = StandardScaler::new(vec![0.0, f64::NAN, 0.0], vec![1.0; 3]).unwrap_err();
        assert!(err.contains("position 1"));
    }

    #[test]
    fn test_deserialization_checks_width() {
        let scaler: StandardScaler =
            serde_json::from_str(r#"{"mean":[5.0,20.0,1.0],"scale":[4.0,10.0,0.5]}"#).unwrap();
        assert_eq!(scaler, fitted());

        let err = serde_json::from_str::<StandardScaler>(r#"{"mean":[0.0,0.0],"scale":[1.0,1.0]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("mean has 2 entries"));
    }
}
