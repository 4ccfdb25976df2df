//! Fitted feature scaler exported by the training pipeline.
//!
//! Mirrors scikit-learn's `StandardScaler` (`mean_`, `scale_`) and
//! `MinMaxScaler` (`min_`, `scale_`). Parameters are frozen at load time.

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::ports::Rescaler;
use crate::{ReadmitError, Result};

/// Per-feature parameters of a fitted scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// A fitted scaler as stored in `scaler.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    #[serde(flatten)]
    pub params: ScalerParams,

    /// Column order the scaler was fit on, if the exporter recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl FittedScaler {
    /// Standard scaler from fitted means and standard deviations.
    #[must_use]
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            params: ScalerParams::Standard { mean, scale },
            feature_names: None,
        }
    }

    /// Min-max scaler from fitted offsets and multipliers.
    #[must_use]
    pub fn min_max(min: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            params: ScalerParams::MinMax { min, scale },
            feature_names: None,
        }
    }

    /// Check internal consistency of the fitted parameters.
    ///
    /// # Errors
    /// Returns `ArtifactError::Invalid` for empty, ragged, non-finite or
    /// zero-scale parameters.
    pub fn validate(&self) -> std::result::Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            artifact: "scaler",
            reason,
        };

        let (offset, scale) = match &self.params {
            ScalerParams::Standard { mean, scale } => (mean, scale),
            ScalerParams::MinMax { min, scale } => (min, scale),
        };

        if offset.is_empty() {
            return Err(invalid("no features".into()));
        }
        if offset.len() != scale.len() {
            return Err(invalid(format!(
                "parameter lengths differ ({} offsets, {} scales)",
                offset.len(),
                scale.len()
            )));
        }
        if let Some(i) = offset.iter().chain(scale).position(|v| !v.is_finite()) {
            return Err(invalid(format!("non-finite parameter at position {i}")));
        }
        if let ScalerParams::Standard { scale, .. } = &self.params {
            if let Some(i) = scale.iter().position(|s| *s == 0.0) {
                return Err(invalid(format!("zero scale for feature {i}")));
            }
        }
        if let Some(names) = &self.feature_names {
            if names.len() != offset.len() {
                return Err(invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    offset.len()
                )));
            }
        }
        Ok(())
    }
}

impl Rescaler for FittedScaler {
    fn n_features(&self) -> usize {
        match &self.params {
            ScalerParams::Standard { mean, .. } => mean.len(),
            ScalerParams::MinMax { min, .. } => min.len(),
        }
    }

    fn transform(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.n_features() {
            return Err(ReadmitError::Dimensionality {
                context: "rescaler",
                expected: self.n_features(),
                actual: input.len(),
            });
        }

        let out = match &self.params {
            ScalerParams::Standard { mean, scale } => input
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            ScalerParams::MinMax { min, scale } => input
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_transform() {
        let scaler = FittedScaler::standard(vec![1.0, 10.0], vec![2.0, 5.0]);
        let out = scaler.transform(&[3.0, 0.0]).expect("transform");
        assert_eq!(out, vec![1.0, -2.0]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = FittedScaler::min_max(vec![0.0, -0.5], vec![0.1, 0.25]);
        let out = scaler.transform(&[5.0, 4.0]).expect("transform");
        assert!((out[0] - 0.5).abs() < 1e-12);
        assert!((out[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_pure() {
        let scaler = FittedScaler::standard(vec![0.3, 4.4, 43.1], vec![1.7, 2.9, 19.6]);
        let input = [1.0, 5.0, 40.0];
        let a = scaler.transform(&input).unwrap();
        let b = scaler.transform(&input).unwrap();
        assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_transform_rejects_wrong_dimension() {
        let scaler = FittedScaler::standard(vec![0.0; 3], vec![1.0; 3]);
        match scaler.transform(&[1.0, 2.0]) {
            Err(ReadmitError::Dimensionality {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected dimensionality error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate() {
        assert!(FittedScaler::standard(vec![0.0], vec![1.0]).validate().is_ok());
        assert!(FittedScaler::standard(vec![0.0], vec![0.0]).validate().is_err());
        assert!(FittedScaler::standard(vec![0.0, 1.0], vec![1.0]).validate().is_err());
        assert!(FittedScaler::min_max(vec![], vec![]).validate().is_err());
        assert!(FittedScaler::min_max(vec![f64::NAN], vec![1.0]).validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"kind":"standard","mean":[1.0],"scale":[2.0],"feature_names":["age"]}"#;
        let scaler: FittedScaler = serde_json::from_str(json).expect("parse");
        assert_eq!(scaler.n_features(), 1);
        assert_eq!(scaler.feature_names.as_deref(), Some(&["age".to_string()][..]));

        let json = r#"{"kind":"min_max","min":[0.0,0.0],"scale":[1.0,1.0]}"#;
        let scaler: FittedScaler = serde_json::from_str(json).expect("parse");
        assert!(matches!(scaler.params, ScalerParams::MinMax { .. }));
    }
}
