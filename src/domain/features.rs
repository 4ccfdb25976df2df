//! Fixed-order feature vector consumed by the rescaler and classifier.

use serde::{Deserialize, Serialize};

/// Number of features the pretrained artifacts were fit on.
pub const FEATURE_COUNT: usize = 40;

/// Feature names in training order.
///
/// This order is part of the artifact contract: the scaler and classifier
/// were fit on columns laid out exactly like this.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "admission_type_id",
    "discharge_disposition_id",
    "admission_source_id",
    "race",
    "gender",
    "age",
    "diag_1",
    "diag_2",
    "diag_3",
    "metformin",
    "repaglinide",
    "nateglinide",
    "chlorpropamide",
    "glimepiride",
    "acetohexamide",
    "glipizide",
    "glyburide",
    "tolbutamide",
    "pioglitazone",
    "rosiglitazone",
    "acarbose",
    "miglitol",
    "troglitazone",
    "tolazamide",
    "insulin",
    "glyburide-metformin",
    "glipizide-metformin",
    "glimepiride-pioglitazone",
    "metformin-rosiglitazone",
    "metformin-pioglitazone",
    "change",
    "diabetesMed",
    "time_in_hospital",
    "num_lab_procedures",
    "num_procedures",
    "num_medications",
    "number_outpatient",
    "number_emergency",
    "number_inpatient",
    "number_diagnoses",
];

/// Encoded, unscaled model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap raw values.
    ///
    /// # Errors
    /// Returns `(expected, actual)` if the length is not `FEATURE_COUNT`.
    pub fn from_vec(values: Vec<f64>) -> Result<Self, (usize, usize)> {
        if values.len() != FEATURE_COUNT {
            return Err((FEATURE_COUNT, values.len()));
        }
        Ok(Self(values))
    }

    /// Wrap raw values of any length, to exercise the checks at inference time.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn unchecked(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of a named feature.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.0.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_names_unique() {
        let names: HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert_eq!(FeatureVector::from_vec(vec![0.0; 39]), Err((40, 39)));
        assert_eq!(FeatureVector::from_vec(vec![0.0; 41]), Err((40, 41)));
        assert!(FeatureVector::from_vec(vec![0.0; FEATURE_COUNT]).is_ok());
    }

    #[test]
    fn test_get_by_name() {
        let mut values = vec![0.0; FEATURE_COUNT];
        values[5] = 7.0;
        let v = FeatureVector::from_vec(values).unwrap();
        assert_eq!(v.get("age"), Some(7.0));
        assert_eq!(v.get("examide"), None);
    }
}
