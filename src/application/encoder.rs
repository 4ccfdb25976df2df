//! Feature encoder: Turns operator selections into the model's input vector.
//!
//! Categorical attributes are replaced by their code-table values; numeric
//! attributes pass through unchanged. No scaling or imputation happens here.

use crate::domain::{
    Categorical, ClinicalCount, FeatureVector, PatientAttributes, FEATURE_COUNT,
};
use crate::{ReadmitError, Result};

/// Stateless encoder over the static code tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Assemble the feature vector in training order.
    ///
    /// # Errors
    /// Returns `ReadmitError::Dimensionality` if the assembled vector is not
    /// `FEATURE_COUNT` wide.
    pub fn encode(&self, attrs: &PatientAttributes) -> Result<FeatureVector> {
        let count = |c: ClinicalCount| f64::from(attrs.counts.get(c));

        let mut values = Vec::with_capacity(FEATURE_COUNT);

        values.push(f64::from(attrs.admission_type.code()));
        values.push(count(ClinicalCount::DischargeDisposition));
        values.push(count(ClinicalCount::AdmissionSource));

        values.push(f64::from(attrs.race.code()));
        values.push(f64::from(attrs.gender.code()));
        values.push(f64::from(attrs.age.code()));

        values.extend(attrs.diagnoses.iter().map(|d| f64::from(d.code())));
        values.extend(attrs.medications.iter().map(|(_, d)| f64::from(d.code())));

        values.push(f64::from(attrs.change.code()));
        values.push(f64::from(attrs.diabetes_med.code()));

        values.extend(ClinicalCount::ENCOUNTER.iter().map(|&c| count(c)));

        FeatureVector::from_vec(values).map_err(|(expected, actual)| {
            ReadmitError::Dimensionality {
                context: "encoder",
                expected,
                actual,
            }
        })
    }
}
