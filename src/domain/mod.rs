//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. Code tables, patient attributes, the fixed-order
//! feature vector and the thresholded prediction.

pub mod codes;
mod features;
mod patient;
mod prediction;

pub use codes::{
    AdmissionType, AgeBracket, Categorical, DiabetesMedication, DiagnosisCategory, DosageChange,
    EncodingError, Gender, Medication, MedicationChange, Race,
};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use patient::{ClinicalCount, ClinicalCounts, MedicationRegimen, PatientAttributes};
pub use prediction::{Prediction, Verdict, READMISSION_THRESHOLD};
