//! # Readmit
//!
//! Thirty-day readmission risk prediction for diabetic inpatients.
//!
//! This crate provides:
//! - Static code tables turning operator selections into model features
//! - A fixed-order feature vector matching the training pipeline
//! - Rescaling and classification with pretrained artifacts
//! - Terminal UI for form-driven, local-only use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (code tables, patient attributes, prediction)
//! - `ports`: Trait definitions for the pretrained rescaler and classifier
//! - `adapters`: Concrete implementations loaded from JSON artifacts
//! - `application`: Feature encoding and the prediction use case
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureVector, PatientAttributes, Prediction, Verdict};

/// Result type for Readmit operations
pub type Result<T> = std::result::Result<T, ReadmitError>;

/// Main error type for Readmit
#[derive(Debug, thiserror::Error)]
pub enum ReadmitError {
    #[error("Startup artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Encoding mismatch: {0}")]
    Encoding(#[from] domain::EncodingError),

    #[error("Dimensionality mismatch: {context} expects {expected} features, got {actual}")]
    Dimensionality {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Classifier produced an invalid probability: {0}")]
    InvalidProbability(f64),
}

impl ReadmitError {
    /// Short category name, safe to log (never carries patient values).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Artifact(_) => "artifact",
            Self::Encoding(_) => "encoding mismatch",
            Self::Dimensionality { .. } => "dimensionality mismatch",
            Self::Validation(_) => "validation",
            Self::InvalidProbability(_) => "invalid probability",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_never_carries_values() {
        let errors = [
            ReadmitError::from(domain::EncodingError {
                attribute: "race",
                label: "Martian".to_string(),
            }),
            ReadmitError::Dimensionality {
                context: "encoder",
                expected: 40,
                actual: 39,
            },
            ReadmitError::Validation("time_in_hospital: 31 out of range".to_string()),
            ReadmitError::InvalidProbability(1.5),
        ];
        let kinds: Vec<_> = errors.iter().map(ReadmitError::kind).collect();
        assert_eq!(
            kinds,
            ["encoding mismatch", "dimensionality mismatch", "validation", "invalid probability"]
        );
        for (err, kind) in errors.iter().zip(kinds) {
            assert_ne!(err.to_string(), kind);
            assert!(!kind.chars().any(|c| c.is_ascii_digit()));
        }
    }
}
