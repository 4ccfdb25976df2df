//! Prediction service: Orchestrates encoding, rescaling and classification.
//!
//! This service coordinates:
//! - Range validation of operator selections
//! - Feature encoding in training order
//! - Dimensionality checks against both artifacts
//! - Rescaling and inference
//! - Threshold decision

use std::sync::Arc;

use crate::adapters::{DenseNetwork, FittedScaler, LoadedArtifacts};
use crate::domain::{FeatureVector, PatientAttributes, Prediction, FEATURE_COUNT};
use crate::ports::{Classifier, Rescaler};
use crate::{ReadmitError, Result};

use super::FeatureEncoder;

/// Output index of the readmitted class in a two-unit head.
pub const READMITTED_CLASS: usize = 1;

/// Service for running readmission predictions.
///
/// Holds the pretrained artifacts behind `Arc` so one loaded pair can serve
/// any number of sessions without copying or locking. Each call is
/// independent; nothing is remembered between requests.
pub struct ReadmissionPredictor<R, C>
where
    R: Rescaler,
    C: Classifier,
{
    encoder: FeatureEncoder,
    rescaler: Arc<R>,
    classifier: Arc<C>,
}

impl<R, C> Clone for ReadmissionPredictor<R, C>
where
    R: Rescaler,
    C: Classifier,
{
    fn clone(&self) -> Self {
        Self {
            encoder: self.encoder,
            rescaler: Arc::clone(&self.rescaler),
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl ReadmissionPredictor<FittedScaler, DenseNetwork> {
    /// Build a predictor from artifacts loaded at startup.
    #[must_use]
    pub fn from_artifacts(artifacts: LoadedArtifacts) -> Self {
        Self::new(Arc::new(artifacts.scaler), Arc::new(artifacts.classifier))
    }
}

impl<R, C> ReadmissionPredictor<R, C>
where
    R: Rescaler,
    C: Classifier,
{
    /// Create a new prediction service.
    pub fn new(rescaler: Arc<R>, classifier: Arc<C>) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            rescaler,
            classifier,
        }
    }

    /// Validate, encode and predict.
    ///
    /// # Errors
    /// Returns `ReadmitError::Validation` for out-of-range counts, and any
    /// error `FeatureEncoder::encode` or `predict_vector` returns.
    pub fn predict(&self, attrs: &PatientAttributes) -> Result<Prediction> {
        attrs
            .validate()
            .map_err(|errors| ReadmitError::Validation(errors.join(", ")))?;

        let vector = self.encoder.encode(attrs)?;
        self.predict_vector(&vector)
    }

    /// Rescale and classify an already encoded vector.
    ///
    /// # Errors
    /// Returns `ReadmitError::Dimensionality` if the vector does not have
    /// exactly the width the encoder, rescaler and classifier agree on, and
    /// `ReadmitError::InvalidProbability` if the classifier output is not a
    /// probability.
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<Prediction> {
        let checks = [
            ("feature vector", FEATURE_COUNT),
            ("rescaler", self.rescaler.n_features()),
            ("classifier", self.classifier.n_features()),
        ];
        for (context, expected) in checks {
            if vector.len() != expected {
                tracing::warn!(
                    "Rejecting prediction: {} expects {} features, got {}",
                    context,
                    expected,
                    vector.len()
                );
                return Err(ReadmitError::Dimensionality {
                    context,
                    expected,
                    actual: vector.len(),
                });
            }
        }

        tracing::debug!("Rescaling {} features...", vector.len());
        let scaled = self.rescaler.transform(vector.as_slice())?;

        tracing::debug!("Running classifier...");
        let probabilities = self.classifier.predict_proba(&scaled)?;
        let probability = readmitted_probability(&probabilities)?;

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ReadmitError::InvalidProbability(probability));
        }

        let prediction = Prediction::new(probability);
        tracing::info!(
            "Prediction complete: probability={:.2}, verdict={}",
            prediction.probability,
            prediction.verdict
        );
        Ok(prediction)
    }
}

/// Extract the readmitted-class probability from a classifier head.
fn readmitted_probability(probabilities: &[f64]) -> Result<f64> {
    match probabilities {
        [p] => Ok(*p),
        [_, p] => Ok(*p),
        other => Err(ReadmitError::Dimensionality {
            context: "classifier output",
            expected: READMITTED_CLASS + 1,
            actual: other.len(),
        }),
    }
}
