//! Model ports: Traits for the pretrained rescaler and classifier.
//!
//! These traits abstract the artifact format owned by the training pipeline
//! from the prediction use case.

use crate::Result;

/// A fitted per-feature rescaling transform.
///
/// Implementations are frozen after loading: `transform` never fits and
/// never mutates, so identical inputs give bit-identical outputs.
pub trait Rescaler: Send + Sync {
    /// Number of features the transform was fit on.
    fn n_features(&self) -> usize;

    /// Rescale one raw feature vector.
    ///
    /// # Errors
    /// Returns `ReadmitError::Dimensionality` if `input` has the wrong length.
    fn transform(&self, input: &[f64]) -> Result<Vec<f64>>;
}

/// A fitted probabilistic binary classifier.
pub trait Classifier: Send + Sync {
    /// Number of input features the classifier expects.
    fn n_features(&self) -> usize;

    /// Per-class probabilities for one rescaled vector.
    ///
    /// A single-element result is the positive-class probability; a
    /// two-element result is `[p(not readmitted), p(readmitted)]`.
    ///
    /// # Errors
    /// Returns `ReadmitError::Dimensionality` if `input` has the wrong length.
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>>;
}
