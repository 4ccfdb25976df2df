//! Adapters layer: Concrete implementations of ports.
//!
//! These modules read the artifacts produced by the training pipeline:
//! - `artifacts`: directory loading and manifest verification
//! - `scaler`: fitted standard/min-max scaler (`Rescaler`)
//! - `network`: dense feed-forward network (`Classifier`)

pub mod artifacts;
pub mod network;
pub mod scaler;

pub use artifacts::{ArtifactError, ArtifactLoader, LoadedArtifacts};
pub use network::DenseNetwork;
pub use scaler::FittedScaler;
