//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the single use case of the application: predicting readmission risk.

mod encoder;
mod inference;

pub use encoder::FeatureEncoder;
pub use inference::{ReadmissionPredictor, READMITTED_CLASS};
