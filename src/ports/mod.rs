//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary between
//! the prediction use case and the pretrained artifacts.

mod model;

pub use model::{Classifier, Rescaler};
