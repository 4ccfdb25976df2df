//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides:
//! - Patient form with code-table choices and bounded sliders
//! - Prediction result view

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::ClinicalTheme;
