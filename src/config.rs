//! Runtime settings read from the environment.
//!
//! | Variable                   | Default       |
//! |----------------------------|---------------|
//! | `READMIT_MODEL_PATH`       | `models`      |
//! | `READMIT_LOG_MODE`         | `auto`        |
//! | `READMIT_LOG_FILE`         | `readmit.log` |
//! | `READMIT_REQUIRE_MANIFEST` | `false`       |

use std::path::PathBuf;

pub const MODEL_PATH_VAR: &str = "READMIT_MODEL_PATH";
pub const LOG_MODE_VAR: &str = "READMIT_LOG_MODE";
pub const LOG_FILE_VAR: &str = "READMIT_LOG_FILE";
pub const REQUIRE_MANIFEST_VAR: &str = "READMIT_REQUIRE_MANIFEST";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn uses_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Settings gathered once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding `scaler.json` and `classifier.json`
    pub model_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Refuse to start without a verified `manifest.json`
    pub require_manifest: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("readmit.log"),
            require_manifest: false,
        }
    }
}

impl Settings {
    /// Read settings from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            model_dir: non_empty(MODEL_PATH_VAR).map_or(defaults.model_dir, PathBuf::from),
            log_mode: non_empty(LOG_MODE_VAR).map_or(defaults.log_mode, |v| LogMode::parse(&v)),
            log_file: non_empty(LOG_FILE_VAR).map_or(defaults.log_file, PathBuf::from),
            require_manifest: non_empty(REQUIRE_MANIFEST_VAR)
                .map_or(defaults.require_manifest, |v| parse_flag(&v)),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
