//! Pretrained artifact loading.
//!
//! A model directory holds `scaler.json` and `classifier.json`, exported by the
//! training pipeline, and optionally a `manifest.json` binding both files by
//! SHA-256. Loading is all-or-nothing: any missing, malformed or inconsistent
//! artifact is an error and nothing is returned.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::network::DenseNetwork;
use super::scaler::FittedScaler;
use crate::domain::{FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{Classifier, Rescaler};

pub const SCALER_FILE: &str = "scaler.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Error type for artifact loading. Every variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    #[error("Required artifact missing: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {artifact}: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },

    #[error("Manifest rejected: {0}")]
    Manifest(String),

    #[error("File hash mismatch for {0}")]
    HashMismatch(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// Relative file name to lowercase SHA-256 hex digest
    pub files: BTreeMap<String, String>,
}

/// The two pretrained resources, validated and paired.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub scaler: FittedScaler,
    pub classifier: DenseNetwork,
}

/// Loads and cross-checks pretrained artifacts from a directory.
#[derive(Debug, Clone, Default)]
pub struct ArtifactLoader {
    require_manifest: bool,
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// A single normal path component: no separators, `..`, roots or prefixes.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing(path.to_path_buf())
        } else {
            ArtifactError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_feature_names(
    artifact: &'static str,
    names: Option<&Vec<String>>,
) -> Result<(), ArtifactError> {
    let Some(names) = names else {
        return Ok(());
    };
    if let Some(i) = names
        .iter()
        .zip(FEATURE_NAMES.iter())
        .position(|(got, want)| got != want)
    {
        return Err(ArtifactError::Invalid {
            artifact,
            reason: format!(
                "feature order mismatch at position {i}: artifact has {:?}, expected {:?}",
                names[i], FEATURE_NAMES[i]
            ),
        });
    }
    if names.len() != FEATURE_COUNT {
        return Err(ArtifactError::Invalid {
            artifact,
            reason: format!(
                "artifact names {} features, expected {FEATURE_COUNT}",
                names.len()
            ),
        });
    }
    Ok(())
}

impl ArtifactLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to load when no `manifest.json` is present.
    #[must_use]
    pub fn require_manifest(mut self, require: bool) -> Self {
        self.require_manifest = require;
        self
    }

    /// Load both artifacts from `model_dir`.
    ///
    /// # Errors
    /// Returns `ArtifactError` if either artifact is missing, unreadable,
    /// malformed, fails its manifest hash, or does not pair with the other.
    pub fn load(&self, model_dir: &Path) -> Result<LoadedArtifacts, ArtifactError> {
        if !model_dir.is_dir() {
            return Err(ArtifactError::DirectoryNotFound(model_dir.to_path_buf()));
        }

        let manifest = self.read_manifest(model_dir)?;

        let scaler_path = model_dir.join(SCALER_FILE);
        let scaler_bytes = read_file(&scaler_path)?;
        let classifier_path = model_dir.join(CLASSIFIER_FILE);
        let classifier_bytes = read_file(&classifier_path)?;

        if let Some(manifest) = &manifest {
            Self::verify_manifest(
                model_dir,
                manifest,
                &[(SCALER_FILE, &scaler_bytes[..]), (CLASSIFIER_FILE, &classifier_bytes[..])],
            )?;
        }

        let scaler: FittedScaler = parse_json(&scaler_path, &scaler_bytes)?;
        scaler.validate()?;
        let classifier: DenseNetwork = parse_json(&classifier_path, &classifier_bytes)?;
        classifier.validate()?;

        if scaler.n_features() != classifier.n_features() {
            return Err(ArtifactError::Invalid {
                artifact: "classifier",
                reason: format!(
                    "scaler has {} features but classifier expects {}",
                    scaler.n_features(),
                    classifier.n_features()
                ),
            });
        }

        check_feature_names("scaler", scaler.feature_names.as_ref())?;
        check_feature_names("classifier", classifier.feature_names.as_ref())?;

        if scaler.n_features() != FEATURE_COUNT {
            tracing::warn!(
                "Artifacts expect {} features but the encoder produces {}; every prediction will be rejected",
                scaler.n_features(),
                FEATURE_COUNT
            );
        }

        tracing::info!(
            "Loaded artifacts from {:?} (n_features={}, layers={}, outputs={}, manifest={})",
            model_dir,
            scaler.n_features(),
            classifier.layers.len(),
            classifier.n_outputs(),
            manifest.is_some()
        );

        Ok(LoadedArtifacts { scaler, classifier })
    }

    fn read_manifest(&self, model_dir: &Path) -> Result<Option<ArtifactManifest>, ArtifactError> {
        let path = model_dir.join(MANIFEST_FILE);
        if !path.exists() {
            if self.require_manifest {
                tracing::error!("Manifest required but not found at {:?}", path);
                return Err(ArtifactError::Missing(path));
            }
            tracing::debug!("No manifest at {:?}; skipping hash verification", path);
            return Ok(None);
        }

        let bytes = read_file(&path)?;
        let manifest: ArtifactManifest = parse_json(&path, &bytes)?;
        if manifest.version != 1 {
            return Err(ArtifactError::Manifest(format!(
                "unsupported version {}",
                manifest.version
            )));
        }
        if let Some(name) = manifest.files.keys().find(|name| !is_plain_file_name(name)) {
            return Err(ArtifactError::Manifest(format!(
                "{name:?} is not a file name inside the model directory"
            )));
        }
        for required in [SCALER_FILE, CLASSIFIER_FILE] {
            if !manifest.files.contains_key(required) {
                return Err(ArtifactError::Manifest(format!("{required} is not bound")));
            }
        }
        Ok(Some(manifest))
    }

    /// Hash the artifact buffers that will be parsed, not a second read.
    /// Other bound files are read from `model_dir`; their names were checked
    /// to be plain file names when the manifest was read.
    fn verify_manifest(
        model_dir: &Path,
        manifest: &ArtifactManifest,
        loaded: &[(&str, &[u8])],
    ) -> Result<(), ArtifactError> {
        for (name, expected_hex) in &manifest.files {
            let digest = match loaded.iter().find(|(loaded_name, _)| *loaded_name == name.as_str()) {
                Some((_, bytes)) => sha256_hex(bytes),
                None => sha256_hex(&read_file(&model_dir.join(name))?),
            };
            if !digest.eq_ignore_ascii_case(expected_hex.trim()) {
                return Err(ArtifactError::HashMismatch(name.clone()));
            }
        }
        tracing::info!("Artifact hashes verified ({} files)", manifest.files.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::network::{Activation, DenseLayer};
    use tempfile::tempdir;

    fn write_pair(dir: &Path, n: usize) -> (Vec<u8>, Vec<u8>) {
        let scaler = FittedScaler::standard(vec![0.0; n], vec![1.0; n]);
        let classifier = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![0.1]; n],
            bias: vec![0.0],
            activation: Activation::Sigmoid,
        }]);
        let scaler_bytes = serde_json::to_vec(&scaler).expect("serialize scaler");
        let classifier_bytes = serde_json::to_vec(&classifier).expect("serialize classifier");
        fs::write(dir.join(SCALER_FILE), &scaler_bytes).expect("write scaler");
        fs::write(dir.join(CLASSIFIER_FILE), &classifier_bytes).expect("write classifier");
        (scaler_bytes, classifier_bytes)
    }

    fn write_manifest(dir: &Path, files: &[(&str, &[u8])]) {
        let manifest = ArtifactManifest {
            version: 1,
            files: files
                .iter()
                .map(|(rel, bytes)| ((*rel).to_string(), sha256_hex(bytes)))
                .collect(),
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("serialize manifest"),
        )
        .expect("write manifest");
    }

    #[test]
    fn test_load_bundled_models() {
        let artifacts = ArtifactLoader::new()
            .load(Path::new("models"))
            .expect("bundled models should load");
        assert_eq!(artifacts.scaler.n_features(), FEATURE_COUNT);
        assert_eq!(artifacts.classifier.n_features(), FEATURE_COUNT);
    }

    #[test]
    fn test_load_pair() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT);
        let artifacts = ArtifactLoader::new().load(temp.path()).expect("load");
        assert_eq!(artifacts.classifier.n_outputs(), 1);
    }

    #[test]
    fn test_missing_classifier_is_fatal() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT);
        fs::remove_file(temp.path().join(CLASSIFIER_FILE)).expect("remove");

        let err = ArtifactLoader::new().load(temp.path()).unwrap_err();
        match err {
            ArtifactError::Missing(path) => assert!(path.ends_with(CLASSIFIER_FILE)),
            other => panic!("expected missing artifact, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let temp = tempdir().expect("tempdir");
        let err = ArtifactLoader::new()
            .load(&temp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT);
        fs::write(temp.path().join(SCALER_FILE), b"{not json").expect("write");
        let err = ArtifactLoader::new().load(temp.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_width_mismatch_between_artifacts() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT);
        let scaler = FittedScaler::standard(vec![0.0; 3], vec![1.0; 3]);
        fs::write(
            temp.path().join(SCALER_FILE),
            serde_json::to_vec(&scaler).unwrap(),
        )
        .unwrap();
        let err = ArtifactLoader::new().load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("scaler has 3 features"), "{err}");
    }

    #[test]
    fn test_feature_order_mismatch() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT);
        let mut names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        names.swap(3, 4);
        let mut scaler = FittedScaler::standard(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]);
        scaler.feature_names = Some(names);
        fs::write(
            temp.path().join(SCALER_FILE),
            serde_json::to_vec(&scaler).unwrap(),
        )
        .unwrap();

        let err = ArtifactLoader::new().load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("position 3"), "{err}");
    }

    #[test]
    fn test_other_width_loads_with_warning() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT - 1);
        let artifacts = ArtifactLoader::new().load(temp.path()).expect("load");
        assert_eq!(artifacts.scaler.n_features(), FEATURE_COUNT - 1);
    }

    #[test]
    fn test_manifest_verified() {
        let temp = tempdir().expect("tempdir");
        let (s, c) = write_pair(temp.path(), FEATURE_COUNT);
        write_manifest(temp.path(), &[(SCALER_FILE, &s[..]), (CLASSIFIER_FILE, &c[..])]);

        ArtifactLoader::new()
            .require_manifest(true)
            .load(temp.path())
            .expect("manifest should verify");

        // Tamper with the classifier after signing.
        fs::write(temp.path().join(CLASSIFIER_FILE), b"{\"layers\":[]}").unwrap();
        let err = ArtifactLoader::new().load(temp.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::HashMismatch(ref f) if f == CLASSIFIER_FILE));
    }

    #[test]
    fn test_manifest_must_bind_both_files() {
        let temp = tempdir().expect("tempdir");
        let (s, _) = write_pair(temp.path(), FEATURE_COUNT);
        write_manifest(temp.path(), &[(SCALER_FILE, &s[..])]);
        let err = ArtifactLoader::new().load(temp.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Manifest(_)));
    }

    #[test]
    fn test_required_manifest_missing() {
        let temp = tempdir().expect("tempdir");
        write_pair(temp.path(), FEATURE_COUNT);
        let err = ArtifactLoader::new()
            .require_manifest(true)
            .load(temp.path())
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(ref p) if p.ends_with(MANIFEST_FILE)));
    }

    #[test]
    fn test_manifest_entries_must_stay_in_model_dir() {
        let temp = tempdir().expect("tempdir");
        let (s, c) = write_pair(temp.path(), FEATURE_COUNT);

        let elsewhere = tempdir().expect("tempdir");
        let outside = elsewhere.path().join("secret.txt");
        fs::write(&outside, b"not an artifact").expect("write outside file");

        let outside_key = outside.to_string_lossy().into_owned();
        for key in [outside_key.as_str(), "../x", "./scaler.json", "sub/file.json"] {
            // Correct hash for the outside file, so only the name can fail.
            write_manifest(
                temp.path(),
                &[(SCALER_FILE, &s[..]), (CLASSIFIER_FILE, &c[..]), (key, &b"not an artifact"[..])],
            );
            let err = ArtifactLoader::new()
                .require_manifest(true)
                .load(temp.path())
                .unwrap_err();
            assert!(
                matches!(err, ArtifactError::Manifest(ref m) if m.contains("not a file name")),
                "{key:?} was accepted: {err}"
            );
        }
    }

    #[test]
    fn test_manifest_hashes_the_parsed_bytes() {
        let temp = tempdir().expect("tempdir");
        let (s, c) = write_pair(temp.path(), FEATURE_COUNT);
        let notes = b"exported alongside the model";
        fs::write(temp.path().join("notes.txt"), notes).expect("write notes");
        write_manifest(
            temp.path(),
            &[(SCALER_FILE, &s[..]), (CLASSIFIER_FILE, &c[..]), ("notes.txt", &notes[..])],
        );

        let loaded = ArtifactLoader::new()
            .require_manifest(true)
            .load(temp.path())
            .expect("extra plain entries inside the directory verify");
        assert_eq!(loaded.scaler.n_features(), FEATURE_COUNT);

        // The buffer handed in is what gets hashed, not the file on disk.
        let manifest = ArtifactLoader::new()
            .read_manifest(temp.path())
            .expect("manifest")
            .expect("present");
        let err = ArtifactLoader::verify_manifest(
            temp.path(),
            &manifest,
            &[(SCALER_FILE, &b"{}"[..]), (CLASSIFIER_FILE, &c[..])],
        )
        .unwrap_err();
        assert!(matches!(err, ArtifactError::HashMismatch(ref f) if f == SCALER_FILE));
    }
}
