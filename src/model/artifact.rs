//! Persisted model artifacts.
//!
//! An artifact bundles everything inference needs — classifier, scaler,
//! feature-name order, success-pattern means — and is immutable once
//! written. Each training run writes a new timestamp-keyed file; the store
//! writes to a temp path and renames, so a crash mid-save never leaves a
//! half-written artifact visible to `load_latest`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MintscoreError, Result};
use crate::ml::{GbdtClassifier, StandardScaler};

const FILE_PREFIX: &str = "model_";
const FILE_SUFFIX: &str = ".json";

/// Timestamp format used for artifact versions; lexicographic order equals
/// chronological order.
pub const VERSION_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Training timestamp, formatted with [`VERSION_FORMAT`]
    pub version: String,
    pub trained_at: DateTime<Utc>,
    /// Feature order the classifier and scaler were fitted with
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub classifier: GbdtClassifier,
    /// Mean raw feature values over success-labeled training examples
    pub success_pattern_means: BTreeMap<String, f64>,
}

impl ModelArtifact {
    /// Shape consistency between the three fitted parts.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("feature_names must not be empty".to_string());
        }
        if self.scaler.width() != self.feature_names.len() {
            return Err(format!(
                "scaler width {} != feature count {}",
                self.scaler.width(),
                self.feature_names.len()
            ));
        }
        if self.classifier.n_features != self.feature_names.len() {
            return Err(format!(
                "classifier width {} != feature count {}",
                self.classifier.n_features,
                self.feature_names.len()
            ));
        }
        Ok(())
    }
}

/// File-backed artifact store
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an artifact under its version key. Write-temp-then-rename.
    pub fn save(&self, artifact: &ModelArtifact) -> Result<PathBuf> {
        artifact.validate().map_err(MintscoreError::Artifact)?;
        fs::create_dir_all(&self.dir)?;

        let file_name = format!("{FILE_PREFIX}{}{FILE_SUFFIX}", artifact.version);
        let final_path = self.dir.join(&file_name);
        let tmp_path = self.dir.join(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, serde_json::to_string_pretty(artifact)?)?;
        fs::rename(&tmp_path, &final_path)?;

        debug!(path = %final_path.display(), version = %artifact.version, "saved model artifact");
        Ok(final_path)
    }

    /// Load the most recently created artifact, or `None` if the store is
    /// empty. A present-but-unreadable artifact is an `Artifact` error so
    /// the caller can decide to degrade.
    pub fn load_latest(&self) -> Result<Option<ModelArtifact>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest: Option<PathBuf> = None;
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(FILE_PREFIX) || !name.ends_with(FILE_SUFFIX) {
                continue;
            }
            // Version stamps sort lexicographically, so the max file name is
            // the newest artifact.
            if latest.as_ref().map_or(true, |p| path > *p) {
                latest = Some(path);
            }
        }

        match latest {
            Some(path) => self.load(&path).map(Some),
            None => Ok(None),
        }
    }

    pub fn load(&self, path: &Path) -> Result<ModelArtifact> {
        let content = fs::read_to_string(path).map_err(|e| {
            MintscoreError::Artifact(format!("cannot read {}: {e}", path.display()))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&content).map_err(|e| {
            MintscoreError::Artifact(format!("corrupt artifact {}: {e}", path.display()))
        })?;
        artifact.validate().map_err(|e| {
            MintscoreError::Artifact(format!("invalid artifact {}: {e}", path.display()))
        })?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::GbdtParams;

    fn artifact(version: &str) -> ModelArtifact {
        let matrix = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let labels = vec![false, true];
        ModelArtifact {
            version: version.to_string(),
            trained_at: Utc::now(),
            feature_names: vec!["a".to_string(), "b".to_string()],
            scaler: StandardScaler::fit(&matrix).unwrap(),
            classifier: GbdtClassifier::fit(&matrix, &labels, GbdtParams::default()).unwrap(),
            success_pattern_means: BTreeMap::new(),
        }
    }

    #[test]
    fn save_then_load_latest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let saved = artifact("20240101_000000");
        store.save(&saved).unwrap();

        let loaded = store.load_latest().unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn load_latest_picks_the_newest_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.save(&artifact("20240101_000000")).unwrap();
        store.save(&artifact("20240301_120000")).unwrap();
        store.save(&artifact("20240201_060000")).unwrap();

        let loaded = store.load_latest().unwrap().unwrap();
        assert_eq!(loaded.version, "20240301_120000");
    }

    #[test]
    fn empty_store_is_none_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("never_created"));
        assert!(store.load_latest().unwrap().is_none());
    }

    #[test]
    fn corrupt_artifact_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(dir.path().join("model_20240101_000000.json"), "{not json").unwrap();

        let err = store.load_latest().unwrap_err();
        assert!(matches!(err, MintscoreError::Artifact(_)));
    }

    #[test]
    fn temp_files_are_not_visible_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        // A leftover temp file from a crashed save must be ignored.
        fs::write(dir.path().join(".model_20240101_000000.json.tmp"), "junk").unwrap();
        assert!(store.load_latest().unwrap().is_none());
    }

    #[test]
    fn mismatched_shapes_refuse_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let mut bad = artifact("20240101_000000");
        bad.feature_names.push("extra".to_string());
        assert!(matches!(
            store.save(&bad).unwrap_err(),
            MintscoreError::Artifact(_)
        ));
    }
}
