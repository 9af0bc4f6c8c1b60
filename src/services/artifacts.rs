//! Short-lived result files for batch evaluation.
//!
//! Each batch writes one annotated CSV under the artifact directory. Files
//! are write-once, so their modification time is their creation time; a
//! file older than the TTL is deleted the next time someone asks for it.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use tracing::{debug, info};

use crate::models::{AnnotatedRow, BatchTable};
use crate::utils::sanitize::validate_artifact_name;
use crate::ClassifierError;

const ARTIFACT_PREFIX: &str = "batch_predictions_";
const LOCATOR_PREFIX: &str = "download/";

/// A persisted batch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    pub name: String,
    pub path: PathBuf,
    /// Opaque reference handed to callers, `download/<name>`.
    pub locator: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    ttl: Duration,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Write the annotated table under a fresh timestamped name.
    pub fn persist(
        &self,
        table: &BatchTable,
        annotated: &[AnnotatedRow],
    ) -> Result<ArtifactHandle, ClassifierError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ClassifierError::artifact(
                format!("Failed to create artifact directory {}", self.dir.display()),
                e,
            )
        })?;

        let name = format!(
            "{}{}.csv",
            ARTIFACT_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S_%6f")
        );
        let path = self.dir.join(&name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                ClassifierError::artifact(format!("Failed to create {}", path.display()), e)
            })?;
        table.write_annotated(BufWriter::new(file), annotated)?;

        info!("Wrote {} annotated rows to {}", annotated.len(), path.display());
        Ok(ArtifactHandle {
            locator: format!("{}{}", LOCATOR_PREFIX, name),
            name,
            path,
        })
    }

    /// Resolve an artifact by name, expiring it if older than the TTL.
    pub fn open(&self, name: &str) -> Result<PathBuf, ClassifierError> {
        self.open_at(name, SystemTime::now())
    }

    /// Like [`ArtifactStore::open`], measuring age against `now`.
    pub fn open_at(&self, name: &str, now: SystemTime) -> Result<PathBuf, ClassifierError> {
        let name = validate_artifact_name(name)?;
        let path = self.dir.join(name);

        let not_found = || ClassifierError::NotFound {
            kind: "artifact".to_string(),
            id: name.to_string(),
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(ClassifierError::artifact(
                    format!("Failed to stat {}", path.display()),
                    e,
                ))
            }
        };

        let written = metadata.modified().map_err(|e| {
            ClassifierError::artifact(format!("Failed to read mtime of {}", path.display()), e)
        })?;
        let age = now.duration_since(written).unwrap_or(Duration::ZERO);

        if age > self.ttl {
            debug!("Artifact {} expired ({}s old)", name, age.as_secs());
            match fs::remove_file(&path) {
                Ok(()) => info!("Deleted expired artifact {}", name),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ClassifierError::artifact(
                        format!("Failed to delete expired {}", path.display()),
                        e,
                    ))
                }
            }
            return Err(not_found());
        }

        Ok(path)
    }
}
