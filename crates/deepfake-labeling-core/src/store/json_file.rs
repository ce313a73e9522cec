//! One JSON file per doctor in a labels directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::models::DoctorHash;
use crate::persist::write_json_atomic;

use super::{LabelBackend, LabelDocument, LoadOutcome, StoreError, StoreListing, StoreResult};

/// Default labels directory, relative to the working directory.
pub const DEFAULT_LABELS_DIR: &str = "doctor_labels";

const FILE_PREFIX: &str = "doctor_";
const FILE_SUFFIX: &str = ".json";

/// Stores each doctor's labels as `doctor_<hash>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a doctor's document. Only the hash appears in the name.
    pub fn path_for(&self, doctor: &DoctorHash) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, doctor.as_str(), FILE_SUFFIX))
    }

    /// Create the labels directory if needed and confirm files can be
    /// created in it.
    pub fn ensure_writable(&self) -> StoreResult<()> {
        let not_writable = |source: io::Error| StoreError::NotWritable {
            path: self.dir.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(not_writable)?;

        let probe = self
            .dir
            .join(format!(".write-probe-{}", uuid::Uuid::new_v4().simple()));
        fs::write(&probe, b"").map_err(not_writable)?;
        let _ = fs::remove_file(&probe);
        Ok(())
    }

    fn hash_from_file_name(name: &str) -> Option<DoctorHash> {
        name.strip_prefix(FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            .and_then(DoctorHash::from_hex)
    }
}

impl LabelBackend for JsonFileBackend {
    fn load(&self, doctor: &DoctorHash) -> StoreResult<LoadOutcome> {
        let path = self.path_for(doctor);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
            Err(e) => {
                return Ok(LoadOutcome::Corrupt {
                    reason: format!("cannot read file: {}", e),
                })
            }
        };

        Ok(match serde_json::from_slice::<LabelDocument>(&bytes) {
            Ok(document) => LoadOutcome::Loaded(document),
            Err(e) => LoadOutcome::Corrupt {
                reason: format!("invalid label document: {}", e),
            },
        })
    }

    fn save(&self, doctor: &DoctorHash, document: &LabelDocument) -> StoreResult<()> {
        let path = self.path_for(doctor);
        write_json_atomic(&path, document)?;
        tracing::debug!(doctor = doctor.short(), records = document.len(), "label store saved");
        Ok(())
    }

    fn quarantine(&self, doctor: &DoctorHash) -> StoreResult<Option<String>> {
        let path = self.path_for(doctor);
        if !path.exists() {
            return Ok(None);
        }

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
        let mut target = path.clone().into_os_string();
        target.push(format!(".corrupt-{}", stamp));
        let target = PathBuf::from(target);

        fs::rename(&path, &target).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(target.display().to_string()))
    }

    fn location(&self, doctor: &DoctorHash) -> String {
        self.path_for(doctor).display().to_string()
    }

    fn list(&self) -> StoreResult<Vec<StoreListing>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut listings = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            let Some(doctor) = name.to_str().and_then(Self::hash_from_file_name) else {
                continue;
            };
            let record_count = match self.load(&doctor)? {
                LoadOutcome::Loaded(document) => Some(document.len()),
                LoadOutcome::Missing | LoadOutcome::Corrupt { .. } => None,
            };
            listings.push(StoreListing {
                doctor,
                record_count,
            });
        }
        listings.sort_by(|a, b| a.doctor.cmp(&b.doctor));
        Ok(listings)
    }
}
