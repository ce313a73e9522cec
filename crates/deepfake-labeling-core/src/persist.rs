//! Whole-document JSON persistence.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Errors while writing a document.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// The document is written to a uniquely named sibling, synced, then renamed
/// over the target, so readers see either the old or the new document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');

    let tmp = temp_path_for(path);
    if let Err(source) = write_synced(&tmp, &bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistError::Io { path: tmp, source });
    }

    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// `.<name>.<uuid>.tmp` next to the target.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}
