//! Doctor whitelist: loading, validation and generation.
//!
//! The whitelist is a single JSON snapshot produced offline by the generator
//! and read once at process start by the validator.

mod generator;
mod pattern;
mod tabular;
mod validator;

pub use generator::*;
pub use pattern::*;
pub use tabular::*;
pub use validator::*;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Whitelist;
use crate::persist::{write_json_atomic, PersistError};

/// Default whitelist location, relative to the working directory.
pub const DEFAULT_WHITELIST_PATH: &str = "doctor_whitelist.json";

/// Whitelist errors.
#[derive(Error, Debug)]
pub enum WhitelistError {
    #[error("Whitelist not found at {0}")]
    Missing(PathBuf),

    #[error("Cannot read whitelist {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Whitelist is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Whitelist is malformed: {0}")]
    Malformed(String),

    #[error("Whitelist contains no doctor IDs")]
    Empty,

    #[error("Cannot write whitelist: {0}")]
    Write(#[from] PersistError),
}

pub type WhitelistResult<T> = Result<T, WhitelistError>;

/// Read and validate a whitelist snapshot.
pub fn load_whitelist<P: AsRef<Path>>(path: P) -> WhitelistResult<Whitelist> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            WhitelistError::Missing(path.to_path_buf())
        } else {
            WhitelistError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut whitelist: Whitelist = serde_json::from_slice(&bytes)?;
    whitelist
        .check_invariants()
        .map_err(WhitelistError::Malformed)?;

    if !whitelist.is_sorted() {
        tracing::debug!(path = %path.display(), "whitelist entries not sorted; sorting in memory");
        whitelist.whitelist.sort();
    }
    Ok(whitelist)
}

/// Write a whitelist snapshot, replacing any existing file.
pub fn save_whitelist<P: AsRef<Path>>(path: P, whitelist: &Whitelist) -> WhitelistResult<()> {
    whitelist
        .check_invariants()
        .map_err(WhitelistError::Malformed)?;
    write_json_atomic(path.as_ref(), whitelist)?;
    Ok(())
}
