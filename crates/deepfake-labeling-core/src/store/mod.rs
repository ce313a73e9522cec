//! Per-doctor label persistence.
//!
//! Each doctor owns one document mapping image filename to [`LabelRecord`].
//! The document is loaded whole, mutated in memory and written back whole
//! after every change.
//!
//! [`LabelRecord`]: crate::models::LabelRecord

mod backend;
mod json_file;
mod label_store;

pub use backend::*;
pub use json_file::*;
pub use label_store::*;

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::ValidationError;
use crate::persist::PersistError;

/// Label store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid label: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Label store directory {path} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write label store: {0}")]
    Persist(#[from] PersistError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Non-fatal problems found while reading a store. These never abort the
/// session but must reach the user.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWarning {
    /// The stored document could not be read or parsed. The session continues
    /// from an empty store; the damaged file is moved aside when possible.
    Corrupt {
        location: String,
        reason: String,
        quarantined_to: Option<String>,
    },
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreWarning::Corrupt {
                location,
                reason,
                quarantined_to: Some(backup),
            } => write!(
                f,
                "Saved labels at {} could not be read ({}); starting from an empty label set. \
                 The unreadable file was preserved as {}",
                location, reason, backup
            ),
            StoreWarning::Corrupt {
                location,
                reason,
                quarantined_to: None,
            } => write!(
                f,
                "Saved labels at {} could not be read ({}); starting from an empty label set. \
                 The unreadable file could not be preserved and will be overwritten on the next save",
                location, reason
            ),
        }
    }
}
