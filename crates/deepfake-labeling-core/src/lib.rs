//! Deepfake Labeling Core Library
//!
//! Access control and label persistence for doctors rating how hard it is to
//! tell synthetic medical images from real ones.
//!
//! # Architecture
//!
//! ```text
//!   Admin sources (prompt / pattern / text / CSV)
//!                       │
//!              WhitelistGenerator
//!                       │
//!             doctor_whitelist.json
//!                       │  loaded once per process
//!              WhitelistValidator ◄──── candidate Doctor ID
//!                       │
//!                  granted? ──no──► NotAuthorized / Unavailable
//!                       │
//!                  DoctorHash (SHA-256)
//!                       │
//!     ┌─────────────────▼─────────────────┐
//!     │  doctor_labels/doctor_<hash>.json │
//!     │  filename → LabelRecord           │
//!     │  whole-document atomic replace    │
//!     └───────────────────────────────────┘
//! ```
//!
//! # Core Principle
//!
//! **Fail closed.** A missing or damaged whitelist authorizes nobody, and raw
//! Doctor IDs never reach file names or logs.
//!
//! # Modules
//!
//! - [`config`]: Whitelist path and labels directory, with env overrides
//! - [`models`]: Domain types (DoctorId, Difficulty, LabelRecord, Whitelist)
//! - [`whitelist`]: Whitelist loading, validation and generation
//! - [`store`]: Per-doctor JSON label stores
//! - [`session`]: Authenticated labeling sessions

pub mod config;
pub mod models;
mod persist;
pub mod session;
pub mod store;
pub mod whitelist;

// Re-export commonly used types
pub use config::LabelingConfig;
pub use models::{
    Difficulty, DoctorHash, DoctorId, LabelRecord, LabelSubmission, ValidationError, Whitelist,
};
pub use session::{LabelingService, Session, SessionError};
pub use store::{JsonFileBackend, LabelStore, Progress, StoreWarning};
pub use whitelist::{
    load_whitelist, save_whitelist, Authorization, WhitelistGenerator, WhitelistValidator,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

/// Errors crossing the FFI boundary. Each message is safe to show the doctor;
/// operator detail goes to the log.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LabelingError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    Storage(String),
}

impl From<SessionError> for LabelingError {
    fn from(e: SessionError) -> Self {
        let message = e.user_message();
        match e {
            SessionError::Configuration(detail) => {
                tracing::error!(%detail, "labeling unavailable");
                LabelingError::Configuration(message)
            }
            SessionError::Validation(_) => LabelingError::Validation(message),
            SessionError::NotAuthorized => LabelingError::NotAuthorized(message),
            SessionError::Storage(detail) => {
                tracing::error!(%detail, "label store failure");
                LabelingError::Storage(message)
            }
        }
    }
}

impl From<ValidationError> for LabelingError {
    fn from(e: ValidationError) -> Self {
        SessionError::Validation(e).into()
    }
}

impl<T> From<std::sync::PoisonError<T>> for LabelingError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        SessionError::Storage(format!("Lock poisoned: {}", e)).into()
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Load the whitelist and prepare the labels directory.
///
/// Succeeds even when the whitelist is unavailable; check
/// [`LabelingCore::configuration_problems`] before showing the login form.
#[uniffi::export]
pub fn open_labeling_service(whitelist_path: String, labels_dir: String) -> Arc<LabelingCore> {
    let config = LabelingConfig::default()
        .with_whitelist_path(whitelist_path)
        .with_labels_dir(labels_dir);
    LabelingCore::new(config)
}

/// Same as [`open_labeling_service`], with paths from the environment.
#[uniffi::export]
pub fn open_labeling_service_from_env() -> Arc<LabelingCore> {
    LabelingCore::new(LabelingConfig::from_env())
}

/// Every difficulty level, in rating order, as stored strings.
#[uniffi::export]
pub fn difficulty_levels() -> Vec<String> {
    Difficulty::ALL.iter().map(|d| d.as_str().to_string()).collect()
}

// =========================================================================
// Main API Objects
// =========================================================================

/// Process-wide handle for the UI.
#[derive(uniffi::Object)]
pub struct LabelingCore {
    service: Arc<LabelingService>,
}

impl LabelingCore {
    fn new(config: LabelingConfig) -> Arc<Self> {
        Arc::new(Self {
            service: Arc::new(LabelingService::new(config)),
        })
    }
}

#[uniffi::export]
impl LabelingCore {
    /// Check a Doctor ID without opening a session.
    pub fn authorize(&self, candidate: String) -> FfiAuthorization {
        self.service.authorize(&candidate).into()
    }

    /// Authenticate and open the doctor's label store.
    pub fn start_session(&self, candidate: String) -> Result<Arc<LabelingSession>, LabelingError> {
        let session = self.service.start_session(&candidate)?;
        Ok(Arc::new(LabelingSession {
            session: Mutex::new(session),
        }))
    }

    /// Number of whitelisted doctors, or `None` when unavailable.
    pub fn authorized_count(&self) -> Option<u32> {
        self.service
            .validator()
            .authorized_count()
            .map(|count| count as u32)
    }

    /// Operator-facing problems that block every login.
    pub fn configuration_problems(&self) -> Vec<String> {
        self.service.configuration_problems()
    }
}

/// One doctor's session.
#[derive(uniffi::Object)]
pub struct LabelingSession {
    session: Mutex<Session>,
}

#[uniffi::export]
impl LabelingSession {
    /// Short form of the doctor's hash, for display.
    pub fn doctor_hash(&self) -> Result<String, LabelingError> {
        let session = self.session.lock()?;
        Ok(session.doctor_hash().short().to_string())
    }

    /// Save (or replace) the label for one image.
    pub fn submit_label(
        &self,
        submission: FfiLabelSubmission,
    ) -> Result<FfiLabelRecord, LabelingError> {
        let submission = LabelSubmission::try_from(submission)?;
        let filename = submission.filename.clone();
        let mut session = self.session.lock()?;
        let record = session.submit(submission)?;
        Ok(FfiLabelRecord::new(filename, record))
    }

    pub fn progress(&self, total_images: u32) -> Result<FfiProgress, LabelingError> {
        let mut session = self.session.lock()?;
        let progress = session.progress(total_images as usize)?;
        Ok(progress.into())
    }

    /// All saved labels, ordered by filename.
    pub fn labels(&self) -> Result<Vec<FfiLabelRecord>, LabelingError> {
        let session = self.session.lock()?;
        Ok(session
            .labels()
            .iter()
            .map(|(filename, record)| FfiLabelRecord::new(filename.clone(), record.clone()))
            .collect())
    }

    /// Count per difficulty level, including levels never chosen.
    pub fn summary(&self) -> Result<Vec<FfiDifficultyCount>, LabelingError> {
        let session = self.session.lock()?;
        let counts = session.summary();
        Ok(Difficulty::ALL
            .iter()
            .map(|difficulty| FfiDifficultyCount {
                difficulty: difficulty.as_str().to_string(),
                title: difficulty.title().to_string(),
                count: counts.get(difficulty).copied().unwrap_or(0) as u32,
            })
            .collect())
    }

    /// Newest labels first.
    pub fn recent_labels(&self, limit: u32) -> Result<Vec<FfiLabelRecord>, LabelingError> {
        let session = self.session.lock()?;
        Ok(session
            .recent(limit as usize)
            .into_iter()
            .map(|(filename, record)| FfiLabelRecord::new(filename.to_string(), record.clone()))
            .collect())
    }

    /// First of `candidates` with no saved label.
    pub fn next_unlabeled(&self, candidates: Vec<String>) -> Result<Option<String>, LabelingError> {
        let session = self.session.lock()?;
        Ok(session
            .next_unlabeled(candidates.iter().map(String::as_str))
            .map(str::to_string))
    }

    /// Problems found while loading saved labels.
    pub fn warnings(&self) -> Result<Vec<String>, LabelingError> {
        let session = self.session.lock()?;
        Ok(session.warnings().iter().map(|w| w.to_string()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe authorization outcome.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiAuthorization {
    Granted { doctor_hash: String },
    NotAuthorized,
    InvalidIdentifier,
    Unavailable { reason: String },
}

impl From<Authorization> for FfiAuthorization {
    fn from(auth: Authorization) -> Self {
        match auth {
            Authorization::Granted(id) => FfiAuthorization::Granted {
                doctor_hash: id.hash().short().to_string(),
            },
            Authorization::NotAuthorized => FfiAuthorization::NotAuthorized,
            Authorization::InvalidIdentifier => FfiAuthorization::InvalidIdentifier,
            Authorization::Unavailable { reason } => FfiAuthorization::Unavailable { reason },
        }
    }
}

/// FFI-safe label submission. `doctor_difficulty` accepts any spelling
/// [`Difficulty`] parses.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLabelSubmission {
    pub filename: String,
    pub doctor_difficulty: String,
    pub original_difficulty: String,
    pub seed: Option<i64>,
    pub ehr_text: String,
    pub metadata: HashMap<String, f64>,
}

impl TryFrom<FfiLabelSubmission> for LabelSubmission {
    type Error = ValidationError;

    fn try_from(sub: FfiLabelSubmission) -> Result<Self, Self::Error> {
        Ok(LabelSubmission {
            filename: sub.filename,
            doctor_difficulty: sub.doctor_difficulty.parse()?,
            original_difficulty: sub.original_difficulty,
            seed: sub.seed,
            ehr_text: sub.ehr_text,
            metadata: sub.metadata.into_iter().collect(),
        })
    }
}

/// FFI-safe stored label.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLabelRecord {
    pub filename: String,
    pub doctor_difficulty: String,
    pub timestamp: String,
    pub original_difficulty: String,
    pub seed: Option<i64>,
    pub ehr_text: String,
    pub metadata: HashMap<String, f64>,
}

impl FfiLabelRecord {
    fn new(filename: String, record: LabelRecord) -> Self {
        Self {
            filename,
            doctor_difficulty: record.doctor_difficulty.as_str().to_string(),
            timestamp: record.timestamp,
            original_difficulty: record.original_difficulty,
            seed: record.seed,
            ehr_text: record.ehr_text,
            metadata: record.metadata.into_iter().collect(),
        }
    }
}

/// FFI-safe progress.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProgress {
    pub labeled: u32,
    pub total: u32,
    pub fraction: f64,
}

impl From<Progress> for FfiProgress {
    fn from(progress: Progress) -> Self {
        Self {
            labeled: progress.labeled as u32,
            total: progress.total as u32,
            fraction: progress.fraction(),
        }
    }
}

/// FFI-safe per-level count.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDifficultyCount {
    pub difficulty: String,
    pub title: String,
    pub count: u32,
}
