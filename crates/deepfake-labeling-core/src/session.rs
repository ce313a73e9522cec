//! Labeling sessions: authenticate once, then submit labels.
//!
//! [`LabelingService`] is built once per process from a [`LabelingConfig`]
//! and holds the immutable whitelist snapshot. Each successful login gets a
//! [`Session`] bound to that doctor's label store.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::LabelingConfig;
use crate::models::{Difficulty, DoctorHash, LabelRecord, LabelSubmission, ValidationError};
use crate::store::{
    JsonFileBackend, LabelBackend, LabelDocument, LabelStore, Progress, StoreError, StoreListing,
    StoreWarning,
};
use crate::whitelist::{Authorization, WhitelistValidator};

/// Errors surfaced at session start and submission time.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operator problem: whitelist missing/corrupt or labels directory unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Doctor ID is not authorized")]
    NotAuthorized,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SessionError {
    /// Message safe to show the doctor.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Configuration(_) => {
                "Authorization is currently unavailable. Please contact the administrator.".into()
            }
            SessionError::Validation(ValidationError::EmptyIdentifier) => {
                "Please enter your Doctor ID.".into()
            }
            SessionError::Validation(e) => format!("The label could not be saved: {}.", e),
            SessionError::NotAuthorized => {
                "Invalid Doctor ID. Please contact the administrator for access.".into()
            }
            SessionError::Storage(_) => {
                "Your label could not be saved. Please try again or contact the administrator."
                    .into()
            }
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => SessionError::Validation(v),
            StoreError::NotWritable { .. } => SessionError::Configuration(e.to_string()),
            other => SessionError::Storage(other.to_string()),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Process-wide entry point.
pub struct LabelingService {
    validator: WhitelistValidator,
    backend: JsonFileBackend,
    storage_problem: Option<String>,
}

impl LabelingService {
    /// Load the whitelist and prepare the labels directory.
    ///
    /// Never fails: configuration problems are reported through
    /// [`configuration_problems`](Self::configuration_problems) and every
    /// login attempt returns [`SessionError::Configuration`].
    pub fn new(config: LabelingConfig) -> Self {
        let validator = WhitelistValidator::load(&config.whitelist_path);
        let backend = JsonFileBackend::new(config.labels_dir);
        Self::from_parts(validator, backend)
    }

    /// Build from an already-loaded validator.
    pub fn from_parts(validator: WhitelistValidator, backend: JsonFileBackend) -> Self {
        let storage_problem = match backend.ensure_writable() {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(error = %e, "labels directory unusable");
                Some(e.to_string())
            }
        };
        Self {
            validator,
            backend,
            storage_problem,
        }
    }

    pub fn validator(&self) -> &WhitelistValidator {
        &self.validator
    }

    pub fn authorize(&self, candidate: &str) -> Authorization {
        self.validator.check(candidate)
    }

    /// Operator-facing descriptions of anything preventing logins.
    pub fn configuration_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Some(reason) = self.validator.unavailable_reason() {
            problems.push(reason.to_string());
        }
        if let Some(reason) = &self.storage_problem {
            problems.push(reason.clone());
        }
        problems
    }

    /// Authenticate `candidate` and open that doctor's label store.
    pub fn start_session(&self, candidate: &str) -> SessionResult<Session> {
        let doctor = match self.validator.check(candidate) {
            Authorization::Granted(doctor) => doctor,
            Authorization::NotAuthorized => {
                tracing::warn!("login rejected: doctor ID not on whitelist");
                return Err(SessionError::NotAuthorized);
            }
            Authorization::InvalidIdentifier => {
                return Err(SessionError::Validation(ValidationError::EmptyIdentifier))
            }
            Authorization::Unavailable { reason } => {
                return Err(SessionError::Configuration(reason))
            }
        };

        if let Some(reason) = &self.storage_problem {
            return Err(SessionError::Configuration(reason.clone()));
        }

        let store = LabelStore::open(self.backend.clone(), &doctor)?;
        tracing::info!(doctor = %doctor, resumed = store.len(), "session started");
        Ok(Session { store })
    }

    /// Every doctor's store with its record count. Administrative use only.
    pub fn list_label_stores(&self) -> SessionResult<Vec<StoreListing>> {
        Ok(self.backend.list()?)
    }
}

/// One authenticated doctor's labeling session.
#[derive(Debug)]
pub struct Session {
    store: LabelStore<JsonFileBackend>,
}

impl Session {
    pub fn doctor_hash(&self) -> &DoctorHash {
        self.store.doctor()
    }

    /// Validate, stamp and persist a label.
    pub fn submit(&mut self, submission: LabelSubmission) -> SessionResult<LabelRecord> {
        Ok(self.store.upsert(submission)?.clone())
    }

    pub fn progress(&mut self, total_images: usize) -> SessionResult<Progress> {
        Ok(self.store.progress(total_images)?)
    }

    /// Problems found while loading saved labels.
    pub fn warnings(&self) -> &[StoreWarning] {
        self.store.warnings()
    }

    pub fn labels(&self) -> &LabelDocument {
        self.store.records()
    }

    pub fn summary(&self) -> BTreeMap<Difficulty, usize> {
        self.store.difficulty_counts()
    }

    pub fn recent(&self, limit: usize) -> Vec<(&str, &LabelRecord)> {
        self.store.recent(limit)
    }

    pub fn next_unlabeled<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.store.next_unlabeled(candidates)
    }

    pub fn store(&self) -> &LabelStore<JsonFileBackend> {
        &self.store
    }
}
