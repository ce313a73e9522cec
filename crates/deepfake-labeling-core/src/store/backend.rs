//! Storage backend seam for label documents.

use std::collections::BTreeMap;

use crate::models::{DoctorHash, LabelRecord};

use super::StoreResult;

/// One doctor's full label set, keyed by image filename.
pub type LabelDocument = BTreeMap<String, LabelRecord>;

/// What a backend found when asked for a doctor's document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Nothing stored yet
    Missing,
    Loaded(LabelDocument),
    /// Something is stored but cannot be read or parsed
    Corrupt { reason: String },
}

/// Administrative view of one stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreListing {
    pub doctor: DoctorHash,
    /// `None` when the document is unreadable
    pub record_count: Option<usize>,
}

/// Where label documents live. Implementations replace whole documents
/// atomically; they never merge.
pub trait LabelBackend {
    /// Fetch the stored document.
    fn load(&self, doctor: &DoctorHash) -> StoreResult<LoadOutcome>;

    /// Replace the stored document.
    fn save(&self, doctor: &DoctorHash, document: &LabelDocument) -> StoreResult<()>;

    /// Move an unreadable document aside. Returns its new location, or `None`
    /// if there was nothing to move.
    fn quarantine(&self, doctor: &DoctorHash) -> StoreResult<Option<String>>;

    /// Human-readable location of a doctor's document, for warnings.
    fn location(&self, doctor: &DoctorHash) -> String;

    /// Every stored document with its record count.
    fn list(&self) -> StoreResult<Vec<StoreListing>>;
}

impl<B: LabelBackend + ?Sized> LabelBackend for &B {
    fn load(&self, doctor: &DoctorHash) -> StoreResult<LoadOutcome> {
        (**self).load(doctor)
    }

    fn save(&self, doctor: &DoctorHash, document: &LabelDocument) -> StoreResult<()> {
        (**self).save(doctor, document)
    }

    fn quarantine(&self, doctor: &DoctorHash) -> StoreResult<Option<String>> {
        (**self).quarantine(doctor)
    }

    fn location(&self, doctor: &DoctorHash) -> String {
        (**self).location(doctor)
    }

    fn list(&self) -> StoreResult<Vec<StoreListing>> {
        (**self).list()
    }
}
