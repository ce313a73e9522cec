//! A doctor's label set with upsert and resume semantics.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{Difficulty, DoctorHash, DoctorId, LabelRecord, LabelSubmission};

use super::{LabelBackend, LabelDocument, LoadOutcome, StoreResult, StoreWarning};

/// Labeling progress against the dataset the caller is presenting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub labeled: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share in `[0, 1]`; zero when there is nothing to label.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.labeled as f64 / self.total as f64).min(1.0)
    }
}

/// One doctor's labels, loaded whole and written back whole after every change.
///
/// Opening never creates anything on disk; the document appears with the
/// first successful [`upsert`](Self::upsert).
#[derive(Debug)]
pub struct LabelStore<B: LabelBackend> {
    backend: B,
    doctor: DoctorHash,
    records: LabelDocument,
    warnings: Vec<StoreWarning>,
}

impl<B: LabelBackend> LabelStore<B> {
    /// Open the store for an authorized doctor, resuming any saved labels.
    ///
    /// An unreadable document is not an error: the store starts empty and a
    /// [`StoreWarning`] is recorded.
    pub fn open(backend: B, doctor: &DoctorId) -> StoreResult<Self> {
        let mut store = Self {
            backend,
            doctor: doctor.hash(),
            records: LabelDocument::new(),
            warnings: Vec::new(),
        };
        if let Some(document) = store.fetch()? {
            store.records = document;
        }
        tracing::info!(
            doctor = store.doctor.short(),
            records = store.records.len(),
            "label store opened"
        );
        Ok(store)
    }

    /// Read the persisted document. Corrupt documents are quarantined and
    /// reported as absent.
    fn fetch(&mut self) -> StoreResult<Option<LabelDocument>> {
        match self.backend.load(&self.doctor)? {
            LoadOutcome::Loaded(document) => Ok(Some(document)),
            LoadOutcome::Missing => Ok(None),
            LoadOutcome::Corrupt { reason } => {
                let location = self.backend.location(&self.doctor);
                let quarantined_to = match self.backend.quarantine(&self.doctor) {
                    Ok(moved) => moved,
                    Err(e) => {
                        tracing::error!(doctor = self.doctor.short(), error = %e, "cannot quarantine label store");
                        None
                    }
                };
                let warning = StoreWarning::Corrupt {
                    location,
                    reason,
                    quarantined_to,
                };
                tracing::warn!(doctor = self.doctor.short(), %warning, "label store unreadable");
                self.warnings.push(warning);
                Ok(None)
            }
        }
    }

    /// Insert or replace the label for `submission.filename` and persist.
    ///
    /// The on-disk document is re-read first so labels written by another
    /// session since this one loaded are kept. Nothing changes if validation
    /// or the write fails.
    pub fn upsert(&mut self, submission: LabelSubmission) -> StoreResult<&LabelRecord> {
        submission.validate()?;

        let mut document = match self.fetch()? {
            Some(document) => document,
            None => self.records.clone(),
        };

        let timestamp = next_timestamp(document.get(&submission.filename));
        let (filename, record) = submission.into_record(timestamp);
        document.insert(filename.clone(), record);

        self.backend.save(&self.doctor, &document)?;
        self.records = document;
        tracing::info!(doctor = self.doctor.short(), %filename, "label saved");

        Ok(&self.records[&filename])
    }

    /// Replace the in-memory view with what is persisted now.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.records = self.fetch()?.unwrap_or_default();
        Ok(())
    }

    /// Labeled count against `total_images`, from the persisted state.
    pub fn progress(&mut self, total_images: usize) -> StoreResult<Progress> {
        self.reload()?;
        Ok(Progress {
            labeled: self.records.len(),
            total: total_images,
        })
    }

    pub fn doctor(&self) -> &DoctorHash {
        &self.doctor
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Warnings raised since the store was opened.
    pub fn warnings(&self) -> &[StoreWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<StoreWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn get(&self, filename: &str) -> Option<&LabelRecord> {
        self.records.get(filename)
    }

    pub fn is_labeled(&self, filename: &str) -> bool {
        self.records.contains_key(filename)
    }

    /// All records, keyed by filename.
    pub fn records(&self) -> &LabelDocument {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First candidate filename without a label, in the caller's order.
    pub fn next_unlabeled<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .find(|filename| !self.records.contains_key(*filename))
    }

    /// How many images were given each rating.
    pub fn difficulty_counts(&self) -> BTreeMap<Difficulty, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            *counts.entry(record.doctor_difficulty).or_insert(0) += 1;
        }
        counts
    }

    /// The `limit` most recently submitted labels, newest first.
    pub fn recent(&self, limit: usize) -> Vec<(&str, &LabelRecord)> {
        let mut entries: Vec<(&str, &LabelRecord)> = self
            .records
            .iter()
            .map(|(filename, record)| (filename.as_str(), record))
            .collect();
        entries.sort_by(|(name_a, a), (name_b, b)| {
            parse_timestamp(&b.timestamp)
                .cmp(&parse_timestamp(&a.timestamp))
                .then_with(|| name_a.cmp(name_b))
        });
        entries.truncate(limit);
        entries
    }
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Current time, or the previous record's time if the clock went backwards,
/// so a filename's timestamp never decreases.
fn next_timestamp(previous: Option<&LabelRecord>) -> String {
    let now = Utc::now();
    let stamp = previous
        .and_then(|record| parse_timestamp(&record.timestamp))
        .filter(|prior| *prior > now)
        .unwrap_or(now);
    stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
