//! Whitelist generation from manual entry, patterns and imported files.

use std::collections::BTreeSet;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use crate::models::Whitelist;

use super::{expand_pattern, first_column, DEFAULT_PATTERN};

/// Pattern draws allowed per requested ID before giving up on duplicates.
const ATTEMPTS_PER_ID: usize = 10;

/// Generator errors.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("No doctor IDs were collected because no input source was given")]
    NoSources,
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Where a batch of IDs came from.
#[derive(Debug, Clone, PartialEq)]
pub enum IdSource {
    Interactive,
    Pattern { pattern: String, count: usize },
    TextFile(PathBuf),
    CsvFile(PathBuf),
}

impl fmt::Display for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdSource::Interactive => write!(f, "interactive entry"),
            IdSource::Pattern { pattern, count } => {
                write!(f, "{} random IDs with pattern {}", count, pattern)
            }
            IdSource::TextFile(path) => write!(f, "text file {}", path.display()),
            IdSource::CsvFile(path) => write!(f, "CSV file {}", path.display()),
        }
    }
}

/// Result of processing one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub source: IdSource,
    /// New IDs added to the whitelist
    pub added: usize,
    /// Duplicates and blank entries that were dropped
    pub skipped: usize,
    /// Why the source failed or fell short, if it did
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: IdSource) -> Self {
        Self {
            source,
            added: 0,
            skipped: 0,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Which sources to read, applied in a fixed order: interactive entry,
/// pattern generation, text files, CSV files.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorRequest {
    pub interactive: bool,
    pub random_count: Option<usize>,
    pub pattern: String,
    pub text_files: Vec<PathBuf>,
    pub csv_files: Vec<PathBuf>,
}

impl Default for GeneratorRequest {
    fn default() -> Self {
        Self {
            interactive: false,
            random_count: None,
            pattern: DEFAULT_PATTERN.to_string(),
            text_files: Vec::new(),
            csv_files: Vec::new(),
        }
    }
}

impl GeneratorRequest {
    /// Whether any source was selected.
    pub fn has_sources(&self) -> bool {
        self.interactive
            || self.random_count.is_some()
            || !self.text_files.is_empty()
            || !self.csv_files.is_empty()
    }
}

/// Final state of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutcome {
    /// At least one ID was collected
    Built(Whitelist),
    /// Sources were read but yielded nothing; nothing should be written
    Empty,
}

/// Accumulates IDs from any number of sources into a sorted, deduplicated set.
#[derive(Debug, Default)]
pub struct WhitelistGenerator {
    ids: BTreeSet<String>,
    reports: Vec<SourceReport>,
}

impl WhitelistGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one ID. Returns false if it was blank or already present.
    pub fn add_doctor_id(&mut self, candidate: &str) -> bool {
        let trimmed = candidate.trim();
        !trimmed.is_empty() && self.ids.insert(trimmed.to_string())
    }

    /// Run every source selected by `request`, in the fixed source order.
    ///
    /// `input`/`prompt` are only touched when interactive entry is requested.
    pub fn collect<I, O, R>(
        &mut self,
        request: &GeneratorRequest,
        input: I,
        prompt: O,
        rng: &mut R,
    ) where
        I: BufRead,
        O: Write,
        R: Rng,
    {
        if request.interactive {
            self.collect_interactive(input, prompt);
        }
        if let Some(count) = request.random_count {
            self.collect_generated(count, &request.pattern, rng);
        }
        for path in &request.text_files {
            self.collect_text_file(path);
        }
        for path in &request.csv_files {
            self.collect_csv_file(path);
        }
    }

    /// Read IDs line by line until an empty line or end of input.
    pub fn collect_interactive<I: BufRead, O: Write>(
        &mut self,
        mut input: I,
        mut prompt: O,
    ) -> &SourceReport {
        let mut report = SourceReport::new(IdSource::Interactive);
        let mut line = String::new();

        loop {
            let _ = write!(prompt, "Enter Doctor ID (or press Enter to finish): ");
            let _ = prompt.flush();

            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    report.error = Some(format!("cannot read input: {}", e));
                    break;
                }
            }

            let id = line.trim();
            if id.is_empty() {
                break;
            }
            if self.add_doctor_id(id) {
                report.added += 1;
                let _ = writeln!(prompt, "Added: {}", id);
            } else {
                report.skipped += 1;
                let _ = writeln!(prompt, "Skipped (duplicate): {}", id);
            }
        }

        self.push_report(report)
    }

    /// Generate `count` new unique IDs from `pattern`.
    pub fn collect_generated<R: Rng>(
        &mut self,
        count: usize,
        pattern: &str,
        rng: &mut R,
    ) -> &SourceReport {
        let mut report = SourceReport::new(IdSource::Pattern {
            pattern: pattern.to_string(),
            count,
        });

        let max_attempts = count.saturating_mul(ATTEMPTS_PER_ID);
        let mut attempts = 0;
        while report.added < count && attempts < max_attempts {
            attempts += 1;
            if self.add_doctor_id(&expand_pattern(pattern, rng)) {
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }

        if report.added < count {
            report.error = Some(format!(
                "pattern exhausted after {} attempts: generated {} of {} unique IDs",
                attempts, report.added, count
            ));
        }
        self.push_report(report)
    }

    /// Import IDs from a text file, one per line.
    pub fn collect_text_file(&mut self, path: &Path) -> &SourceReport {
        let mut report = SourceReport::new(IdSource::TextFile(path.to_path_buf()));
        match std::fs::read_to_string(path) {
            Ok(text) => {
                for line in text.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.tally(line, &mut report);
                }
            }
            Err(e) => report.error = Some(e.to_string()),
        }
        self.push_report(report)
    }

    /// Import IDs from the first column of a CSV file, skipping the header row.
    pub fn collect_csv_file(&mut self, path: &Path) -> &SourceReport {
        let mut report = SourceReport::new(IdSource::CsvFile(path.to_path_buf()));
        match std::fs::read_to_string(path) {
            Ok(text) => {
                for field in first_column(&text).iter().skip(1) {
                    self.tally(field, &mut report);
                }
            }
            Err(e) => report.error = Some(e.to_string()),
        }
        self.push_report(report)
    }

    fn tally(&mut self, candidate: &str, report: &mut SourceReport) {
        if self.add_doctor_id(candidate) {
            report.added += 1;
        } else {
            report.skipped += 1;
        }
    }

    fn push_report(&mut self, report: SourceReport) -> &SourceReport {
        if let Some(error) = &report.error {
            tracing::warn!(source = %report.source, %error, "whitelist source failed");
        } else {
            tracing::info!(source = %report.source, added = report.added, "whitelist source read");
        }
        self.reports.push(report);
        &self.reports[self.reports.len() - 1]
    }

    /// IDs collected so far, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// One report per attempted source, in processing order.
    pub fn reports(&self) -> &[SourceReport] {
        &self.reports
    }

    /// Produce the snapshot. Fails only if nothing was collected and no
    /// source was attempted.
    pub fn finish(self) -> GeneratorResult<GeneratorOutcome> {
        if !self.ids.is_empty() {
            return Ok(GeneratorOutcome::Built(Whitelist::from_ids(self.ids)));
        }
        if self.reports.is_empty() {
            return Err(GeneratorError::NoSources);
        }
        Ok(GeneratorOutcome::Empty)
    }
}
