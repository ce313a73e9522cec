//! Label records: one doctor's rating of one image.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Difficulty, ValidationError, ValidationResult};

/// A stored label, as written to the doctor's label document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabelRecord {
    /// Difficulty chosen by the doctor
    pub doctor_difficulty: Difficulty,
    /// Store-assigned submission time (RFC 3339, UTC)
    pub timestamp: String,
    /// Difficulty tier the dataset assigned to the image
    pub original_difficulty: String,
    /// Generation seed for synthetic images
    pub seed: Option<i64>,
    /// Record text shown next to the image
    pub ehr_text: String,
    /// Quality/realism scores copied from the dataset metadata
    pub metadata: BTreeMap<String, f64>,
}

/// What the caller supplies for one rating. The timestamp is never accepted
/// from the caller; the store stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSubmission {
    /// Image filename (record key)
    pub filename: String,
    /// Difficulty chosen by the doctor
    pub doctor_difficulty: Difficulty,
    /// Difficulty tier the dataset assigned to the image
    pub original_difficulty: String,
    /// Generation seed for synthetic images
    pub seed: Option<i64>,
    /// Record text shown next to the image
    pub ehr_text: String,
    /// Quality/realism scores copied from the dataset metadata
    pub metadata: BTreeMap<String, f64>,
}

impl LabelSubmission {
    /// Create a submission with no seed, text or metadata.
    pub fn new(filename: String, doctor_difficulty: Difficulty, original_difficulty: String) -> Self {
        Self {
            filename,
            doctor_difficulty,
            original_difficulty,
            seed: None,
            ehr_text: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Check the fields that the type system cannot.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.filename.trim().is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        if self.filename.trim() != self.filename {
            return Err(ValidationError::MalformedField {
                field: "filename".into(),
                reason: "surrounding whitespace".into(),
            });
        }
        for (key, value) in &self.metadata {
            if key.is_empty() {
                return Err(ValidationError::MalformedField {
                    field: "metadata".into(),
                    reason: "empty key".into(),
                });
            }
            // JSON has no representation for NaN or infinities
            if !value.is_finite() {
                return Err(ValidationError::MalformedField {
                    field: format!("metadata.{}", key),
                    reason: format!("non-finite value {}", value),
                });
            }
        }
        Ok(())
    }

    /// Turn the submission into a stored record with the given timestamp.
    pub fn into_record(self, timestamp: String) -> (String, LabelRecord) {
        let record = LabelRecord {
            doctor_difficulty: self.doctor_difficulty,
            timestamp,
            original_difficulty: self.original_difficulty,
            seed: self.seed,
            ehr_text: self.ehr_text,
            metadata: self.metadata,
        };
        (self.filename, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_submission() -> LabelSubmission {
        let mut submission =
            LabelSubmission::new("img1.png".into(), Difficulty::Hard, "medium".into());
        submission.seed = Some(42);
        submission.ehr_text = "65yo male, routine fundus exam.".into();
        submission.metadata.insert("scm_realism".into(), 0.82);
        submission
    }

    #[test]
    fn test_valid_submission() {
        assert!(make_submission().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_filename() {
        let mut submission = make_submission();
        submission.filename = "  ".into();
        assert!(matches!(
            submission.validate(),
            Err(ValidationError::EmptyFilename)
        ));
    }

    #[test]
    fn test_rejects_non_finite_metadata() {
        let mut submission = make_submission();
        submission.metadata.insert("scm_noise_cv".into(), f64::NAN);
        let err = submission.validate().unwrap_err();
        assert!(err.to_string().contains("metadata.scm_noise_cv"));
    }

    #[test]
    fn test_into_record() {
        let (filename, record) = make_submission().into_record("2026-01-01T00:00:00Z".into());
        assert_eq!(filename, "img1.png");
        assert_eq!(record.doctor_difficulty, Difficulty::Hard);
        assert_eq!(record.seed, Some(42));
        assert_eq!(record.metadata["scm_realism"], 0.82);
    }

    #[test]
    fn test_record_document_shape() {
        let (_, record) = make_submission().into_record("2026-01-01T00:00:00Z".into());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["doctor_difficulty"], "hard");
        assert_eq!(value["original_difficulty"], "medium");
        assert_eq!(value["seed"], 42);
        assert_eq!(value["metadata"]["scm_realism"], 0.82);

        // Unknown fields are malformed data, not silently ignored
        let mut extra = value.clone();
        extra["surprise"] = serde_json::json!(true);
        assert!(serde_json::from_value::<LabelRecord>(extra).is_err());
    }
}
