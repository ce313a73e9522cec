//! Doctor identifier models.

use std::fmt;

use sha2::{Digest, Sha256};

use super::{ValidationError, ValidationResult};

/// Domain prefix mixed into every identifier hash.
const DOCTOR_ID_HASH_DOMAIN: &[u8] = b"deepfake-labeling/doctor-id/v1";

/// Number of hex chars shown in logs and the UI.
const SHORT_HASH_LEN: usize = 16;

/// A validated doctor identifier.
///
/// Identifiers are opaque and case-sensitive. The raw value is only reachable
/// through [`DoctorId::as_str`]; `Debug` and `Display` print the short hash so
/// identifiers do not leak into logs by accident.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DoctorId(String);

impl DoctorId {
    /// Trim the candidate and reject it if nothing is left.
    pub fn parse(candidate: &str) -> ValidationResult<Self> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw identifier, for whitelist membership checks only.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// One-way storage key for this identifier.
    pub fn hash(&self) -> DoctorHash {
        DoctorHash::of(self)
    }
}

impl fmt::Debug for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoctorId({})", self.hash().short())
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hash().short())
    }
}

/// SHA-256 derivation of a doctor identifier, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoctorHash(String);

impl DoctorHash {
    /// Hash a validated identifier.
    pub fn of(id: &DoctorId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOCTOR_ID_HASH_DOMAIN);
        hasher.update([0u8]);
        hasher.update(id.as_str().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Accept an already-derived hash (e.g. recovered from a store filename).
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let is_digest = hex_str.len() == 64
            && hex_str
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        is_digest.then(|| Self(hex_str.to_string()))
    }

    /// Full 64-char digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading 16 hex chars, for display.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_HASH_LEN]
    }
}

impl fmt::Display for DoctorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
