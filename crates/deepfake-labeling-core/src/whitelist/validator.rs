//! Whitelist membership checks.

use std::collections::HashSet;
use std::path::Path;

use crate::models::{DoctorId, Whitelist};

use super::{load_whitelist, WhitelistError};

/// Outcome of checking a candidate doctor ID.
#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    /// The ID is on the whitelist
    Granted(DoctorId),
    /// Well-formed ID that is not on the whitelist
    NotAuthorized,
    /// Blank ID
    InvalidIdentifier,
    /// The whitelist could not be loaded; nobody can be authorized
    Unavailable { reason: String },
}

impl Authorization {
    pub fn is_granted(&self) -> bool {
        matches!(self, Authorization::Granted(_))
    }
}

#[derive(Debug)]
enum Snapshot {
    Loaded { ids: HashSet<String>, created: String },
    Unavailable(String),
}

/// Immutable whitelist snapshot, loaded once per process.
///
/// A validator that failed to load stays usable: every check fails closed
/// with [`Authorization::Unavailable`].
#[derive(Debug)]
pub struct WhitelistValidator {
    snapshot: Snapshot,
}

impl WhitelistValidator {
    /// Load the whitelist at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match load_whitelist(path) {
            Ok(whitelist) => {
                let validator = Self::from_whitelist(whitelist);
                if let Some(count) = validator.authorized_count() {
                    tracing::info!(path = %path.display(), count, "whitelist loaded");
                }
                validator
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "whitelist unavailable");
                Self::unavailable(e)
            }
        }
    }

    /// Build from an in-memory snapshot.
    pub fn from_whitelist(whitelist: Whitelist) -> Self {
        if let Err(reason) = whitelist.check_invariants() {
            return Self::unavailable(WhitelistError::Malformed(reason));
        }
        if whitelist.is_empty() {
            return Self::unavailable(WhitelistError::Empty);
        }
        Self {
            snapshot: Snapshot::Loaded {
                ids: whitelist.whitelist.into_iter().collect(),
                created: whitelist.created,
            },
        }
    }

    fn unavailable(error: WhitelistError) -> Self {
        Self {
            snapshot: Snapshot::Unavailable(error.to_string()),
        }
    }

    /// Check a candidate. Trims surrounding whitespace, then requires an
    /// exact, case-sensitive match.
    pub fn check(&self, candidate: &str) -> Authorization {
        let ids = match &self.snapshot {
            Snapshot::Loaded { ids, .. } => ids,
            Snapshot::Unavailable(reason) => {
                return Authorization::Unavailable {
                    reason: reason.clone(),
                }
            }
        };

        let Ok(id) = DoctorId::parse(candidate) else {
            return Authorization::InvalidIdentifier;
        };

        if ids.contains(id.as_str()) {
            Authorization::Granted(id)
        } else {
            Authorization::NotAuthorized
        }
    }

    /// Fail-closed boolean form of [`check`](Self::check).
    pub fn is_authorized(&self, candidate: &str) -> bool {
        self.check(candidate).is_granted()
    }

    pub fn is_available(&self) -> bool {
        matches!(self.snapshot, Snapshot::Loaded { .. })
    }

    /// Why the whitelist is unavailable, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.snapshot {
            Snapshot::Unavailable(reason) => Some(reason),
            Snapshot::Loaded { .. } => None,
        }
    }

    /// Number of authorized doctors, for the pre-login banner.
    pub fn authorized_count(&self) -> Option<usize> {
        match &self.snapshot {
            Snapshot::Loaded { ids, .. } => Some(ids.len()),
            Snapshot::Unavailable(_) => None,
        }
    }

    /// Creation timestamp of the loaded snapshot.
    pub fn created(&self) -> Option<&str> {
        match &self.snapshot {
            Snapshot::Loaded { created, .. } => Some(created),
            Snapshot::Unavailable(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn validator(ids: &[&str]) -> WhitelistValidator {
        let ids: BTreeSet<String> = ids.iter().map(|s| s.to_string()).collect();
        WhitelistValidator::from_whitelist(Whitelist::from_ids(ids))
    }

    #[test]
    fn test_exact_match_is_granted() {
        let v = validator(&["DOC1234", "MD5555"]);
        assert!(v.is_authorized("DOC1234"));
        assert!(v.is_authorized("  MD5555 "));
        assert!(matches!(v.check("DOC1234"), Authorization::Granted(id) if id.as_str() == "DOC1234"));
    }

    #[test]
    fn test_case_sensitive() {
        let v = validator(&["DOC1234"]);
        assert!(!v.is_authorized("doc1234"));
        assert_eq!(v.check("doc1234"), Authorization::NotAuthorized);
    }

    #[test]
    fn test_blank_candidate() {
        let v = validator(&["DOC1234"]);
        assert_eq!(v.check("   "), Authorization::InvalidIdentifier);
        assert!(!v.is_authorized(""));
    }

    #[test]
    fn test_missing_file_is_unavailable_not_unauthorized() {
        let dir = tempfile::TempDir::new().unwrap();
        let v = WhitelistValidator::load(dir.path().join("doctor_whitelist.json"));

        assert!(!v.is_available());
        assert!(!v.is_authorized("DOC1234"));
        assert!(matches!(v.check("DOC1234"), Authorization::Unavailable { .. }));
        assert!(v.unavailable_reason().unwrap().contains("not found"));
        assert_eq!(v.authorized_count(), None);
    }

    #[test]
    fn test_empty_whitelist_is_unavailable() {
        let v = validator(&[]);
        assert!(matches!(v.check("DOC1"), Authorization::Unavailable { .. }));
    }

    #[test]
    fn test_malformed_snapshot_is_unavailable() {
        let v = WhitelistValidator::from_whitelist(Whitelist {
            created: "2026-01-01T00:00:00Z".into(),
            total_doctors: 5,
            whitelist: vec!["DOC1".into()],
        });
        assert!(!v.is_available());
    }

    #[test]
    fn test_counts() {
        let v = validator(&["A", "B", "C"]);
        assert_eq!(v.authorized_count(), Some(3));
        assert!(v.created().is_some());
    }

    proptest! {
        #[test]
        fn prop_only_members_are_authorized(
            members in proptest::collection::btree_set("[A-Za-z0-9]{1,8}", 1..10),
            candidate in "[A-Za-z0-9]{1,8}",
        ) {
            let v = WhitelistValidator::from_whitelist(Whitelist::from_ids(members.clone()));
            prop_assert_eq!(v.is_authorized(&candidate), members.contains(&candidate));
            for member in &members {
                prop_assert!(v.is_authorized(member));
            }
        }
    }
}
