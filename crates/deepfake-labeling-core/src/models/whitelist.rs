//! Whitelist snapshot model.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// The persisted whitelist document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Whitelist {
    /// Creation timestamp
    pub created: String,
    /// Number of entries in `whitelist`
    pub total_doctors: usize,
    /// Authorized identifiers, sorted
    pub whitelist: Vec<String>,
}

impl Whitelist {
    /// Build a snapshot from a deduplicated set, stamped with the current time.
    pub fn from_ids(ids: BTreeSet<String>) -> Self {
        let whitelist: Vec<String> = ids.into_iter().collect();
        Self {
            created: chrono::Utc::now().to_rfc3339(),
            total_doctors: whitelist.len(),
            whitelist,
        }
    }

    /// Check the document invariants. Returns a description of the first
    /// problem found.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.total_doctors != self.whitelist.len() {
            return Err(format!(
                "total_doctors is {} but the whitelist has {} entries",
                self.total_doctors,
                self.whitelist.len()
            ));
        }

        let mut seen = HashSet::with_capacity(self.whitelist.len());
        for (index, entry) in self.whitelist.iter().enumerate() {
            if entry.trim().is_empty() {
                return Err(format!("entry {} is blank", index + 1));
            }
            if entry.trim() != entry {
                return Err(format!("entry {} has surrounding whitespace", index + 1));
            }
            if !seen.insert(entry.as_str()) {
                return Err(format!("entry {} is a duplicate", index + 1));
            }
        }
        Ok(())
    }

    /// Whether the entries are in stored (sorted) order.
    pub fn is_sorted(&self) -> bool {
        self.whitelist.windows(2).all(|pair| pair[0] <= pair[1])
    }

    pub fn is_empty(&self) -> bool {
        self.whitelist.is_empty()
    }
}
