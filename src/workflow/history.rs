//! History of completed runs, newest first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::RunState;
use crate::error::WorkflowError;

/// Completed run snapshots, most recent first. Unbounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<RunState>,
}

impl History {
    /// Prepends a snapshot.
    pub fn append(&mut self, snapshot: RunState) {
        self.entries.insert(0, snapshot);
    }

    /// Returns all snapshots, newest first.
    #[must_use]
    pub fn list(&self) -> &[RunState] {
        &self.entries
    }

    /// Returns the snapshot with the given id.
    #[must_use]
    pub fn select(&self, workflow_id: Uuid) -> Option<&RunState> {
        self.entries
            .iter()
            .find(|s| s.workflow_id == Some(workflow_id))
    }

    /// Looks up a snapshot by full id or unique id prefix.
    ///
    /// Prefixes are matched against the hyphenated and the simple form, case
    /// insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when nothing matches and
    /// [`WorkflowError::AmbiguousId`] when a prefix matches several entries.
    pub fn find(&self, ident: &str) -> Result<&RunState, WorkflowError> {
        let ident = ident.trim();
        if let Ok(id) = Uuid::parse_str(ident) {
            return self.select(id).ok_or_else(|| WorkflowError::NotFound {
                id: ident.to_string(),
            });
        }

        let needle = ident.to_ascii_lowercase();
        if needle.is_empty() {
            return Err(WorkflowError::NotFound { id: String::new() });
        }

        let matches: Vec<&RunState> = self
            .entries
            .iter()
            .filter(|s| {
                s.workflow_id.is_some_and(|id| {
                    id.hyphenated().to_string().starts_with(&needle)
                        || id.simple().to_string().starts_with(&needle)
                })
            })
            .collect();

        match matches.as_slice() {
            [] => Err(WorkflowError::NotFound {
                id: ident.to_string(),
            }),
            [only] => Ok(*only),
            many => Err(WorkflowError::AmbiguousId {
                prefix: ident.to_string(),
                matches: many.len(),
            }),
        }
    }

    /// Number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
