//! Core data types for the task board.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A single unit of work on the board.
///
/// The serialized form is exactly `{ id, title, description, status, position }`.
/// Unknown or missing fields are rejected on deserialization so that a
/// persisted snapshot either restores completely or not at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// Unique identifier, assigned by the store on creation
    pub id: u64,

    /// Short description of the work
    pub title: String,

    /// Free-form body, not interpreted by the store
    pub description: String,

    /// Lane the task lives in
    pub status: String,

    /// Zero-based rank within the lane
    pub position: usize,
}

/// Task data without identity or position, as accepted by `TaskStore::add`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: status.into(),
        }
    }
}

impl Task {
    /// Copy of this task placed in another lane. The position is left as-is;
    /// the store recomputes it on move.
    pub fn with_status(&self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self.clone()
        }
    }
}

/// Violations of the collection invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two tasks share an id.
    DuplicateId(u64),
    /// A lane's positions do not cover `0..count` exactly once.
    PositionGap {
        lane: String,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::DuplicateId(id) => write!(f, "duplicate task id: {}", id),
            ValidationError::PositionGap { lane, expected, found } => {
                write!(
                    f,
                    "lane '{}' is not densely ordered: expected position {}, found {}",
                    lane, expected, found
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check that ids are unique and every lane is numbered `0..count` with no
/// gaps or duplicates.
pub fn validate_tasks(tasks: &[Task]) -> Result<(), ValidationError> {
    let mut ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !ids.insert(task.id) {
            return Err(ValidationError::DuplicateId(task.id));
        }
    }

    let mut lanes: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for task in tasks {
        lanes.entry(task.status.as_str()).or_default().push(task.position);
    }

    for (lane, mut positions) in lanes {
        positions.sort_unstable();
        for (expected, found) in positions.into_iter().enumerate() {
            if expected != found {
                return Err(ValidationError::PositionGap {
                    lane: lane.to_string(),
                    expected,
                    found,
                });
            }
        }
    }

    Ok(())
}
