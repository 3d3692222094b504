//! IPC protocol types for daemon communication.

use crate::types::{NewTask, Task};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request sent from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Append a task to its lane.
    Add { task: NewTask },

    /// Remove a task by ID.
    Remove { id: u64 },

    /// Move a task, optionally in front of a target task.
    Move { task: Task, target: Option<Task> },

    /// Get a task by ID.
    Get { id: u64 },

    /// List tasks, all or one lane sorted by position.
    List { lane: Option<String> },

    /// Every lane with its sorted tasks.
    Lanes,

    /// Force flush pending writes to disk.
    Flush,

    /// Shutdown the daemon.
    Shutdown,

    /// Ping to check if daemon is alive.
    Ping,
}

/// Response sent from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Single task response.
    Task { task: Task },

    /// Multiple tasks response.
    Tasks { tasks: Vec<Task> },

    /// Tasks grouped by lane.
    Lanes { lanes: BTreeMap<String, Vec<Task>> },

    /// Task not found.
    NotFound { id: u64 },

    /// Operation succeeded.
    Ok,

    /// Pong response to ping.
    Pong,

    /// Error response.
    Error { message: String },
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
