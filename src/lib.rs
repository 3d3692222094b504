//! Taskboard: lane-ordered tasks with dense per-lane positions.
//!
//! Tasks live in named lanes (`status`). Within a lane every task has a
//! zero-based `position`, and the store keeps those positions gap-free across
//! every add, remove and move, including moves between lanes.
//!
//! # Example
//!
//! ```
//! use taskboard::{NewTask, TaskStore};
//!
//! let mut store = TaskStore::new();
//! let a = store.add(NewTask::new("Design schema", "", "todo"));
//! let b = store.add(NewTask::new("Write migration", "", "todo"));
//! let c = store.add(NewTask::new("Ship it", "", "todo"));
//!
//! // Drop C in front of A.
//! store.move_task(c.clone(), Some(&a));
//! let order: Vec<_> = store.tasks_in_lane("todo").into_iter().map(|t| t.title).collect();
//! assert_eq!(order, ["Ship it", "Design schema", "Write migration"]);
//!
//! // Move B to another lane; the gap in "todo" closes.
//! store.move_task(b.with_status("doing"), None);
//! assert_eq!(store.lane_len("todo"), 2);
//! assert!(store.verify().is_ok());
//! ```

mod builder;
mod id;
mod store;
mod types;

pub mod client;
pub mod config;
pub mod daemon;
pub mod drag;
pub mod protocol;
pub mod storage;

// Re-export public API
pub use builder::{StoreBuilderExt, TaskBuilder};
pub use client::Client;
pub use config::BoardConfig;
pub use daemon::{Daemon, DaemonConfig, is_daemon_running};
pub use drag::DragTracker;
pub use protocol::{Request, Response};
pub use storage::Storage;
pub use store::{ChangeHook, TaskStore};
pub use types::{NewTask, Task, ValidationError, validate_tasks};
