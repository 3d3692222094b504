//! Shared test infrastructure for taskboard integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use taskboard::{NewTask, Storage, Task, TaskStore};
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub storage: Storage,
    pub store: TaskStore,
}

impl TestEnv {
    /// Create a new test environment with an initialized, auto-saving board.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = Storage::init(temp_dir.path()).expect("Failed to init board");
        let store = storage.open_store().expect("Failed to open store");
        Self {
            temp_dir,
            storage,
            store,
        }
    }

    /// Add a task with an empty description.
    pub fn add(&mut self, title: &str, lane: &str) -> Task {
        self.store.add(NewTask::new(title, "", lane))
    }

    /// Re-read a task from the store.
    pub fn fetch(&self, task: &Task) -> Task {
        self.store.get(task.id).cloned().expect("Task vanished from store")
    }

    /// Move `task` into `lane`, in front of `before` if given.
    pub fn move_to(&mut self, task: &Task, lane: &str, before: Option<&Task>) -> Task {
        self.store
            .move_task(task.with_status(lane), before)
            .expect("Failed to move task")
    }

    /// Titles of a lane in position order.
    pub fn titles(&self, lane: &str) -> Vec<String> {
        self.store.tasks_in_lane(lane).into_iter().map(|t| t.title).collect()
    }

    /// Assert the density invariant and id uniqueness.
    pub fn assert_dense(&self) {
        if let Err(e) = self.store.verify() {
            panic!("Board invariant broken: {}. Tasks: {:?}", e, self.store.tasks());
        }
    }

    /// Assert that a lane holds exactly these titles, in order.
    pub fn assert_lane(&self, lane: &str, expected: &[&str]) {
        assert_eq!(self.titles(lane), expected, "Unexpected order in lane '{}'", lane);
        self.assert_dense();
    }

    /// Snapshot currently on disk.
    pub fn saved(&self) -> Vec<Task> {
        self.storage.load().expect("Failed to load snapshot")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
