//! Builder pattern API for adding tasks.

use crate::config::DEFAULT_LANE;
use crate::store::TaskStore;
use crate::types::{NewTask, Task};

/// Builder for adding tasks with a fluent API.
///
/// # Example
///
/// ```
/// use taskboard::{StoreBuilderExt, TaskStore};
///
/// let mut store = TaskStore::new();
/// let task = store.build("Write release notes")
///     .description("Cover the lane reorder fixes")
///     .lane("doing")
///     .add();
/// assert_eq!(task.position, 0);
/// ```
pub struct TaskBuilder<'a> {
    store: &'a mut TaskStore,
    title: String,
    description: String,
    status: String,
}

impl<'a> TaskBuilder<'a> {
    /// Create a new builder with the given title.
    pub fn new(store: &'a mut TaskStore, title: impl Into<String>) -> Self {
        Self {
            store,
            title: title.into(),
            description: String::new(),
            status: DEFAULT_LANE.to_string(),
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the lane the task is appended to.
    pub fn lane(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Append the task to its lane.
    pub fn add(self) -> Task {
        self.store.add(NewTask {
            title: self.title,
            description: self.description,
            status: self.status,
        })
    }
}

/// Extension trait to add builder method to TaskStore.
pub trait StoreBuilderExt {
    /// Start building a new task with the given title.
    fn build(&mut self, title: impl Into<String>) -> TaskBuilder<'_>;
}

impl StoreBuilderExt for TaskStore {
    fn build(&mut self, title: impl Into<String>) -> TaskBuilder<'_> {
        TaskBuilder::new(self, title)
    }
}
