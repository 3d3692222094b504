//! Drag-and-drop hover tracking.
//!
//! Sits outside the store: it remembers which task is being dragged and what
//! it hovers over, debounces leave events, and turns a drop into a single
//! `TaskStore::move_task` call. Time is passed in by the caller so the state
//! machine stays deterministic.

use crate::store::TaskStore;
use crate::types::Task;
use std::time::{Duration, Instant};

/// Delay before a leave event clears the hover highlight.
pub const LEAVE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Hover state of an in-flight drag.
#[derive(Debug, Default)]
pub struct DragTracker {
    dragged: Option<Task>,
    over_task: Option<Task>,
    over_column: Option<String>,
    task_clear_at: Option<Instant>,
    column_clear_at: Option<Instant>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging `task`.
    pub fn start(&mut self, task: Task) {
        log::debug!("drag start: task {}", task.id);
        self.dragged = Some(task);
        self.over_task = None;
        self.over_column = None;
    }

    /// Abandon the drag and drop all pending clears.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    /// Pointer entered another task's card.
    pub fn task_over(&mut self, task: &Task) {
        match &self.dragged {
            Some(dragged) if dragged.id != task.id => {
                self.task_clear_at = None;
                self.over_task = Some(task.clone());
                self.over_column = None;
            }
            _ => {}
        }
    }

    /// Pointer left a task's card. The highlight clears after
    /// [`LEAVE_DEBOUNCE`] unless another hover arrives first.
    pub fn task_leave(&mut self, now: Instant) {
        self.task_clear_at = Some(now + LEAVE_DEBOUNCE);
    }

    /// Pointer is over a lane. Only highlights the lane when no task is
    /// hovered.
    pub fn column_over(&mut self, status: &str) {
        self.task_clear_at = None;
        self.column_clear_at = None;

        if self.over_task.is_none() {
            self.over_column = Some(status.to_string());
        }
    }

    /// Pointer left a lane's container.
    pub fn column_leave(&mut self, now: Instant) {
        self.column_clear_at = Some(now + LEAVE_DEBOUNCE);
    }

    /// Apply every debounced clear that is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.task_clear_at.is_some_and(|at| at <= now) {
            self.task_clear_at = None;
            self.over_task = None;
        }
        if self.column_clear_at.is_some_and(|at| at <= now) {
            self.column_clear_at = None;
            self.over_column = None;
        }
    }

    /// Drop the dragged task into `status`: before the hovered task if there
    /// is one, otherwise at the end of the lane. Ends the drag either way.
    pub fn drop_on(&mut self, status: &str, now: Instant, store: &mut TaskStore) -> Option<Task> {
        self.tick(now);

        let placed = self.dragged.as_ref().and_then(|dragged| {
            let updated = dragged.with_status(status);
            store.move_task(updated, self.over_task.as_ref())
        });

        self.end();
        placed
    }

    pub fn dragged(&self) -> Option<&Task> {
        self.dragged.as_ref()
    }

    pub fn over_task(&self) -> Option<&Task> {
        self.over_task.as_ref()
    }

    pub fn over_column(&self) -> Option<&str> {
        self.over_column.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }
}
