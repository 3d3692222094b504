//! The ordered task store.
//!
//! Owns the canonical task collection and keeps every lane densely numbered
//! `0..count` across `add`, `remove` and `move_task`.

use crate::id::next_id;
use crate::types::{NewTask, Task, ValidationError, validate_tasks};
use std::collections::BTreeMap;

/// Callback invoked with the canonical collection after a mutation commits.
pub type ChangeHook = Box<dyn FnMut(&[Task]) + Send>;

/// The board's single source of truth.
#[derive(Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    hook: Option<ChangeHook>,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a restored collection.
    ///
    /// The collection must already satisfy the density invariant; see
    /// [`TaskStore::verify`].
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks, hook: None }
    }

    /// Register the post-mutation hook, replacing any previous one.
    pub fn on_change(&mut self, hook: impl FnMut(&[Task]) + Send + 'static) {
        self.hook = Some(Box::new(hook));
    }

    /// Append a task to the end of its lane.
    pub fn add(&mut self, task: NewTask) -> Task {
        let created = Task {
            id: next_id(&self.tasks),
            position: self.lane_len(&task.status),
            title: task.title,
            description: task.description,
            status: task.status,
        };

        log::debug!(
            "add: task {} -> {}[{}]",
            created.id,
            created.status,
            created.position
        );
        self.tasks.push(created.clone());
        self.notify();

        created
    }

    /// Delete a task and close the gap it leaves in its lane.
    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let index = self.index_of(id)?;
        let removed = self.tasks.remove(index);

        for task in &mut self.tasks {
            if task.status == removed.status && task.position > removed.position {
                task.position -= 1;
            }
        }

        log::debug!(
            "remove: task {} from {}[{}]",
            removed.id,
            removed.status,
            removed.position
        );
        self.notify();

        Some(removed)
    }

    /// Move `updated` to its (possibly new) lane, immediately before `target`
    /// or at the end of the lane when there is no target.
    ///
    /// `updated` carries the destination `status` and replaces the stored
    /// record; its `position` is ignored. A target is looked up by id and only
    /// honoured when it currently sits in the destination lane. Dropping into
    /// the task's own lane without a target leaves the order unchanged.
    /// Unknown ids are ignored.
    pub fn move_task(&mut self, updated: Task, target: Option<&Task>) -> Option<Task> {
        let index = self.index_of(updated.id)?;
        let old_status = self.tasks[index].status.clone();
        let old_pos = self.tasks[index].position;
        let new_status = updated.status.clone();
        let target_pos = target.and_then(|t| self.position_in_lane(t.id, &new_status));

        let new_pos = if old_status != new_status {
            self.shift(&old_status, updated.id, |pos| pos > old_pos, Shift::Down);

            let insert_at = target_pos.unwrap_or_else(|| self.lane_len(&new_status));
            self.shift(&new_status, updated.id, |pos| pos >= insert_at, Shift::Up);

            insert_at
        } else {
            match target_pos {
                Some(new_pos) if old_pos < new_pos => {
                    self.shift(&new_status, updated.id, |pos| pos > old_pos && pos <= new_pos, Shift::Down);
                    new_pos
                }
                Some(new_pos) if old_pos > new_pos => {
                    self.shift(&new_status, updated.id, |pos| pos >= new_pos && pos < old_pos, Shift::Up);
                    new_pos
                }
                _ => old_pos,
            }
        };

        let placed = Task {
            position: new_pos,
            status: new_status,
            ..updated
        };

        log::debug!(
            "move: task {} {}[{}] -> {}[{}]",
            placed.id,
            old_status,
            old_pos,
            placed.status,
            placed.position
        );
        self.tasks[index] = placed.clone();
        self.notify();

        Some(placed)
    }

    /// Look up a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The canonical collection, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks of one lane, sorted by position.
    pub fn tasks_in_lane(&self, status: &str) -> Vec<Task> {
        let mut lane: Vec<Task> = self.tasks.iter().filter(|t| t.status == status).cloned().collect();
        lane.sort_by_key(|t| t.position);
        lane
    }

    /// Every non-empty lane with its tasks sorted by position.
    pub fn lanes(&self) -> BTreeMap<String, Vec<Task>> {
        let mut lanes: BTreeMap<String, Vec<Task>> = BTreeMap::new();
        for task in &self.tasks {
            lanes.entry(task.status.clone()).or_default().push(task.clone());
        }
        for lane in lanes.values_mut() {
            lane.sort_by_key(|t| t.position);
        }
        lanes
    }

    /// Number of tasks in a lane.
    pub fn lane_len(&self, status: &str) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Check id uniqueness and lane density.
    pub fn verify(&self) -> Result<(), ValidationError> {
        validate_tasks(&self.tasks)
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn position_in_lane(&self, id: u64, status: &str) -> Option<usize> {
        self.get(id).filter(|t| t.status == status).map(|t| t.position)
    }

    /// Shift every task of `status` (other than `moving`) whose position
    /// matches `select` by one slot.
    fn shift(&mut self, status: &str, moving: u64, select: impl Fn(usize) -> bool, dir: Shift) {
        for task in &mut self.tasks {
            if task.id != moving && task.status == status && select(task.position) {
                match dir {
                    Shift::Up => task.position += 1,
                    Shift::Down => task.position -= 1,
                }
            }
        }
    }

    fn notify(&mut self) {
        if let Some(hook) = self.hook.as_mut() {
            hook(&self.tasks);
        }
    }
}

#[derive(Clone, Copy)]
enum Shift {
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn new_task(title: &str, status: &str) -> NewTask {
        NewTask::new(title, "", status)
    }

    /// todo: A=0, B=1, C=2
    fn setup_todo_abc() -> (TaskStore, Task, Task, Task) {
        let mut store = TaskStore::new();
        let a = store.add(new_task("A", "todo"));
        let b = store.add(new_task("B", "todo"));
        let c = store.add(new_task("C", "todo"));
        (store, a, b, c)
    }

    fn lane_titles(store: &TaskStore, status: &str) -> Vec<String> {
        store.tasks_in_lane(status).into_iter().map(|t| t.title).collect()
    }

    #[test]
    fn test_add_assigns_id_and_position() {
        let (store, a, b, c) = setup_todo_abc();
        assert_eq!((a.id, a.position), (1, 0));
        assert_eq!((b.id, b.position), (2, 1));
        assert_eq!((c.id, c.position), (3, 2));
        assert_eq!(store.len(), 3);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_add_to_other_lane_starts_at_zero() {
        let (mut store, ..) = setup_todo_abc();
        let x = store.add(new_task("X", "doing"));
        assert_eq!(x.position, 0);
        assert_eq!(store.lane_len("todo"), 3);
    }

    #[test]
    fn test_add_after_remove_ids_stay_unique() {
        let (mut store, _a, _b, c) = setup_todo_abc();
        store.remove(c.id);
        let d = store.add(new_task("D", "todo"));
        assert_eq!(d.id, 3);

        let (mut store, a, _b, _c) = setup_todo_abc();
        store.remove(a.id);
        let d = store.add(new_task("D", "todo"));
        assert_eq!(d.id, 4);
    }

    #[test]
    fn test_remove_closes_gap() {
        let (mut store, a, b, c) = setup_todo_abc();
        let removed = store.remove(b.id).unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(store.get(a.id).unwrap().position, 0);
        assert_eq!(store.get(c.id).unwrap().position, 1);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_remove_leaves_other_lanes() {
        let (mut store, a, ..) = setup_todo_abc();
        let x = store.add(new_task("X", "doing"));
        let y = store.add(new_task("Y", "doing"));
        store.remove(a.id);
        assert_eq!(store.get(x.id).unwrap().position, 0);
        assert_eq!(store.get(y.id).unwrap().position, 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut store, ..) = setup_todo_abc();
        let before = store.tasks().to_vec();
        assert!(store.remove(42).is_none());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_move_to_other_lane_appends() {
        let (mut store, a, b, c) = setup_todo_abc();
        let moved = store.move_task(c.with_status("doing"), None).unwrap();
        assert_eq!(moved.status, "doing");
        assert_eq!(moved.position, 0);
        assert_eq!(store.get(a.id).unwrap().position, 0);
        assert_eq!(store.get(b.id).unwrap().position, 1);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_from_middle_closes_gap() {
        let (mut store, _a, b, _c) = setup_todo_abc();
        store.move_task(b.with_status("done"), None);
        assert_eq!(lane_titles(&store, "todo"), vec!["A", "C"]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_down_within_lane() {
        let (mut store, a, _b, c) = setup_todo_abc();
        let moved = store.move_task(a.clone(), Some(&c)).unwrap();
        assert_eq!(moved.position, 2);
        assert_eq!(lane_titles(&store, "todo"), vec!["B", "C", "A"]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_up_within_lane() {
        let (mut store, a, _b, c) = setup_todo_abc();
        let moved = store.move_task(c.clone(), Some(&a)).unwrap();
        assert_eq!(moved.position, 0);
        assert_eq!(lane_titles(&store, "todo"), vec!["C", "A", "B"]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let (mut store, _a, b, _c) = setup_todo_abc();
        let before = store.tasks().to_vec();
        store.move_task(b.clone(), Some(&b));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_move_same_lane_without_target_keeps_order() {
        let (mut store, a, ..) = setup_todo_abc();
        let before = store.tasks().to_vec();
        let moved = store.move_task(a.clone(), None).unwrap();
        assert_eq!(moved.position, 0);
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_move_ignores_incoming_position() {
        let (mut store, a, _b, _c) = setup_todo_abc();
        let mut stale = a.with_status("doing");
        stale.position = 17;
        let moved = store.move_task(stale, None).unwrap();
        assert_eq!(moved.position, 0);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_keeps_content_edits() {
        let (mut store, a, ..) = setup_todo_abc();
        let mut edited = a.clone();
        edited.title = "A (renamed)".to_string();
        edited.description = "details".to_string();
        store.move_task(edited, None);
        let stored = store.get(a.id).unwrap();
        assert_eq!(stored.title, "A (renamed)");
        assert_eq!(stored.description, "details");
        assert_eq!(stored.position, 0);
    }

    #[test]
    fn test_move_before_target_in_other_lane() {
        let mut store = TaskStore::new();
        let a = store.add(new_task("A", "todo"));
        let b = store.add(new_task("B", "todo"));
        let x = store.add(new_task("X", "doing"));
        let y = store.add(new_task("Y", "doing"));

        store.move_task(b.with_status("doing"), Some(&y));

        assert_eq!(store.get(a.id).unwrap().position, 0);
        assert_eq!(lane_titles(&store, "doing"), vec!["X", "B", "Y"]);
        assert_eq!(store.get(x.id).unwrap().position, 0);
        assert_eq!(store.get(y.id).unwrap().position, 2);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_uses_current_target_position() {
        let mut store = TaskStore::new();
        let x = store.add(new_task("X", "doing"));
        let y = store.add(new_task("Y", "doing"));
        let a = store.add(new_task("A", "todo"));

        // Caller's copy of Y is stale after X leaves the lane.
        store.move_task(x.with_status("done"), None);
        store.move_task(a.with_status("doing"), Some(&y));

        assert_eq!(lane_titles(&store, "doing"), vec!["A", "Y"]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_with_target_in_wrong_lane_appends() {
        let (mut store, a, _b, c) = setup_todo_abc();
        store.add(new_task("X", "doing"));
        store.move_task(a.with_status("doing"), Some(&c));
        assert_eq!(lane_titles(&store, "doing"), vec!["X", "A"]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_move_with_unknown_target_appends() {
        let (mut store, a, ..) = setup_todo_abc();
        store.add(new_task("X", "doing"));
        let ghost = Task {
            id: 99,
            title: "ghost".to_string(),
            description: String::new(),
            status: "doing".to_string(),
            position: 0,
        };
        store.move_task(a.with_status("doing"), Some(&ghost));
        assert_eq!(lane_titles(&store, "doing"), vec!["X", "A"]);
    }

    #[test]
    fn test_move_unknown_is_noop() {
        let (mut store, ..) = setup_todo_abc();
        let before = store.tasks().to_vec();
        let ghost = Task {
            id: 99,
            title: "ghost".to_string(),
            description: String::new(),
            status: "doing".to_string(),
            position: 0,
        };
        assert!(store.move_task(ghost, None).is_none());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_lanes_grouped_and_sorted() {
        let (mut store, a, _b, c) = setup_todo_abc();
        store.move_task(c.clone(), Some(&a));
        store.add(new_task("X", "doing"));

        let lanes = store.lanes();
        assert_eq!(lanes.len(), 2);
        let todo: Vec<&str> = lanes["todo"].iter().map(|t| t.title.as_str()).collect();
        assert_eq!(todo, vec!["C", "A", "B"]);
        assert_eq!(lanes["doing"].len(), 1);
    }

    #[test]
    fn test_tasks_in_missing_lane_is_empty() {
        let (store, ..) = setup_todo_abc();
        assert!(store.tasks_in_lane("archived").is_empty());
    }

    #[test]
    fn test_hook_sees_committed_state() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut store = TaskStore::new();
        store.on_change(move |tasks| sink.lock().unwrap().push(tasks.len()));

        let a = store.add(new_task("A", "todo"));
        store.add(new_task("B", "todo"));
        store.move_task(a.with_status("done"), None);
        store.remove(a.id);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_hook_not_called_for_unknown_ids() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);

        let mut store = TaskStore::new();
        store.on_change(move |_| *counter.lock().unwrap() += 1);

        store.remove(5);
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
