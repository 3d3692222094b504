//! ID generation for board tasks.

use crate::types::Task;

/// Next free id: one past the largest id in use, or 1 for an empty board.
/// Ids of removed tasks below the maximum are never handed out again while
/// a larger id still exists.
pub fn next_id(tasks: &[Task]) -> u64 {
    tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64) -> Task {
        Task {
            id,
            title: String::new(),
            description: String::new(),
            status: "todo".to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_next_id_empty() {
        assert_eq!(next_id(&[]), 1);
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        let tasks = vec![task(2), task(9), task(4)];
        assert_eq!(next_id(&tasks), 10);
    }
}
