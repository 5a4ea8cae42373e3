use std::fmt;

/// Final status of one task in a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Completed,
    Skipped,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress and results of the current batch run.
///
/// Wrapped in `Arc<RwLock<RunState>>` by [`crate::state::StateManager`];
/// mutate it only through the manager so change events are emitted.
///
/// Tasks are identified by their full main-image path, since file names
/// alone may repeat across directories.
#[derive(Clone, Debug, Default)]
pub struct RunState {
    pub is_running: bool,
    pub stop_requested: bool,
    pub current_task: Option<String>,
    pub current_operation: String,

    pub progress: usize,
    pub total_tasks: usize,
    /// Tasks not yet processed, in run order
    pub pending_tasks: Vec<String>,

    pub completed_tasks: Vec<String>,
    pub skipped_tasks: Vec<String>,
    pub failed_tasks: Vec<String>,
}

impl RunState {
    /// (completed, skipped, failed, total)
    pub fn run_stats(&self) -> (usize, usize, usize, usize) {
        (
            self.completed_tasks.len(),
            self.skipped_tasks.len(),
            self.failed_tasks.len(),
            self.total_tasks,
        )
    }

    /// Tasks not yet processed when the run ended
    pub fn remaining(&self) -> usize {
        self.total_tasks.saturating_sub(self.progress)
    }

    pub fn add_result(&mut self, task: String, status: TaskStatus) {
        if let Some(pos) = self.pending_tasks.iter().position(|t| *t == task) {
            self.pending_tasks.remove(pos);
        }
        match status {
            TaskStatus::Completed => self.completed_tasks.push(task),
            TaskStatus::Skipped => self.skipped_tasks.push(task),
            TaskStatus::Failed => self.failed_tasks.push(task),
        }
        self.progress += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_result() {
        let mut state = RunState {
            total_tasks: 4,
            ..RunState::default()
        };
        state.add_result("/a/x_C1.tif".to_string(), TaskStatus::Completed);
        state.add_result("/a/y_C1.tif".to_string(), TaskStatus::Skipped);
        state.add_result("/b/x_C1.tif".to_string(), TaskStatus::Failed);

        assert_eq!(state.run_stats(), (1, 1, 1, 4));
        assert_eq!(state.progress, 3);
        assert_eq!(state.remaining(), 1);
    }

    #[test]
    fn test_add_result_drains_pending() {
        let mut state = RunState {
            total_tasks: 3,
            pending_tasks: vec![
                "/a/x_C1.tif".to_string(),
                "/b/x_C1.tif".to_string(),
                "/a/y_C1.tif".to_string(),
            ],
            ..RunState::default()
        };

        state.add_result("/b/x_C1.tif".to_string(), TaskStatus::Failed);
        assert_eq!(state.pending_tasks, vec!["/a/x_C1.tif", "/a/y_C1.tif"]);

        state.add_result("/a/x_C1.tif".to_string(), TaskStatus::Completed);
        state.add_result("/a/y_C1.tif".to_string(), TaskStatus::Skipped);
        assert!(state.pending_tasks.is_empty());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_same_name_in_two_directories_counts_twice() {
        let mut state = RunState::default();
        state.add_result("/a/x_C1.tif".to_string(), TaskStatus::Completed);
        state.add_result("/b/x_C1.tif".to_string(), TaskStatus::Completed);

        assert_eq!(state.completed_tasks.len(), 2);
    }

    #[test]
    fn test_reset() {
        let mut state = RunState {
            is_running: true,
            stop_requested: true,
            current_task: Some("/a/x_C1.tif".to_string()),
            total_tasks: 2,
            ..RunState::default()
        };
        state.add_result("/a/x_C1.tif".to_string(), TaskStatus::Completed);

        state.reset();

        assert!(!state.is_running);
        assert!(!state.stop_requested);
        assert!(state.current_task.is_none());
        assert_eq!(state.run_stats(), (0, 0, 0, 0));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!(TaskStatus::Failed.as_str(), "failed");
    }
}
