// State management module
//
// StateManager wraps RunState with thread-safe access and emits change events
// so a front end can follow a batch run without polling.

use crate::models::{RunState, TaskStatus};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when run state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A batch run has started
    RunStarted { total_tasks: usize },

    /// Progress has moved on
    ProgressUpdated {
        current: usize,
        total: usize,
        current_task: Option<String>,
    },

    /// Current operation has changed
    OperationChanged { operation: String },

    /// A task has been processed
    TaskProcessed {
        task: String,
        status: TaskStatus,
        message: String,
    },

    /// The operator asked to stop after the current task
    StopRequested,

    /// A batch run has finished or was stopped
    RunFinished {
        completed: usize,
        skipped: usize,
        failed: usize,
    },

    /// State has been reset
    StateReset,
}

/// Thread-safe run state with event emission.
///
/// - [`read()`](Self::read) / [`snapshot()`](Self::snapshot) for reading
/// - [`update()`](Self::update) for mutations with automatic events
/// - [`subscribe()`](Self::subscribe) for listening to changes
///
/// Clones share the same state and channel.
#[derive(Clone)]
pub struct StateManager {
    state: Arc<RwLock<RunState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a manager with a broadcast buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RunState::default())),
            state_tx,
        }
    }

    pub fn snapshot(&self) -> RunState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RunState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Apply `update_fn` and emit an event for every detected change.
    ///
    /// Returns the emitted events. Sending never fails the update; having
    /// no subscriber is fine.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut RunState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = detect_changes(&old_state, &state);
        for change in &changes {
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, change: StateChange, changes: &mut Vec<StateChange>) {
        let _ = self.state_tx.send(change.clone());
        changes.push(change);
    }

    /// Begin a run over `tasks`
    pub fn start_run(&self, tasks: Vec<String>) -> Vec<StateChange> {
        self.update(|state| {
            state.reset();
            state.is_running = true;
            state.total_tasks = tasks.len();
            state.pending_tasks = tasks;
            state.current_operation = "Starting run...".to_string();
        })
    }

    pub fn finish_run(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_running = false;
            state.current_task = None;
            state.current_operation.clear();
        })
    }

    /// Ask the run to stop once the current task is done
    pub fn request_stop(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.stop_requested = true;
        })
    }

    pub fn update_progress(&self, task: String, operation: String) -> Vec<StateChange> {
        self.update(|state| {
            state.current_task = Some(task);
            state.current_operation = operation;
        })
    }

    /// Record the result of one task
    pub fn add_task_result(
        &self,
        task: String,
        status: TaskStatus,
        message: String,
    ) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.add_result(task.clone(), status);
        });

        self.emit(
            StateChange::TaskProcessed {
                task,
                status,
                message,
            },
            &mut changes,
        );

        changes
    }

    pub fn reset_run_state(&self) -> Vec<StateChange> {
        let mut changes = self.update(RunState::reset);
        self.emit(StateChange::StateReset, &mut changes);
        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_changes(old: &RunState, new: &RunState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.is_running != new.is_running {
        if new.is_running {
            changes.push(StateChange::RunStarted {
                total_tasks: new.total_tasks,
            });
        } else {
            changes.push(StateChange::RunFinished {
                completed: new.completed_tasks.len(),
                skipped: new.skipped_tasks.len(),
                failed: new.failed_tasks.len(),
            });
        }
    }

    if new.stop_requested && !old.stop_requested {
        changes.push(StateChange::StopRequested);
    }

    if old.progress != new.progress
        || old.total_tasks != new.total_tasks
        || old.current_task != new.current_task
    {
        changes.push(StateChange::ProgressUpdated {
            current: new.progress,
            total: new.total_tasks,
            current_task: new.current_task.clone(),
        });
    }

    if old.current_operation != new.current_operation {
        changes.push(StateChange::OperationChanged {
            operation: new.current_operation.clone(),
        });
    }

    changes
}
