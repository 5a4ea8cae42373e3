//! Sequential batch runner.
//!
//! Feeds every task of a [`TaskRegistry`] through the [`Orchestrator`], one at
//! a time, and records each result in the [`StateManager`] and [`Metrics`].
//! A task failure is logged and recorded; it never aborts the run.
//!
//! A stop request (a `true` on the watch channel) is honored between tasks
//! only. A task that has opened images always runs to its end.

use super::processing::{Orchestrator, TaskOutcome};
use crate::metrics::Metrics;
use crate::models::{Task, TaskRegistry, TaskStatus};
use crate::state::StateManager;
use camino::Utf8PathBuf;
use std::time::Instant;
use tokio::sync::watch;

/// Tasks between periodic metric reports
const METRICS_LOG_INTERVAL: usize = 10;

/// Result of one task in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub index: usize,
    pub task: Task,
    pub status: TaskStatus,
    pub message: String,
}

/// Everything a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub results: Vec<TaskResult>,
    /// Output files written, in task order
    pub outputs: Vec<Utf8PathBuf>,
    /// True if a stop request ended the run early
    pub stopped: bool,
}

impl RunSummary {
    pub fn count(&self, status: TaskStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn completed(&self) -> usize {
        self.count(TaskStatus::Completed)
    }

    pub fn skipped(&self) -> usize {
        self.count(TaskStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(TaskStatus::Failed)
    }
}

/// Create a stop signal for [`BatchRunner::run`].
///
/// Send `true` to stop after the current task.
pub fn stop_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

pub struct BatchRunner<'a> {
    orchestrator: Orchestrator<'a>,
    state: &'a StateManager,
    metrics: &'a Metrics,
}

impl<'a> BatchRunner<'a> {
    pub fn new(orchestrator: Orchestrator<'a>, state: &'a StateManager, metrics: &'a Metrics) -> Self {
        Self {
            orchestrator,
            state,
            metrics,
        }
    }

    /// Process every task in registry order.
    pub fn run(&self, registry: &TaskRegistry, stop: &watch::Receiver<bool>) -> RunSummary {
        let total = registry.len();
        let mut summary = RunSummary::default();

        tracing::info!("Starting run over {} task(s)", total);
        self.state
            .start_run(registry.iter().map(|t| t.to_string()).collect());

        for (index, task) in registry.iter().enumerate() {
            if *stop.borrow() {
                tracing::info!("Stop requested - {} task(s) left unprocessed", total - index);
                self.state.request_stop();
                summary.stopped = true;
                break;
            }

            // Index is always in range here
            let Some(output_dir) = registry.output_dir_for(index) else {
                break;
            };

            self.state.update_progress(
                task.to_string(),
                format!("Processing {}/{}: {}", index + 1, total, task.file_name),
            );

            let started = Instant::now();
            let outcome = self.orchestrator.process(task, output_dir);
            self.metrics.record_task_time(started.elapsed());

            let (status, message) = match outcome {
                Ok(TaskOutcome::Completed(done)) => {
                    self.metrics
                        .record_task_completed(done.region_count, done.regions_imported);
                    let message = format!("saved {} region(s) to {}", done.region_count, done.edited);
                    summary.outputs.push(done.edited);
                    summary.outputs.push(done.projection);
                    summary.outputs.extend(done.roi_archive);
                    (TaskStatus::Completed, message)
                }
                Ok(TaskOutcome::Skipped(reason)) => {
                    self.metrics.record_task_skipped();
                    tracing::warn!("Skipped {}: {}", task, reason);
                    (TaskStatus::Skipped, reason.to_string())
                }
                Err(e) => {
                    self.metrics.record_task_failed();
                    tracing::error!("Failed {}: {}", task, e);
                    (TaskStatus::Failed, e.to_string())
                }
            };

            self.state
                .add_task_result(task.to_string(), status, message.clone());
            summary.results.push(TaskResult {
                index,
                task: task.clone(),
                status,
                message,
            });

            if (index + 1) % METRICS_LOG_INTERVAL == 0 {
                self.metrics.log_periodic();
            }
        }

        self.state.finish_run();
        self.metrics.log_summary();
        tracing::info!(
            "Run finished: {} completed, {} skipped, {} failed{}",
            summary.completed(),
            summary.skipped(),
            summary.failed(),
            if summary.stopped { " (stopped)" } else { "" }
        );

        summary
    }
}
