// Run metrics
//
// Lock-free counters for batch runs, logged at the end of a run.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters collected across batch runs.
#[derive(Debug)]
pub struct Metrics {
    pub tasks_completed: AtomicUsize,
    pub tasks_skipped: AtomicUsize,
    pub tasks_failed: AtomicUsize,

    /// Regions applied across completed tasks
    pub regions_applied: AtomicUsize,

    /// Regions loaded from saved archives instead of drawn
    pub regions_imported: AtomicUsize,

    /// Wall time spent in tasks, operator wait included
    pub total_task_time_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tasks_completed: AtomicUsize::new(0),
            tasks_skipped: AtomicUsize::new(0),
            tasks_failed: AtomicUsize::new(0),
            regions_applied: AtomicUsize::new(0),
            regions_imported: AtomicUsize::new(0),
            total_task_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed task and the number of regions it applied
    pub fn record_task_completed(&self, regions: usize, imported: bool) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        self.regions_applied.fetch_add(regions, Ordering::Relaxed);
        if imported {
            self.regions_imported.fetch_add(regions, Ordering::Relaxed);
        }
    }

    pub fn record_task_skipped(&self) {
        self.tasks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_time(&self, duration: Duration) {
        self.total_task_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn tasks_processed(&self) -> usize {
        self.tasks_completed.load(Ordering::Relaxed)
            + self.tasks_skipped.load(Ordering::Relaxed)
            + self.tasks_failed.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average time per processed task in milliseconds
    pub fn avg_task_time_ms(&self) -> f64 {
        let total = self.total_task_time_ms.load(Ordering::Relaxed);
        let count = self.tasks_processed();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Run Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Tasks: {} completed, {} skipped, {} failed",
            self.tasks_completed.load(Ordering::Relaxed),
            self.tasks_skipped.load(Ordering::Relaxed),
            self.tasks_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Regions: {} applied ({} imported from archives)",
            self.regions_applied.load(Ordering::Relaxed),
            self.regions_imported.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Total task time: {:.2}s (avg: {:.2}ms per task)",
            self.total_task_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_task_time_ms()
        );
    }

    /// One-line progress report for long runs
    pub fn log_periodic(&self) {
        tracing::info!(
            "Metrics: {} tasks processed, {} regions applied, uptime {:.0}s",
            self.tasks_processed(),
            self.regions_applied.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
