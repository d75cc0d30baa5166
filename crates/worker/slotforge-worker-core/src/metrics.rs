use serde::{Deserialize, Serialize};

/// Point-in-time view of the worker pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetrics {
    pub total_workers: usize,
    pub available_workers: usize,
    pub busy_workers: usize,
    /// Waiting for a worker.
    pub queued_tasks: usize,
    /// Submitted and not yet resolved (queued or running).
    pub pending_tasks: usize,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
}

impl PoolMetrics {
    /// Tasks that have resolved, successfully or not.
    #[inline]
    pub fn finished_tasks(&self) -> u64 {
        self.completed_tasks + self.failed_tasks
    }

    /// Fraction of workers currently busy; 0 for an empty pool.
    #[inline]
    pub fn utilization(&self) -> f32 {
        if self.total_workers == 0 {
            0.0
        } else {
            self.busy_workers as f32 / self.total_workers as f32
        }
    }

    /// Failed/finished ratio; 0 before anything finished.
    #[inline]
    pub fn failure_rate(&self) -> f32 {
        match self.finished_tasks() {
            0 => 0.0,
            n => self.failed_tasks as f32 / n as f32,
        }
    }
}
