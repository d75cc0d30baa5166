use serde::{Deserialize, Serialize};
use slotforge_mesh::MeshConfig;

/// Hard cap on the default pool size; mesh jobs are short and memory-bound.
const MAX_DEFAULT_WORKERS: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Number of worker threads. Zero is treated as one.
    pub worker_count: usize,
    /// Contours with more points than this are sent to the pool; smaller ones
    /// are processed on the calling thread.
    pub offload_point_threshold: usize,
    /// Configuration shared by every worker's mesh processor.
    pub mesh: MeshConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            offload_point_threshold: 256,
            mesh: MeshConfig::default(),
        }
    }
}

/// Available hardware parallelism, capped at four workers.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .clamp(1, MAX_DEFAULT_WORKERS)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Queue depth at which a deep-queue advisory is raised.
    pub queue_warning_threshold: usize,
    /// Busy/total ratio at which the pool counts as saturated.
    pub saturation_ratio: f32,
    /// Failed/finished ratio at which a failure-rate advisory is raised.
    pub failure_rate_warning: f32,
    /// Finished tasks required before the failure rate is judged.
    pub min_finished_for_rate: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            queue_warning_threshold: 16,
            saturation_ratio: 1.0,
            failure_rate_warning: 0.25,
            min_finished_for_rate: 8,
        }
    }
}
