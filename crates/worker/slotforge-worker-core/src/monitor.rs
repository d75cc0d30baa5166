//! Advisory pool monitoring. Observations are logged and returned; nothing here
//! throttles or rejects work.

use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::metrics::PoolMetrics;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advisory {
    /// Busy ratio reached the configured saturation ratio.
    #[serde(rename_all = "camelCase")]
    Saturated { busy_workers: usize, total_workers: usize },
    #[serde(rename_all = "camelCase")]
    DeepQueue { queued_tasks: usize, threshold: usize },
    #[serde(rename_all = "camelCase")]
    HighFailureRate { failed_tasks: u64, finished_tasks: u64, rate: f32 },
}

impl Advisory {
    fn same_kind(&self, other: &Advisory) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::Saturated {
                busy_workers,
                total_workers,
            } => write!(f, "pool saturated ({busy_workers}/{total_workers} busy)"),
            Advisory::DeepQueue {
                queued_tasks,
                threshold,
            } => write!(f, "{queued_tasks} tasks queued (threshold {threshold})"),
            Advisory::HighFailureRate {
                failed_tasks,
                finished_tasks,
                rate,
            } => write!(
                f,
                "{failed_tasks}/{finished_tasks} tasks failed ({:.0}%)",
                rate * 100.0
            ),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PerformanceMonitor {
    cfg: MonitorConfig,
    active: Vec<Advisory>,
    observations: u64,
}

impl PerformanceMonitor {
    pub fn new(cfg: MonitorConfig) -> Self {
        Self {
            cfg,
            active: Vec::new(),
            observations: 0,
        }
    }

    /// Evaluate a metrics snapshot. Advisories that were not active on the
    /// previous observation are logged at `warn`; cleared ones at `info`.
    pub fn observe(&mut self, metrics: &PoolMetrics) -> Vec<Advisory> {
        self.observations += 1;
        let mut current = Vec::new();

        if metrics.total_workers > 0 && metrics.utilization() >= self.cfg.saturation_ratio {
            current.push(Advisory::Saturated {
                busy_workers: metrics.busy_workers,
                total_workers: metrics.total_workers,
            });
        }
        if metrics.queued_tasks >= self.cfg.queue_warning_threshold {
            current.push(Advisory::DeepQueue {
                queued_tasks: metrics.queued_tasks,
                threshold: self.cfg.queue_warning_threshold,
            });
        }
        let finished = metrics.finished_tasks();
        if finished >= self.cfg.min_finished_for_rate
            && metrics.failure_rate() >= self.cfg.failure_rate_warning
        {
            current.push(Advisory::HighFailureRate {
                failed_tasks: metrics.failed_tasks,
                finished_tasks: finished,
                rate: metrics.failure_rate(),
            });
        }

        for advisory in &current {
            if !self.active.iter().any(|a| a.same_kind(advisory)) {
                log::warn!("monitor: {advisory}");
            }
        }
        for advisory in &self.active {
            if !current.iter().any(|a| a.same_kind(advisory)) {
                log::info!("monitor: cleared: {advisory}");
            }
        }
        self.active = current.clone();
        current
    }

    /// Advisories raised by the most recent observation.
    pub fn active(&self) -> &[Advisory] {
        &self.active
    }

    pub fn is_healthy(&self) -> bool {
        self.active.is_empty()
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(busy: usize, queued: usize, completed: u64, failed: u64) -> PoolMetrics {
        PoolMetrics {
            total_workers: 4,
            available_workers: 4 - busy,
            busy_workers: busy,
            queued_tasks: queued,
            pending_tasks: busy + queued,
            completed_tasks: completed,
            failed_tasks: failed,
        }
    }

    #[test]
    fn idle_pool_is_healthy() {
        let mut monitor = PerformanceMonitor::default();
        assert!(monitor.observe(&metrics(1, 0, 10, 0)).is_empty());
        assert!(monitor.is_healthy());
    }

    #[test]
    fn saturation_and_queue_depth_are_reported() {
        let mut monitor = PerformanceMonitor::new(MonitorConfig {
            queue_warning_threshold: 5,
            ..MonitorConfig::default()
        });
        let advisories = monitor.observe(&metrics(4, 7, 0, 0));
        assert_eq!(advisories.len(), 2);
        assert!(matches!(advisories[0], Advisory::Saturated { busy_workers: 4, .. }));
        assert!(matches!(advisories[1], Advisory::DeepQueue { queued_tasks: 7, .. }));

        monitor.observe(&metrics(2, 0, 0, 0));
        assert!(monitor.is_healthy());
        assert_eq!(monitor.observations(), 2);
    }

    #[test]
    fn failure_rate_needs_enough_samples() {
        let mut monitor = PerformanceMonitor::default();
        assert!(monitor.observe(&metrics(0, 0, 1, 2)).is_empty());
        let advisories = monitor.observe(&metrics(0, 0, 6, 4));
        assert_eq!(advisories.len(), 1);
        let json = serde_json::to_value(&advisories[0]).expect("serialize");
        assert_eq!(json["kind"], "highFailureRate");
        assert_eq!(json["finishedTasks"], 10);
    }
}
