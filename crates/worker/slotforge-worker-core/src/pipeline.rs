//! Sync-or-offload mesh routing with last-good-mesh retention.

use std::sync::Arc;

use slotforge_mesh::{MeshProcessor, MeshRequest, ProcessedMesh};

use crate::config::DispatcherConfig;
use crate::dispatcher::{Dispatcher, TaskHandle};
use crate::error::DispatchError;
use crate::protocol::{Task, TaskOutput};

/// A mesh request in flight.
#[derive(Debug)]
pub enum MeshJob {
    /// Small contour, already processed on the calling thread.
    Ready(ProcessedMesh),
    /// Large contour, running on the pool.
    Offloaded(TaskHandle),
}

impl MeshJob {
    pub fn is_offloaded(&self) -> bool {
        matches!(self, MeshJob::Offloaded(_))
    }

    /// Block until the mesh is available.
    pub fn wait(self) -> Result<ProcessedMesh, DispatchError> {
        match self {
            MeshJob::Ready(mesh) => Ok(mesh),
            MeshJob::Offloaded(handle) => match handle.wait_output()? {
                TaskOutput::Mesh(mesh) => Ok(mesh),
                other => Err(DispatchError::Worker {
                    reason: format!("expected a mesh, got {other:?}"),
                }),
            },
        }
    }
}

/// Front door for mesh requests coming from the interactive thread.
#[derive(Debug)]
pub struct MeshPipeline {
    processor: MeshProcessor,
    dispatcher: Dispatcher,
    offload_point_threshold: usize,
    last_good: Option<Arc<ProcessedMesh>>,
}

impl MeshPipeline {
    pub fn new(cfg: DispatcherConfig) -> Result<Self, DispatchError> {
        let processor = MeshProcessor::new(cfg.mesh.clone());
        let offload_point_threshold = cfg.offload_point_threshold;
        Ok(Self {
            processor,
            dispatcher: Dispatcher::new(cfg)?,
            offload_point_threshold,
            last_good: None,
        })
    }

    /// Process inline when the contour is small enough, otherwise hand it to
    /// the pool.
    pub fn submit(&self, request: MeshRequest) -> MeshJob {
        if request.points.len() <= self.offload_point_threshold {
            MeshJob::Ready(self.processor.process(&request))
        } else {
            log::debug!(
                "pipeline: offloading {} points for '{}'",
                request.points.len(),
                request.element_type
            );
            MeshJob::Offloaded(self.dispatcher.submit_task(Task::ProcessMesh(request)))
        }
    }

    /// Wait for `job` and make its mesh current if it is renderable.
    ///
    /// A failed or unrenderable result leaves the previous mesh in place; the
    /// return value is whatever mesh is current afterwards.
    pub fn resolve(&mut self, job: MeshJob) -> Option<Arc<ProcessedMesh>> {
        match job.wait() {
            Ok(mesh) if mesh.is_renderable() => {
                self.last_good = Some(Arc::new(mesh));
            }
            Ok(mesh) => {
                log::warn!(
                    "pipeline: {} mesh has no triangles; keeping previous mesh",
                    mesh.element_type
                );
            }
            Err(err) => {
                log::warn!("pipeline: mesh request failed ({}): {err}", err.category());
            }
        }
        self.last_good.clone()
    }

    /// `submit` then `resolve`.
    pub fn process(&mut self, request: MeshRequest) -> Option<Arc<ProcessedMesh>> {
        let job = self.submit(request);
        self.resolve(job)
    }

    pub fn last_good(&self) -> Option<Arc<ProcessedMesh>> {
        self.last_good.clone()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn shutdown(&mut self) {
        self.dispatcher.shutdown();
    }
}
