//! Slotforge Worker Core
//!
//! Moves mesh processing off the interactive thread: a JSON task protocol with
//! correlation ids, the worker-side handler, a thread-pool dispatcher, pool
//! metrics with an advisory monitor, and a pipeline that decides per request
//! whether to offload at all.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod monitor;
pub mod pipeline;
pub mod protocol;

// Re-exports for hosts
pub use config::{default_worker_count, DispatcherConfig, MonitorConfig};
pub use dispatcher::{Dispatcher, TaskHandle};
pub use error::DispatchError;
pub use handler::{handle_message, handle_request, MeshTaskHandler, TaskHandler};
pub use metrics::PoolMetrics;
pub use monitor::{Advisory, PerformanceMonitor};
pub use pipeline::{MeshJob, MeshPipeline};
pub use protocol::{
    PointsPayload, ResponseStatus, SimplifyPayload, Task, TaskKind, TaskOutput, TrianglesPayload,
    WorkerRequest, WorkerResponse,
};
