//! Thread-pool dispatcher with correlation-id routing.
//!
//! Each worker thread owns its own handler and a FIFO job channel. A router
//! thread receives every response, resolves the matching pending handle and
//! feeds the freed worker from the shared queue. Every submitted id resolves
//! exactly once: with the worker's result, or with `Disconnected` at shutdown.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hashbrown::HashMap;
use serde_json::Value;
use slotforge_mesh::MeshProcessor;
use uuid::Uuid;

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::handler::{MeshTaskHandler, TaskHandler};
use crate::metrics::PoolMetrics;
use crate::protocol::{Task, TaskKind, TaskOutput, WorkerRequest, WorkerResponse};

type Outcome = Result<Value, DispatchError>;

/// Caller-held side of a submitted task.
#[derive(Debug)]
pub struct TaskHandle {
    id: String,
    kind: TaskKind,
    rx: Receiver<Outcome>,
}

impl TaskHandle {
    fn resolved(kind: TaskKind, outcome: Outcome) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(outcome);
        Self {
            id: String::new(),
            kind,
            rx,
        }
    }

    /// Correlation id sent to the worker.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Block until the task resolves.
    pub fn wait(self) -> Result<Value, DispatchError> {
        let id = self.id;
        self.rx
            .recv()
            .unwrap_or(Err(DispatchError::Disconnected { id }))
    }

    /// Block for at most `timeout`. On `Timeout` the handle stays usable.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Value, DispatchError> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(DispatchError::Timeout {
                id: self.id.clone(),
                millis: timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Disconnected {
                id: self.id.clone(),
            }),
        }
    }

    /// Non-blocking check; `None` while the task is still running.
    pub fn try_poll(&self) -> Option<Result<Value, DispatchError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(DispatchError::Disconnected {
                id: self.id.clone(),
            })),
        }
    }

    /// [`wait`](Self::wait) and decode the data for this task's kind.
    pub fn wait_output(self) -> Result<TaskOutput, DispatchError> {
        let kind = self.kind;
        TaskOutput::decode(kind, self.wait()?)
    }
}

struct PoolState {
    senders: Vec<Sender<WorkerRequest>>,
    busy: Vec<bool>,
    queue: VecDeque<WorkerRequest>,
    pending: HashMap<String, Sender<Outcome>>,
    completed: u64,
    failed: u64,
    closed: bool,
}

impl PoolState {
    fn idle_worker(&self) -> Option<usize> {
        (0..self.senders.len()).find(|&idx| !self.busy[idx])
    }

    fn resolve(&mut self, id: &str, outcome: Outcome) {
        let Some(tx) = self.pending.remove(id) else {
            log::warn!("dispatcher: response for unknown task {id}");
            return;
        };
        match &outcome {
            Ok(_) => self.completed += 1,
            Err(err) => {
                self.failed += 1;
                log::debug!("dispatcher: task {id} failed ({}): {err}", err.category());
            }
        }
        // The caller may have dropped its handle.
        let _ = tx.send(outcome);
    }

    fn dispatch(&mut self, idx: usize, request: WorkerRequest) {
        self.busy[idx] = true;
        let sent = match self.senders.get(idx) {
            Some(tx) => tx.send(request).map_err(|mpsc::SendError(request)| request),
            None => Err(request),
        };
        if let Err(request) = sent {
            self.busy[idx] = false;
            log::warn!("dispatcher: worker {idx} is gone; dropping task {}", request.id);
            let id = request.id;
            self.resolve(&id, Err(DispatchError::Disconnected { id: id.clone() }));
        }
    }
}

fn lock(shared: &Mutex<PoolState>) -> MutexGuard<'_, PoolState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pool of background mesh workers.
pub struct Dispatcher {
    shared: Arc<Mutex<PoolState>>,
    workers: Vec<JoinHandle<()>>,
    router: Option<JoinHandle<()>>,
    worker_count: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("metrics", &self.metrics())
            .finish()
    }
}

impl Dispatcher {
    /// Start `cfg.worker_count` mesh workers, each with its own processor.
    pub fn new(cfg: DispatcherConfig) -> Result<Self, DispatchError> {
        let handler = MeshTaskHandler::new(MeshProcessor::new(cfg.mesh.clone()));
        Self::with_handler(cfg.worker_count, handler)
    }

    /// Start `worker_count` workers, each owning a clone of `handler`.
    pub fn with_handler<H>(worker_count: usize, handler: H) -> Result<Self, DispatchError>
    where
        H: TaskHandler + Clone,
    {
        let count = worker_count.max(1);
        let shared = Arc::new(Mutex::new(PoolState {
            senders: Vec::with_capacity(count),
            busy: vec![false; count],
            queue: VecDeque::new(),
            pending: HashMap::new(),
            completed: 0,
            failed: 0,
            closed: false,
        }));
        let mut dispatcher = Dispatcher {
            shared: Arc::clone(&shared),
            workers: Vec::with_capacity(count),
            router: None,
            worker_count: count,
        };

        let (results_tx, results_rx) = mpsc::channel();
        for idx in 0..count {
            let (jobs_tx, jobs_rx) = mpsc::channel();
            let handler = handler.clone();
            let results = results_tx.clone();
            let worker = thread::Builder::new()
                .name(format!("slotforge-worker-{idx}"))
                .spawn(move || run_worker(idx, handler, jobs_rx, results))
                .map_err(|err| DispatchError::Spawn {
                    reason: err.to_string(),
                })?;
            lock(&shared).senders.push(jobs_tx);
            dispatcher.workers.push(worker);
        }
        drop(results_tx);

        let router_state = Arc::clone(&shared);
        let router = thread::Builder::new()
            .name("slotforge-router".into())
            .spawn(move || route(router_state, results_rx))
            .map_err(|err| DispatchError::Spawn {
                reason: err.to_string(),
            })?;
        dispatcher.router = Some(router);

        log::info!("dispatcher: started {count} workers");
        Ok(dispatcher)
    }

    /// Submit raw request data. Goes to an idle worker or joins the queue.
    pub fn submit(&self, kind: TaskKind, data: Value) -> TaskHandle {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel();
        let handle = TaskHandle {
            id: id.clone(),
            kind,
            rx,
        };

        let mut state = lock(&self.shared);
        if state.closed {
            log::warn!("dispatcher: {} submitted after shutdown", kind.as_str());
            let _ = tx.send(Err(DispatchError::Disconnected { id }));
            return handle;
        }
        state.pending.insert(id.clone(), tx);
        let request = WorkerRequest { id, kind, data };
        match state.idle_worker() {
            Some(idx) => state.dispatch(idx, request),
            None => {
                log::debug!(
                    "dispatcher: all workers busy; queueing {} ({} already waiting)",
                    request.id,
                    state.queue.len()
                );
                state.queue.push_back(request);
            }
        }
        handle
    }

    /// Submit a typed task.
    pub fn submit_task(&self, task: Task) -> TaskHandle {
        let kind = task.kind();
        match task.to_payload() {
            Ok(data) => self.submit(kind, data),
            Err(err) => TaskHandle::resolved(kind, Err(err)),
        }
    }

    pub fn metrics(&self) -> PoolMetrics {
        let state = lock(&self.shared);
        let busy = state.busy.iter().filter(|b| **b).count();
        PoolMetrics {
            total_workers: self.worker_count,
            available_workers: if state.closed {
                0
            } else {
                self.worker_count.saturating_sub(busy)
            },
            busy_workers: busy,
            queued_tasks: state.queue.len(),
            pending_tasks: state.pending.len(),
            completed_tasks: state.completed,
            failed_tasks: state.failed,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared).closed
    }

    /// Stop accepting work, let running tasks finish, reject everything else
    /// with `Disconnected` and join all threads. Idempotent.
    pub fn shutdown(&mut self) {
        {
            let mut state = lock(&self.shared);
            if state.closed && self.workers.is_empty() && self.router.is_none() {
                return;
            }
            state.closed = true;
            state.senders.clear();
            let queued: Vec<WorkerRequest> = state.queue.drain(..).collect();
            for request in queued {
                let id = request.id;
                state.resolve(&id, Err(DispatchError::Disconnected { id: id.clone() }));
            }
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("dispatcher: a worker thread exited abnormally");
            }
        }
        if let Some(router) = self.router.take() {
            if router.join().is_err() {
                log::warn!("dispatcher: router thread exited abnormally");
            }
        }

        let mut state = lock(&self.shared);
        let leftover: Vec<String> = state.pending.keys().cloned().collect();
        for id in leftover {
            state.resolve(&id, Err(DispatchError::Disconnected { id: id.clone() }));
        }
        log::info!(
            "dispatcher: shut down ({} completed, {} failed)",
            state.completed,
            state.failed
        );
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<H: TaskHandler>(
    idx: usize,
    handler: H,
    jobs: Receiver<WorkerRequest>,
    results: Sender<(usize, WorkerResponse)>,
) {
    for request in jobs {
        let mut response = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&request)))
            .unwrap_or_else(|payload| {
                let reason = panic_message(&*payload);
                log::error!("worker {idx}: task {} panicked: {reason}", request.id);
                WorkerResponse::error(request.id.clone(), format!("worker panicked: {reason}"))
            });
        response.id = request.id;
        if results.send((idx, response)).is_err() {
            break;
        }
    }
    log::debug!("worker {idx}: exiting");
}

fn route(shared: Arc<Mutex<PoolState>>, results: Receiver<(usize, WorkerResponse)>) {
    for (idx, response) in results {
        let mut state = lock(&shared);
        let id = response.id.clone();
        state.resolve(&id, response.into_result());
        let next = if state.closed {
            None
        } else {
            state.queue.pop_front()
        };
        match next {
            Some(request) => state.dispatch(idx, request),
            None => state.busy[idx] = false,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone)]
    struct Echo;

    impl TaskHandler for Echo {
        fn handle(&self, request: &WorkerRequest) -> WorkerResponse {
            WorkerResponse::success(request.id.clone(), request.data.clone())
        }
    }

    #[test]
    fn echo_pool_resolves_handles() {
        let pool = Dispatcher::with_handler(2, Echo).expect("start pool");
        let handle = pool.submit(TaskKind::Triangulate, json!({ "n": 1 }));
        assert!(!handle.id().is_empty());
        assert_eq!(handle.wait().expect("echo"), json!({ "n": 1 }));
    }

    #[test]
    fn submit_after_shutdown_is_disconnected() {
        let mut pool = Dispatcher::with_handler(1, Echo).expect("start pool");
        pool.shutdown();
        pool.shutdown();
        let err = pool.submit(TaskKind::Simplify, json!({})).wait().unwrap_err();
        assert!(matches!(err, DispatchError::Disconnected { .. }));
        assert_eq!(pool.metrics().available_workers, 0);
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*a), "static");
        assert_eq!(panic_message(&*b), "owned");
    }
}
