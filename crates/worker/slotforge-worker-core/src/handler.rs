//! Worker-side request handling.
//!
//! [`handle_request`] is the whole body of a worker: the native pool runs it on
//! its threads and the wasm crate runs it inside browser web workers.

use serde_json::Value;
use slotforge_mesh::{properties, simplify::simplify_with_factor, triangulate, MeshProcessor, MeshRequest};

use crate::error::DispatchError;
use crate::protocol::{
    PointsPayload, SimplifyPayload, TaskKind, TrianglesPayload, WorkerRequest, WorkerResponse,
};

/// What a worker does with a request. The default is [`MeshTaskHandler`].
pub trait TaskHandler: Send + Sync + 'static {
    fn handle(&self, request: &WorkerRequest) -> WorkerResponse;
}

/// Serves the four mesh task kinds with one [`MeshProcessor`].
#[derive(Clone, Debug, Default)]
pub struct MeshTaskHandler {
    processor: MeshProcessor,
}

impl MeshTaskHandler {
    pub fn new(processor: MeshProcessor) -> Self {
        Self { processor }
    }
}

impl TaskHandler for MeshTaskHandler {
    fn handle(&self, request: &WorkerRequest) -> WorkerResponse {
        handle_request(&self.processor, request)
    }
}

/// Run one request. Never panics on bad input: malformed payloads come back as
/// `ERROR` responses carrying the same id.
pub fn handle_request(processor: &MeshProcessor, request: &WorkerRequest) -> WorkerResponse {
    match execute(processor, request.kind, &request.data) {
        Ok(data) => WorkerResponse::success(request.id.clone(), data),
        Err(err) => {
            log::debug!(
                "worker: {} {} failed: {err}",
                request.kind.as_str(),
                request.id
            );
            WorkerResponse::error(request.id.clone(), err.to_string())
        }
    }
}

/// Text-in/text-out form of [`handle_request`] for message-passing hosts.
///
/// A message that is not a valid request still gets an `ERROR` response; its id
/// is recovered from the raw JSON when present.
pub fn handle_message(processor: &MeshProcessor, message: &str) -> String {
    let response = match serde_json::from_str::<WorkerRequest>(message) {
        Ok(request) => handle_request(processor, &request),
        Err(err) => {
            let id = serde_json::from_str::<Value>(message)
                .ok()
                .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_default();
            WorkerResponse::error(id, format!("malformed request: {err}"))
        }
    };
    serde_json::to_string(&response).unwrap_or_else(|err| {
        format!(r#"{{"id":"","type":"ERROR","error":"failed to encode response: {err}"}}"#)
    })
}

fn execute(processor: &MeshProcessor, kind: TaskKind, data: &Value) -> Result<Value, DispatchError> {
    let invalid = |err: serde_json::Error| DispatchError::InvalidPayload {
        kind,
        reason: err.to_string(),
    };
    let value = match kind {
        TaskKind::ProcessMesh => {
            let request: MeshRequest = serde_json::from_value(data.clone()).map_err(invalid)?;
            serde_json::to_value(processor.process(&request))?
        }
        TaskKind::Triangulate => {
            let payload: PointsPayload = serde_json::from_value(data.clone()).map_err(invalid)?;
            serde_json::to_value(TrianglesPayload {
                triangles: triangulate(&payload.points),
            })?
        }
        TaskKind::Simplify => {
            let payload: SimplifyPayload = serde_json::from_value(data.clone()).map_err(invalid)?;
            let points = simplify_with_factor(
                &payload.points,
                payload.target_count,
                processor.config().simplify_tolerance_factor,
            );
            serde_json::to_value(PointsPayload { points })?
        }
        TaskKind::CalculateProperties => {
            let payload: PointsPayload = serde_json::from_value(data.clone()).map_err(invalid)?;
            serde_json::to_value(properties(&payload.points))?
        }
    };
    Ok(value)
}
