//! Wire protocol between the dispatcher and its workers.
//!
//! Request: `{ "id", "type": "PROCESS_MESH" | "TRIANGULATE" | "SIMPLIFY" |
//! "CALCULATE_PROPERTIES", "data" }`. Response: `{ "id", "type": "SUCCESS" |
//! "ERROR", "data"?, "error"? }`. The id is echoed verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotforge_mesh::{GeometryProperties, MeshRequest, Point, ProcessedMesh};

use crate::error::DispatchError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    ProcessMesh,
    Triangulate,
    Simplify,
    CalculateProperties,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::ProcessMesh => "PROCESS_MESH",
            TaskKind::Triangulate => "TRIANGULATE",
            TaskKind::Simplify => "SIMPLIFY",
            TaskKind::CalculateProperties => "CALCULATE_PROPERTIES",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub data: Value,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerResponse {
    pub fn success(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            status: ResponseStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ResponseStatus::Error,
            data: None,
            error: Some(message.into()),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Success data, or [`DispatchError::Worker`] carrying the error text.
    pub fn into_result(self) -> Result<Value, DispatchError> {
        match self.status {
            ResponseStatus::Success => Ok(self.data.unwrap_or(Value::Null)),
            ResponseStatus::Error => Err(DispatchError::Worker {
                reason: self
                    .error
                    .unwrap_or_else(|| "worker reported an error without a message".into()),
            }),
        }
    }
}

/// `data` of `TRIANGULATE` and `CALCULATE_PROPERTIES`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointsPayload {
    pub points: Vec<Point>,
}

/// `data` of `SIMPLIFY`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyPayload {
    pub points: Vec<Point>,
    pub target_count: usize,
}

/// Success `data` of `TRIANGULATE`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrianglesPayload {
    pub triangles: Vec<u32>,
}

/// Typed form of a task, for callers that do not want to build JSON by hand.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    ProcessMesh(MeshRequest),
    Triangulate { points: Vec<Point> },
    Simplify { points: Vec<Point>, target_count: usize },
    CalculateProperties { points: Vec<Point> },
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::ProcessMesh(_) => TaskKind::ProcessMesh,
            Task::Triangulate { .. } => TaskKind::Triangulate,
            Task::Simplify { .. } => TaskKind::Simplify,
            Task::CalculateProperties { .. } => TaskKind::CalculateProperties,
        }
    }

    /// Encode as the request `data` value.
    pub fn to_payload(&self) -> Result<Value, DispatchError> {
        let value = match self {
            Task::ProcessMesh(request) => serde_json::to_value(request)?,
            Task::Triangulate { points } | Task::CalculateProperties { points } => {
                serde_json::to_value(PointsPayload {
                    points: points.clone(),
                })?
            }
            Task::Simplify {
                points,
                target_count,
            } => serde_json::to_value(SimplifyPayload {
                points: points.clone(),
                target_count: *target_count,
            })?,
        };
        Ok(value)
    }
}

/// Decoded success data.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskOutput {
    Mesh(ProcessedMesh),
    Triangles(Vec<u32>),
    Points(Vec<Point>),
    Properties(GeometryProperties),
}

impl TaskOutput {
    pub fn decode(kind: TaskKind, data: Value) -> Result<Self, DispatchError> {
        let output = match kind {
            TaskKind::ProcessMesh => TaskOutput::Mesh(serde_json::from_value(data)?),
            TaskKind::Triangulate => {
                let payload: TrianglesPayload = serde_json::from_value(data)?;
                TaskOutput::Triangles(payload.triangles)
            }
            TaskKind::Simplify => {
                let payload: PointsPayload = serde_json::from_value(data)?;
                TaskOutput::Points(payload.points)
            }
            TaskKind::CalculateProperties => TaskOutput::Properties(serde_json::from_value(data)?),
        };
        Ok(output)
    }

    pub fn into_mesh(self) -> Option<ProcessedMesh> {
        match self {
            TaskOutput::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn into_properties(self) -> Option<GeometryProperties> {
        match self {
            TaskOutput::Properties(props) => Some(props),
            _ => None,
        }
    }
}
