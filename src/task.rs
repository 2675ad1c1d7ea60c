// THEORY:
// The `task` module holds the data model handed to the audit by the task source.
// A `Task` is one unit of crowd-sourced labeling work tied to a single image; its
// `Annotation`s are the bounding boxes the labeler drew on that image.
//
// The annotation service speaks a nested JSON shape (`params.attachment`,
// `response.annotations`). That wire shape is captured by `TaskRecord` and
// flattened into `Task` once at the boundary, so the checks only ever see the
// flat, immutable model.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Lifecycle state of a labeling task. Only completed tasks are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    #[serde(other)]
    Other,
}

/// Free-form attributes a labeler attached to a bounding box.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub occlusion: Option<String>,
    #[serde(default)]
    pub truncation: Option<String>,
    /// The labeler's claim about the sign's background color, e.g. `"orange"`.
    #[serde(default)]
    pub background_color: Option<String>,
    /// Any attribute the audit does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One labeled bounding box within a task's image.
///
/// Offsets are kept as delivered (the service may send fractional pixels);
/// they are truncated to whole pixels when a check builds a `BoundingBox`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Annotation {
    pub uuid: String,
    pub label: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub attributes: Attributes,
}

/// One unit of labeling work. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub image_url: String,
    pub annotations: Vec<Annotation>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// The task as the annotation service serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub project: Option<String>,
    pub params: TaskParams,
    #[serde(default)]
    pub response: Option<TaskResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskParams {
    pub attachment: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.task_id,
            status: record.status,
            image_url: record.params.attachment,
            annotations: record
                .response
                .map(|response| response.annotations)
                .unwrap_or_default(),
        }
    }
}
