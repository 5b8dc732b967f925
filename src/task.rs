//! Task records.
//!
//! One task is one markdown file: the fields below live in the YAML front
//! matter, and free text (description, log) lives in the body. Field names
//! are camelCase on disk.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default id prefix for untyped records
pub const DEFAULT_ID_PREFIX: &str = "task";

/// Document type whose completion renders a child task summary
pub const EPIC_TYPE: &str = "epic";

/// A checklist item owned by a task. Ids are `{taskId}-{n}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// An entry of the `subtasks` field.
///
/// Regular tasks carry full items. Epics may instead list bare task ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubtaskEntry {
    Id(String),
    Item(Subtask),
}

impl SubtaskEntry {
    pub fn id(&self) -> &str {
        match self {
            SubtaskEntry::Id(id) => id,
            SubtaskEntry::Item(item) => &item.id,
        }
    }
}

/// Front-matter fields of one task file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present only while the task is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Sort key within the column, not a dense index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Opaque metadata, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Present only once the task is archived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Unknown keys, preserved across rewrites
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TaskRecord {
    pub fn is_active(&self) -> bool {
        self.column.is_some()
    }

    pub fn is_archived(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_epic(&self) -> bool {
        self.kind
            .as_deref()
            .map(|kind| kind.trim().eq_ignore_ascii_case(EPIC_TYPE))
            .unwrap_or(false)
    }

    /// Id prefix derived from the document type (`epic` gives `epic-N`)
    pub fn id_prefix(&self) -> String {
        id_prefix_for(self.kind.as_deref())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

pub fn id_prefix_for(kind: Option<&str>) -> String {
    match kind.map(str::trim) {
        Some(kind) if !kind.is_empty() => kind.to_lowercase(),
        _ => DEFAULT_ID_PREFIX.to_string(),
    }
}

/// Compare two optional positions; missing positions sort last.
pub fn compare_positions(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A task record together with its body and the file it was read from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredTask {
    pub path: PathBuf,
    #[serde(flatten)]
    pub record: TaskRecord,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl StoredTask {
    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Caller-supplied id; generated from the type prefix when absent
    pub id: Option<String>,
    pub title: String,
    pub column: String,
    pub position: Option<f64>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub related_files: Vec<String>,
    /// Subtask titles; ids are assigned as `{id}-{n}`
    pub subtasks: Vec<String>,
    pub template: Option<String>,
    pub contract: Option<serde_json::Value>,
    pub parent_id: Option<String>,
    pub kind: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            column: column.into(),
            ..Self::default()
        }
    }
}

/// Field edits applied by `TaskStore::update`. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub related_files: Option<Vec<String>>,
    pub template: Option<String>,
    pub contract: Option<serde_json::Value>,
    pub parent_id: Option<String>,
}

impl TaskPatch {
    pub fn apply(self, record: &mut TaskRecord) {
        if let Some(title) = self.title {
            record.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(priority) = self.priority {
            record.priority = Some(priority);
        }
        if let Some(tags) = self.tags {
            record.tags = tags;
        }
        if let Some(assignee) = self.assignee {
            record.assignee = Some(assignee);
        }
        if let Some(due_date) = self.due_date {
            record.due_date = Some(due_date);
        }
        if let Some(related_files) = self.related_files {
            record.related_files = related_files;
        }
        if let Some(template) = self.template {
            record.template = Some(template);
        }
        if let Some(contract) = self.contract {
            record.contract = Some(contract);
        }
        if let Some(parent_id) = self.parent_id {
            record.parent_id = Some(parent_id);
        }
    }
}

/// Filters for listing. All set filters must match.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub column: Option<String>,
    pub tag: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub parent_id: Option<String>,
}

impl TaskFilter {
    pub fn column(column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &TaskRecord) -> bool {
        fn exact(want: &Option<String>, have: &Option<String>) -> bool {
            match want {
                Some(want) => have.as_deref() == Some(want.as_str()),
                None => true,
            }
        }

        exact(&self.column, &record.column)
            && exact(&self.priority, &record.priority)
            && exact(&self.assignee, &record.assignee)
            && exact(&self.parent_id, &record.parent_id)
            && self
                .tag
                .as_ref()
                .map(|tag| record.tags.iter().any(|candidate| candidate == tag))
                .unwrap_or(true)
    }
}

/// Sort by column id, then position (missing last). Stable.
pub fn sort_by_column_and_position(tasks: &mut [StoredTask]) {
    tasks.sort_by(|left, right| {
        left.record
            .column
            .cmp(&right.record.column)
            .then_with(|| compare_positions(left.record.position, right.record.position))
    });
}
