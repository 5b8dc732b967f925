//! Board snapshots and reconstruction
//!
//! A [`Board`] is the single-document shape of a kanban board: metadata
//! plus columns with their tasks embedded. In the file-per-task layout the
//! config file holds only the metadata and columns, and
//! [`build_full_board`] reassembles the embedded shape from the active
//! task directory.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::config;
use crate::error::{Error, Result};
use crate::store;
use crate::task::{compare_positions, TaskFilter, TaskRecord};
use crate::workspace::Workspace;

/// Column that collects tasks with a missing or unknown column
pub const FALLBACK_COLUMN: &str = "todo";

pub const DESCRIPTION_HEADING: &str = "Description";
pub const LOG_HEADING: &str = "Log";

/// A board with its columns and (optionally) embedded tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Explicit "done" marker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub completion: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskRecord>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Board {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Columns for a freshly initialized board
    pub fn default_columns() -> Vec<Column> {
        let mut done = Column::new("done", "Done");
        done.completion = true;
        vec![
            Column::new("todo", "To Do"),
            Column::new("doing", "Doing"),
            done,
        ]
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    /// The column representing "done": flagged explicitly, or else the
    /// first column whose id or title reads like a completion state.
    pub fn completion_column(&self) -> Option<&Column> {
        const NAMES: [&str; 4] = ["done", "complete", "completed", "archive"];
        self.columns
            .iter()
            .find(|column| column.completion)
            .or_else(|| {
                self.columns.iter().find(|column| {
                    NAMES.iter().any(|name| {
                        column.id.trim().eq_ignore_ascii_case(name)
                            || column.title.trim().eq_ignore_ascii_case(name)
                    })
                })
            })
    }

    /// Copy of the board with every column's tasks removed
    pub fn without_tasks(&self) -> Board {
        let mut board = self.clone();
        for column in &mut board.columns {
            column.tasks.clear();
        }
        board
    }
}

/// Reassemble the full board from the config and the active directory.
///
/// Tasks are bucketed by column and ordered by position, then id, so the
/// result does not depend on directory iteration order.
pub fn build_full_board(config_path: impl AsRef<Path>) -> Result<Board> {
    let config_path = config_path.as_ref();
    let workspace = Workspace::resolve(config_path);
    let mut board = config::read_config(config_path)?;

    let known: HashSet<String> = board.columns.iter().map(|column| column.id.clone()).collect();
    let mut buckets: HashMap<String, Vec<TaskRecord>> = HashMap::new();

    for task in store::list_dir(&workspace.active_dir, &TaskFilter::default()) {
        let mut record = task.record;
        if record.description.is_none() {
            record.description = extract_section(&task.body, DESCRIPTION_HEADING)
                .filter(|description| !description.is_empty());
        }
        let column = match record.column.as_deref() {
            Some(column) if known.contains(column) => column.to_string(),
            _ => FALLBACK_COLUMN.to_string(),
        };
        buckets.entry(column).or_default().push(record);
    }

    if buckets.contains_key(FALLBACK_COLUMN) && !known.contains(FALLBACK_COLUMN) {
        tracing::debug!("adding implicit '{FALLBACK_COLUMN}' column for unplaced tasks");
        board.columns.push(Column::new(FALLBACK_COLUMN, "To Do"));
    }

    for column in &mut board.columns {
        let mut tasks = buckets.remove(&column.id).unwrap_or_default();
        tasks.sort_by(|left, right| {
            compare_positions(left.position, right.position).then_with(|| left.id.cmp(&right.id))
        });
        column.tasks = tasks;
    }

    Ok(board)
}

/// Load a board in either layout.
pub fn load_board(config_path: impl AsRef<Path>) -> Result<Board> {
    let config_path = config_path.as_ref();
    if Workspace::resolve(config_path).is_v2() {
        return build_full_board(config_path);
    }
    Ok(read_legacy_board(config_path)?.fields)
}

/// Parse a single-document board, tasks embedded, keeping its body.
pub fn read_legacy_board(path: &Path) -> Result<codec::Document<Board>> {
    let content = fs::read_to_string(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
    let mut doc = codec::parse::<Board>(&content).ok_or_else(|| {
        Error::InvalidConfig(format!("{}: missing or malformed front matter", path.display()))
    })?;
    for warning in config::normalize_columns(&mut doc.fields) {
        tracing::warn!(path = %path.display(), "{warning}");
    }
    Ok(doc)
}

/// Canonical text form of a board, used for hashing and legacy writes.
pub fn serialize_board(board: &Board) -> Result<String> {
    codec::serialize(board, "")
}

/// Text under `## {heading}` up to the next `## ` heading, trimmed.
/// `None` when the heading is absent.
pub fn extract_section(body: &str, heading: &str) -> Option<String> {
    let marker = format!("## {heading}");
    let mut lines = body.lines();
    lines.by_ref().find(|line| line.trim_end() == marker)?;

    let section: Vec<&str> = lines.take_while(|line| !line.starts_with("## ")).collect();
    Some(section.join("\n").trim().to_string())
}

/// Build a body from a description and a log, in that order. Blank parts
/// are omitted; the result is empty or ends with exactly one newline.
pub fn compose_body(description: Option<&str>, log: Option<&str>) -> String {
    let sections: Vec<String> = [(DESCRIPTION_HEADING, description), (LOG_HEADING, log)]
        .into_iter()
        .filter_map(|(heading, content)| {
            let content = content.map(str::trim).filter(|content| !content.is_empty())?;
            Some(format!("## {heading}\n{content}"))
        })
        .collect();

    if sections.is_empty() {
        return String::new();
    }
    let mut body = sections.join("\n\n");
    body.push('\n');
    body
}
