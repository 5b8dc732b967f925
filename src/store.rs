//! Directory-backed task store
//!
//! Tasks live one per file in two directories:
//!
//! ```text
//! board/            # active tasks (have a column)
//!   task-1.md
//!   epic-1.md
//! logs/             # archived tasks (have completedAt)
//!   task-0.md
//! ```
//!
//! The directories are an unindexed key-value store keyed by task id.
//! Filenames are conventionally `{id}.md`; lookups fall back to scanning
//! when a file has been renamed. No locking is done: concurrent writers
//! are not arbitrated.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;

use crate::atomic;
use crate::codec;
use crate::error::{Error, Result};
use crate::task::{
    id_prefix_for, sort_by_column_and_position, NewTask, StoredTask, Subtask, SubtaskEntry,
    TaskFilter, TaskPatch, TaskRecord,
};
use crate::workspace::Workspace;

/// Extension of task record files
pub const RECORD_EXTENSION: &str = "md";

/// Heading of the append-only note section
pub const LOG_HEADING: &str = "## Log";

/// Heading rendered into an epic's body when it is completed
pub const CHILD_TASKS_HEADING: &str = "## Child Tasks";

const NO_CHILD_TASKS: &str = "No child tasks recorded.";

/// Which directory a task was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Active,
    Archived,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskLocation {
    pub state: TaskState,
    pub task: StoredTask,
}

/// Task store over an active and an archive directory
#[derive(Debug, Clone)]
pub struct TaskStore {
    active_dir: PathBuf,
    archive_dir: PathBuf,
}

impl TaskStore {
    pub fn new(active_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            active_dir: active_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn for_workspace(workspace: &Workspace) -> Self {
        Self::new(&workspace.active_dir, &workspace.archive_dir)
    }

    pub fn active_dir(&self) -> &Path {
        &self.active_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Next free `{prefix}-N` id across both directories
    pub fn next_id(&self, prefix: &str) -> String {
        next_id(&self.active_dir, Some(self.archive_dir.as_path()), prefix)
    }

    /// Create a task file in the active directory.
    pub fn create(&self, input: NewTask, body: &str) -> Result<StoredTask> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }
        let column = input.column.trim();
        if column.is_empty() {
            return Err(Error::Validation("column cannot be empty".to_string()));
        }

        let id = match input.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                validate_id(id)?;
                if self.locate(id).is_some() {
                    return Err(Error::Validation(format!("task id already exists: {id}")));
                }
                id.to_string()
            }
            _ => self.next_id(&id_prefix_for(input.kind.as_deref())),
        };

        let path = record_path(&self.active_dir, &id);
        if path.exists() {
            return Err(Error::Validation(format!(
                "file already exists: {}",
                path.display()
            )));
        }

        let subtasks = input
            .subtasks
            .iter()
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .enumerate()
            .map(|(index, title)| {
                SubtaskEntry::Item(Subtask {
                    id: format!("{id}-{}", index + 1),
                    title: title.to_string(),
                    completed: false,
                })
            })
            .collect();

        let record = TaskRecord {
            id: id.clone(),
            title: title.to_string(),
            description: input.description,
            column: Some(column.to_string()),
            position: input.position,
            priority: input.priority,
            tags: input.tags,
            assignee: input.assignee,
            due_date: input.due_date,
            related_files: input.related_files,
            subtasks,
            template: input.template,
            contract: input.contract,
            parent_id: input.parent_id,
            kind: input.kind,
            created_at: Some(Utc::now()),
            ..TaskRecord::default()
        };

        let task = StoredTask {
            path,
            record,
            body: body.to_string(),
        };
        write_task(&task)?;
        tracing::debug!(id = %id, path = %task.path.display(), "created task");
        Ok(task)
    }

    /// Change a task's column and, when given, its position.
    pub fn move_task(&self, path: &Path, column: &str, position: Option<f64>) -> Result<StoredTask> {
        let column = column.trim();
        if column.is_empty() {
            return Err(Error::Validation("column cannot be empty".to_string()));
        }

        let mut task = read_task(path)?;
        task.record.column = Some(column.to_string());
        if let Some(position) = position {
            task.record.position = Some(position);
        }
        task.record.touch();
        write_task(&task)?;
        tracing::debug!(id = %task.id(), column, "moved task");
        Ok(task)
    }

    /// Archive a task: strip column/position, stamp completedAt, and move
    /// the file into the archive directory under the same file name.
    pub fn complete(&self, path: &Path) -> Result<StoredTask> {
        let mut task = read_task(path)?;
        let now = Utc::now();
        task.record.column = None;
        task.record.position = None;
        task.record.completed_at = Some(now);
        task.record.updated_at = Some(now);

        if task.record.is_epic() {
            let children = self.resolve_children(&task.record);
            task.body = append_section(&task.body, &render_child_tasks(&children));
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))?;
        let dest = self.archive_dir.join(file_name);
        fs::create_dir_all(&self.archive_dir)?;

        let content = codec::serialize(&task.record, &task.body)?;
        atomic::relocate(path, &dest, &content)?;
        tracing::debug!(id = %task.id(), dest = %dest.display(), "archived task");

        task.path = dest;
        Ok(task)
    }

    /// Remove a task file from whichever directory holds it.
    pub fn delete(&self, path: &Path) -> Result<StoredTask> {
        let task = read_task(path)?;
        fs::remove_file(path)?;
        tracing::debug!(id = %task.id(), path = %path.display(), "deleted task");
        Ok(task)
    }

    /// Add a timestamped line to the task's `## Log` section, newest first.
    pub fn append_note(&self, path: &Path, text: &str, author: Option<&str>) -> Result<StoredTask> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("note text cannot be empty".to_string()));
        }

        let mut task = read_task(path)?;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let entry = match author.map(str::trim).filter(|author| !author.is_empty()) {
            Some(author) => format!("- {timestamp} [{author}]: {text}"),
            None => format!("- {timestamp}: {text}"),
        };
        task.body = insert_log_entry(&task.body, &entry);
        task.record.touch();
        write_task(&task)?;
        Ok(task)
    }

    /// Apply field edits in place.
    pub fn update(&self, path: &Path, patch: TaskPatch) -> Result<StoredTask> {
        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(Error::Validation("title cannot be empty".to_string()));
            }
        }

        let mut task = read_task(path)?;
        patch.apply(&mut task.record);
        task.record.touch();
        write_task(&task)?;
        Ok(task)
    }

    /// Mark one subtask complete or incomplete.
    pub fn set_subtask(&self, path: &Path, subtask_id: &str, completed: bool) -> Result<StoredTask> {
        let mut task = read_task(path)?;
        let item = task
            .record
            .subtasks
            .iter_mut()
            .find_map(|entry| match entry {
                SubtaskEntry::Item(item) if item.id == subtask_id => Some(item),
                _ => None,
            })
            .ok_or_else(|| Error::TaskNotFound(subtask_id.to_string()))?;
        item.completed = completed;
        task.record.touch();
        write_task(&task)?;
        Ok(task)
    }

    pub fn list(&self, filter: &TaskFilter) -> Vec<StoredTask> {
        list_dir(&self.active_dir, filter)
    }

    pub fn list_archived(&self, filter: &TaskFilter) -> Vec<StoredTask> {
        list_dir(&self.archive_dir, filter)
    }

    pub fn find(&self, id: &str) -> Option<StoredTask> {
        find_in_dir(&self.active_dir, id)
    }

    pub fn find_archived(&self, id: &str) -> Option<StoredTask> {
        find_in_dir(&self.archive_dir, id)
    }

    /// Look a task up in the active directory, then the archive.
    pub fn locate(&self, id: &str) -> Option<TaskLocation> {
        if let Some(task) = self.find(id) {
            return Some(TaskLocation {
                state: TaskState::Active,
                task,
            });
        }
        self.find_archived(id).map(|task| TaskLocation {
            state: TaskState::Archived,
            task,
        })
    }

    pub fn search(&self, query: &str) -> Result<Vec<StoredTask>> {
        search_dir(&self.active_dir, query)
    }

    pub fn search_archived(&self, query: &str) -> Result<Vec<StoredTask>> {
        search_dir(&self.archive_dir, query)
    }

    /// Children of an epic as `(id, title)` pairs.
    ///
    /// Records linked through `parentId` win; otherwise the epic's own
    /// `subtasks` ids are resolved to titles, dropping unknown ids.
    fn resolve_children(&self, epic: &TaskRecord) -> Vec<(String, String)> {
        let mut all = scan_dir(&self.active_dir);
        all.extend(scan_dir(&self.archive_dir));

        let linked: Vec<(String, String)> = all
            .iter()
            .filter(|task| task.record.id != epic.id)
            .filter(|task| task.record.parent_id.as_deref() == Some(epic.id.as_str()))
            .map(|task| (task.record.id.clone(), task.record.title.clone()))
            .collect();
        if !linked.is_empty() {
            return linked;
        }

        let mut titles: HashMap<&str, &str> = HashMap::new();
        for task in &all {
            titles
                .entry(task.record.id.as_str())
                .or_insert(task.record.title.as_str());
        }

        let mut seen = HashSet::new();
        epic.subtasks
            .iter()
            .map(SubtaskEntry::id)
            .filter(|id| seen.insert(*id))
            .filter_map(|id| {
                titles
                    .get(id)
                    .map(|title| (id.to_string(), title.to_string()))
            })
            .collect()
    }
}

/// Expected path of a record: `{dir}/{id}.md`
pub fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.{RECORD_EXTENSION}"))
}

pub(crate) fn validate_id(id: &str) -> Result<()> {
    if id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(Error::Validation(format!("invalid task id: {id}")));
    }
    Ok(())
}

/// Read and parse one record file.
pub fn read_task(path: &Path) -> Result<StoredTask> {
    let content = fs::read_to_string(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
    let doc = codec::parse_record(&content).ok_or_else(|| Error::InvalidRecord(path.to_path_buf()))?;
    Ok(StoredTask {
        path: path.to_path_buf(),
        record: doc.fields,
        body: doc.body,
    })
}

/// Serialize a task back to its own path.
pub fn write_task(task: &StoredTask) -> Result<()> {
    let content = codec::serialize(&task.record, &task.body)?;
    atomic::write_atomic_str(&task.path, &content)
}

/// All valid records in `dir`, in file-name order. Invalid files are
/// skipped; a missing directory yields nothing.
fn scan_dir(dir: &Path) -> Vec<StoredTask> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "task directory not readable");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == RECORD_EXTENSION)
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| match read_task(path) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping task file");
                None
            }
        })
        .collect()
}

/// Next `{prefix}-N` id, scanning the active and (optionally) archive
/// directories for the highest existing N.
pub fn next_id(active_dir: &Path, archive_dir: Option<&Path>, prefix: &str) -> String {
    let pattern = format!(r"^{}-(\d+)$", regex::escape(prefix));
    let max = match Regex::new(&pattern) {
        Ok(re) => {
            let mut tasks = scan_dir(active_dir);
            if let Some(archive_dir) = archive_dir {
                tasks.extend(scan_dir(archive_dir));
            }
            tasks
                .iter()
                .filter_map(|task| re.captures(&task.record.id))
                .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
                .max()
                .unwrap_or(0)
        }
        Err(_) => 0,
    };
    format!("{prefix}-{}", max + 1)
}

/// List records in `dir` matching `filter`, sorted by column then position.
pub fn list_dir(dir: &Path, filter: &TaskFilter) -> Vec<StoredTask> {
    let mut tasks: Vec<StoredTask> = scan_dir(dir)
        .into_iter()
        .filter(|task| filter.matches(&task.record))
        .collect();
    sort_by_column_and_position(&mut tasks);
    tasks
}

/// Find a record by id: try `{dir}/{id}.md`, then scan every file.
pub fn find_in_dir(dir: &Path, id: &str) -> Option<StoredTask> {
    if validate_id(id).is_ok() {
        let path = record_path(dir, id);
        if let Ok(task) = read_task(&path) {
            if task.record.id == id {
                return Some(task);
            }
            tracing::debug!(path = %path.display(), found = %task.record.id, "file name does not match id");
        }
    }

    scan_dir(dir).into_iter().find(|task| task.record.id == id)
}

/// Case-insensitive substring search over title, description, body, and tags.
pub fn search_dir(dir: &Path, query: &str) -> Result<Vec<StoredTask>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(Error::Validation("search query cannot be empty".to_string()));
    }

    let contains = |text: &str| text.to_lowercase().contains(&needle);
    Ok(scan_dir(dir)
        .into_iter()
        .filter(|task| {
            contains(&task.record.title)
                || task.record.description.as_deref().map(contains).unwrap_or(false)
                || contains(&task.body)
                || task.record.tags.iter().any(|tag| contains(tag))
        })
        .collect())
}

/// Insert a log line directly under `## Log`, or start the section.
fn insert_log_entry(body: &str, entry: &str) -> String {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim_end() == LOG_HEADING {
            let mut out = String::with_capacity(body.len() + entry.len() + 2);
            out.push_str(&body[..end]);
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(entry);
            out.push('\n');
            out.push_str(&body[end..]);
            return out;
        }
        offset = end;
    }

    let mut out = if body.trim().is_empty() {
        String::new()
    } else {
        body.to_string()
    };
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        if !out.ends_with("\n\n") {
            out.push('\n');
        }
    }
    out.push_str(LOG_HEADING);
    out.push('\n');
    out.push_str(entry);
    out.push('\n');
    out
}

fn render_child_tasks(children: &[(String, String)]) -> String {
    let mut out = String::from(CHILD_TASKS_HEADING);
    out.push('\n');
    if children.is_empty() {
        out.push_str(NO_CHILD_TASKS);
        out.push('\n');
    }
    for (id, title) in children {
        out.push_str(&format!("- {id}: {title}\n"));
    }
    out
}

/// Append a section to a body with one blank line between them.
fn append_section(body: &str, section: &str) -> String {
    let trimmed = body.trim_end();
    if trimmed.is_empty() {
        return section.to_string();
    }
    format!("{trimmed}\n\n{section}")
}
