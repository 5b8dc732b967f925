//! Structural diff between two board snapshots
//!
//! Each surviving column or task is checked for field changes and for a
//! change of place independently, so one entity can show up in both the
//! `updated` and `moved` lists of the same diff. Added and removed entities
//! never appear anywhere else.
//!
//! Tasks are matched by id across the whole board, not per column, so a
//! task that changes column is a move rather than a remove plus an add.

use std::collections::HashMap;

use serde::Serialize;

use crate::board::{Board, Column};
use crate::task::TaskRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnAdded {
    pub column_id: String,
    pub to_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRemoved {
    pub column_id: String,
    pub from_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnUpdated {
    pub column_id: String,
    pub changed_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMoved {
    pub column_id: String,
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAdded {
    pub task_id: String,
    pub column_id: String,
    pub to_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRemoved {
    pub task_id: String,
    pub column_id: String,
    pub from_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdated {
    pub task_id: String,
    pub column_id: String,
    pub changed_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMoved {
    pub task_id: String,
    pub from_column_id: String,
    pub to_column_id: String,
    pub from_index: usize,
    pub to_index: usize,
}

/// Everything that changed between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDiff {
    pub metadata_changed: bool,
    pub columns_added: Vec<ColumnAdded>,
    pub columns_removed: Vec<ColumnRemoved>,
    pub columns_updated: Vec<ColumnUpdated>,
    pub columns_moved: Vec<ColumnMoved>,
    pub tasks_added: Vec<TaskAdded>,
    pub tasks_removed: Vec<TaskRemoved>,
    pub tasks_updated: Vec<TaskUpdated>,
    pub tasks_moved: Vec<TaskMoved>,
}

impl BoardDiff {
    pub fn is_empty(&self) -> bool {
        !self.metadata_changed
            && self.columns_added.is_empty()
            && self.columns_removed.is_empty()
            && self.columns_updated.is_empty()
            && self.columns_moved.is_empty()
            && self.tasks_added.is_empty()
            && self.tasks_removed.is_empty()
            && self.tasks_updated.is_empty()
            && self.tasks_moved.is_empty()
    }
}

/// Compare two boards.
pub fn diff(previous: &Board, next: &Board) -> BoardDiff {
    let mut out = BoardDiff {
        metadata_changed: metadata_changed(previous, next),
        ..BoardDiff::default()
    };
    diff_columns(previous, next, &mut out);
    diff_tasks(previous, next, &mut out);
    out
}

fn metadata_changed(previous: &Board, next: &Board) -> bool {
    previous.title != next.title
        || previous.version != next.version
        || previous.agent_instructions != next.agent_instructions
        || previous.rules != next.rules
        || previous.stats != next.stats
}

fn index_columns(board: &Board) -> HashMap<&str, (usize, &Column)> {
    let mut map = HashMap::new();
    for (index, column) in board.columns.iter().enumerate() {
        map.entry(column.id.as_str()).or_insert((index, column));
    }
    map
}

fn column_changes(previous: &Column, next: &Column) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if previous.title != next.title {
        changed.push("title");
    }
    if previous.order != next.order {
        changed.push("order");
    }
    changed
}

fn diff_columns(previous: &Board, next: &Board, out: &mut BoardDiff) {
    let before = index_columns(previous);
    let after = index_columns(next);

    for (index, column) in previous.columns.iter().enumerate() {
        if !after.contains_key(column.id.as_str()) && before[column.id.as_str()].0 == index {
            out.columns_removed.push(ColumnRemoved {
                column_id: column.id.clone(),
                from_index: index,
            });
        }
    }

    for (to_index, column) in next.columns.iter().enumerate() {
        if after[column.id.as_str()].0 != to_index {
            continue;
        }
        let Some(&(from_index, old)) = before.get(column.id.as_str()) else {
            out.columns_added.push(ColumnAdded {
                column_id: column.id.clone(),
                to_index,
            });
            continue;
        };

        let changed_fields = column_changes(old, column);
        if !changed_fields.is_empty() {
            out.columns_updated.push(ColumnUpdated {
                column_id: column.id.clone(),
                changed_fields,
            });
        }
        if from_index != to_index {
            out.columns_moved.push(ColumnMoved {
                column_id: column.id.clone(),
                from_index,
                to_index,
            });
        }
    }
}

struct TaskSlot<'a> {
    task: &'a TaskRecord,
    column_id: &'a str,
    index: usize,
}

/// Index tasks by id across all columns; the first occurrence wins.
fn index_tasks(board: &Board) -> (Vec<&str>, HashMap<&str, TaskSlot<'_>>) {
    let mut order = Vec::new();
    let mut map = HashMap::new();
    for column in &board.columns {
        for (index, task) in column.tasks.iter().enumerate() {
            if map.contains_key(task.id.as_str()) {
                continue;
            }
            order.push(task.id.as_str());
            map.insert(
                task.id.as_str(),
                TaskSlot {
                    task,
                    column_id: column.id.as_str(),
                    index,
                },
            );
        }
    }
    (order, map)
}

/// Watched fields that differ between two versions of a task
pub fn task_changes(previous: &TaskRecord, next: &TaskRecord) -> Vec<&'static str> {
    let mut changed = Vec::new();
    let mut check = |name: &'static str, differs: bool| {
        if differs {
            changed.push(name);
        }
    };
    check("title", previous.title != next.title);
    check("description", previous.description != next.description);
    check("relatedFiles", previous.related_files != next.related_files);
    check("assignee", previous.assignee != next.assignee);
    check("tags", previous.tags != next.tags);
    check("priority", previous.priority != next.priority);
    check("dueDate", previous.due_date != next.due_date);
    check("subtasks", previous.subtasks != next.subtasks);
    check("template", previous.template != next.template);
    changed
}

fn diff_tasks(previous: &Board, next: &Board, out: &mut BoardDiff) {
    let (before_order, before) = index_tasks(previous);
    let (after_order, after) = index_tasks(next);

    for id in before_order {
        if after.contains_key(id) {
            continue;
        }
        let slot = &before[id];
        out.tasks_removed.push(TaskRemoved {
            task_id: id.to_string(),
            column_id: slot.column_id.to_string(),
            from_index: slot.index,
        });
    }

    for id in after_order {
        let slot = &after[id];
        let Some(old) = before.get(id) else {
            out.tasks_added.push(TaskAdded {
                task_id: id.to_string(),
                column_id: slot.column_id.to_string(),
                to_index: slot.index,
            });
            continue;
        };

        if old.column_id != slot.column_id || old.index != slot.index {
            out.tasks_moved.push(TaskMoved {
                task_id: id.to_string(),
                from_column_id: old.column_id.to_string(),
                to_column_id: slot.column_id.to_string(),
                from_index: old.index,
                to_index: slot.index,
            });
        }

        let changed_fields = task_changes(old.task, slot.task);
        if !changed_fields.is_empty() {
            out.tasks_updated.push(TaskUpdated {
                task_id: id.to_string(),
                column_id: slot.column_id.to_string(),
                changed_fields,
            });
        }
    }
}
