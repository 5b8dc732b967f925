//! taskboard board command implementations.

use std::path::Path;

use serde::Serialize;

use crate::board::{load_board, Board};
use crate::cli::Context;
use crate::diff::{diff, BoardDiff};
use crate::error::Result;
use crate::hash::hash_board;
use crate::migrate::split_legacy_board;
use crate::output::{emit_success, HumanOutput};
use crate::workspace::Workspace;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashOutput {
    hash: String,
    per_file: bool,
    tasks: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffOutput {
    previous_hash: String,
    next_hash: String,
    identical: bool,
    diff: BoardDiff,
}

fn layout_name(config: &Path) -> &'static str {
    if Workspace::resolve(config).is_v2() {
        "file-per-task"
    } else {
        "single document"
    }
}

pub fn run_show(ctx: &Context) -> Result<()> {
    let board: Board = load_board(&ctx.config)?;

    let mut human = HumanOutput::new(if board.title.is_empty() {
        "Board".to_string()
    } else {
        board.title.clone()
    });
    human.field("Layout", layout_name(&ctx.config));
    human.field("Tasks", board.task_count().to_string());
    let completion = board.completion_column().map(|column| column.id.clone());
    for column in &board.columns {
        let marker = if completion.as_deref() == Some(column.id.as_str()) {
            " [done]"
        } else {
            ""
        };
        human.line(format!("{} ({}){marker}", column.title, column.tasks.len()));
        for task in &column.tasks {
            human.line(format!("  {} {}", task.id, task.title));
        }
    }

    emit_success(ctx.output(), "board show", &board, Some(&human))
}

pub fn run_hash(ctx: &Context) -> Result<()> {
    let board = load_board(&ctx.config)?;
    let output = HashOutput {
        hash: hash_board(&board)?,
        per_file: Workspace::resolve(&ctx.config).is_v2(),
        tasks: board.task_count(),
    };

    let mut human = HumanOutput::new(output.hash.clone());
    human.field("Tasks", output.tasks.to_string());
    emit_success(ctx.output(), "board hash", &output, Some(&human))
}

pub fn run_diff(ctx: &Context, other: &Path) -> Result<()> {
    let previous = load_board(&ctx.config)?;
    let next = load_board(other)?;

    let previous_hash = hash_board(&previous)?;
    let next_hash = hash_board(&next)?;
    let identical = previous_hash == next_hash;
    let result = if identical {
        BoardDiff::default()
    } else {
        diff(&previous, &next)
    };

    let mut human = HumanOutput::new(if identical || result.is_empty() {
        "No structural changes"
    } else {
        "Boards differ"
    });
    if result.metadata_changed {
        human.field("Metadata", "changed");
    }
    for added in &result.columns_added {
        human.line(format!("column added: {} at {}", added.column_id, added.to_index));
    }
    for removed in &result.columns_removed {
        human.line(format!("column removed: {}", removed.column_id));
    }
    for updated in &result.columns_updated {
        human.line(format!(
            "column updated: {} ({})",
            updated.column_id,
            updated.changed_fields.join(", ")
        ));
    }
    for moved in &result.columns_moved {
        human.line(format!(
            "column moved: {} {} -> {}",
            moved.column_id, moved.from_index, moved.to_index
        ));
    }
    for added in &result.tasks_added {
        human.line(format!("task added: {} in {}", added.task_id, added.column_id));
    }
    for removed in &result.tasks_removed {
        human.line(format!("task removed: {} from {}", removed.task_id, removed.column_id));
    }
    for updated in &result.tasks_updated {
        human.line(format!(
            "task updated: {} ({})",
            updated.task_id,
            updated.changed_fields.join(", ")
        ));
    }
    for moved in &result.tasks_moved {
        human.line(format!(
            "task moved: {} {}[{}] -> {}[{}]",
            moved.task_id, moved.from_column_id, moved.from_index, moved.to_column_id, moved.to_index
        ));
    }

    let output = DiffOutput {
        previous_hash,
        next_hash,
        identical,
        diff: result,
    };
    emit_success(ctx.output(), "board diff", &output, Some(&human))
}

pub fn run_migrate(ctx: &Context) -> Result<()> {
    let report = split_legacy_board(&ctx.config)?;

    let mut human = HumanOutput::new("Board migrated");
    human.field("Tasks written", report.tasks_written.len().to_string());
    human.field("Directory", report.active_dir.display().to_string());
    for skipped in &report.skipped {
        human.warning(skipped.clone());
    }
    emit_success(ctx.output(), "board migrate", &report, Some(&human))
}
