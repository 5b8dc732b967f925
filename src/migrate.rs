//! Conversion from a single-document board to the file-per-task layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::board::{compose_body, read_legacy_board, Board};
use crate::codec::Document;
use crate::config;
use crate::error::{Error, Result};
use crate::store::{self, record_path, validate_id};
use crate::task::{StoredTask, TaskRecord};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub config_path: PathBuf,
    pub active_dir: PathBuf,
    pub tasks_written: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Split a legacy board into one file per task.
///
/// Each embedded task is written to `board/{id}.md` with its column and
/// its index as position; its description moves into the body. Files are
/// staged in a temporary sibling directory that is renamed to `board/`
/// only once every task is written, and the config is rewritten without
/// tasks after that. Tasks without a title or with an id that is not a
/// plain file name are skipped.
pub fn split_legacy_board(config_path: impl AsRef<Path>) -> Result<MigrationReport> {
    let config_path = config_path.as_ref();
    let workspace = Workspace::resolve(config_path);
    if workspace.is_v2() {
        return Err(Error::Validation(format!(
            "{} already uses the file-per-task layout",
            workspace.config_dir.display()
        )));
    }

    let doc = read_legacy_board(config_path)?;
    let staging = tempfile::Builder::new()
        .prefix(".board-migrate-")
        .tempdir_in(&workspace.config_dir)?;

    let mut tasks_written = Vec::new();
    let mut skipped = Vec::new();
    for column in &doc.fields.columns {
        for (index, task) in column.tasks.iter().enumerate() {
            if task.title.trim().is_empty() {
                skipped.push(format!("{}[{index}]: task has no title", column.id));
                continue;
            }

            let mut record: TaskRecord = task.clone();
            if record.id.trim().is_empty() {
                record.id = store::next_id(
                    staging.path(),
                    Some(workspace.archive_dir.as_path()),
                    &record.id_prefix(),
                );
            }
            if let Err(err) = validate_id(&record.id) {
                skipped.push(format!("{}[{index}]: {err}", column.id));
                continue;
            }
            record.column = Some(column.id.clone());
            record.position = Some(index as f64);
            let body = compose_body(record.description.take().as_deref(), None);

            let path = record_path(staging.path(), &record.id);
            if path.exists() {
                skipped.push(format!("{}: duplicate id in legacy board", record.id));
                continue;
            }

            let stored = StoredTask { path, record, body };
            store::write_task(&stored)?;
            tracing::debug!(id = %stored.id(), "staged migrated task");
            tasks_written.push(stored.record.id);
        }
    }

    // The staging directory is gone after the rename; dropping the guard
    // afterwards is a no-op.
    fs::rename(staging.path(), &workspace.active_dir)?;
    drop(staging);

    if let Err(err) = finish(config_path, &workspace, &doc) {
        if let Err(cleanup) = fs::remove_dir_all(&workspace.active_dir) {
            tracing::warn!(dir = %workspace.active_dir.display(), error = %cleanup, "could not roll back migrated tasks");
        }
        return Err(err);
    }

    Ok(MigrationReport {
        config_path: config_path.to_path_buf(),
        active_dir: workspace.active_dir,
        tasks_written,
        skipped,
    })
}

fn finish(config_path: &Path, workspace: &Workspace, doc: &Document<Board>) -> Result<()> {
    workspace.ensure()?;
    config::save(config_path, &doc.fields, &doc.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{build_full_board, load_board};

    const LEGACY: &str = "---\ntitle: Legacy\ncolumns:\n- id: todo\n  title: To Do\n  tasks:\n  - id: task-1\n    title: One\n    description: First task\n  - id: task-2\n    title: Two\n    tags:\n    - bug\n- id: done\n  title: Done\n  tasks:\n  - id: task-3\n    title: Three\n---\n\nBoard notes\n";

    #[test]
    fn split_writes_one_file_per_task() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("board.md");
        fs::write(&config_path, LEGACY).expect("write");

        let before = load_board(&config_path).expect("legacy load");
        assert_eq!(before.task_count(), 3);

        let report = split_legacy_board(&config_path).expect("migrate");
        assert_eq!(report.tasks_written, vec!["task-1", "task-2", "task-3"]);
        assert!(dir.path().join("board").join("task-2.md").exists());

        let config_text = fs::read_to_string(&config_path).expect("read config");
        assert!(!config_text.contains("task-1"));
        assert!(config_text.ends_with("Board notes\n"));

        let after = build_full_board(&config_path).expect("rebuild");
        assert_eq!(after.task_count(), 3);
        assert_eq!(after.columns[0].tasks[0].description.as_deref(), Some("First task"));
        assert_eq!(after.columns[0].tasks[1].tags, vec!["bug".to_string()]);
        assert_eq!(after.columns[1].tasks[0].id, "task-3");
    }

    #[test]
    fn split_refuses_per_file_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("board.md");
        fs::write(&config_path, LEGACY).expect("write");
        fs::create_dir_all(dir.path().join("board")).expect("mkdir");

        let err = split_legacy_board(&config_path).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn split_generates_missing_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("board.md");
        fs::write(
            &config_path,
            "---\ntitle: L\ncolumns:\n- id: todo\n  title: To Do\n  tasks:\n  - title: Untitled id\n  - title: ''\n---\n",
        )
        .expect("write");

        let report = split_legacy_board(&config_path).expect("migrate");
        assert_eq!(report.tasks_written, vec!["task-1"]);
        assert_eq!(report.skipped.len(), 1);
    }
}
