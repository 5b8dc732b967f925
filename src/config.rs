//! Board configuration loading
//!
//! The config file is a markdown document whose front matter declares the
//! board title, columns, rules, and agent instructions. In the
//! file-per-task layout it carries no tasks.
//!
//! ```text
//! ---
//! title: Sprint 12
//! columns:
//! - id: todo
//!   title: To Do
//! - id: done
//!   title: Done
//!   completion: true
//! agentInstructions: Keep tasks small.
//! ---
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::atomic;
use crate::board::Board;
use crate::codec;
use crate::error::{Error, Result};

/// Non-fatal problems found while loading a config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// A column id declared more than once; the first declaration is kept
    DuplicateColumn { id: String, index: usize },
    /// The config embeds tasks although the workspace stores them per file
    EmbeddedTasks { column: String, count: usize },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::DuplicateColumn { id, index } => {
                write!(f, "duplicate column '{id}' at index {index} ignored")
            }
            ConfigWarning::EmbeddedTasks { column, count } => {
                write!(f, "column '{column}' embeds {count} task(s); they are ignored")
            }
        }
    }
}

/// A parsed config together with the warnings raised while reading it
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub board: Board,
    pub body: String,
    pub warnings: Vec<ConfigWarning>,
}

/// Load and validate a board config, collecting warnings.
///
/// Every column comes back with an empty task list.
pub fn load(path: impl AsRef<Path>) -> Result<ConfigLoad> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
    let doc = codec::parse::<Board>(&content).ok_or_else(|| {
        Error::InvalidConfig(format!("{}: missing or malformed front matter", path.display()))
    })?;

    let mut board = doc.fields;
    let mut warnings = normalize_columns(&mut board);
    for column in &mut board.columns {
        if !column.tasks.is_empty() {
            warnings.push(ConfigWarning::EmbeddedTasks {
                column: column.id.clone(),
                count: column.tasks.len(),
            });
            column.tasks.clear();
        }
    }
    validate(&board)?;

    Ok(ConfigLoad {
        board,
        body: doc.body,
        warnings,
    })
}

/// Read a config as a board without tasks.
pub fn read_config(path: impl AsRef<Path>) -> Result<Board> {
    let loaded = load(path.as_ref())?;
    for warning in &loaded.warnings {
        tracing::warn!(path = %path.as_ref().display(), "{warning}");
    }
    Ok(loaded.board)
}

/// Write a config document, dropping any embedded tasks.
pub fn save(path: impl AsRef<Path>, board: &Board, body: &str) -> Result<()> {
    let content = codec::serialize(&board.without_tasks(), body)?;
    atomic::write_atomic_str(path, &content)
}

/// Drop repeated column ids, keeping the first declaration.
pub fn normalize_columns(board: &mut Board) -> Vec<ConfigWarning> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    let mut index = 0;
    board.columns.retain(|column| {
        let keep = seen.insert(column.id.clone());
        if !keep {
            warnings.push(ConfigWarning::DuplicateColumn {
                id: column.id.clone(),
                index,
            });
        }
        index += 1;
        keep
    });
    warnings
}

fn validate(board: &Board) -> Result<()> {
    for (index, column) in board.columns.iter().enumerate() {
        if column.id.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "columns[{index}].id cannot be empty"
            )));
        }
        if column.title.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "columns[{index}].title cannot be empty"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.md");
        fs::write(&path, content).expect("write config");
        (dir, path)
    }

    #[test]
    fn load_parses_columns_and_metadata() {
        let (_dir, path) = write_config(
            "---\ntitle: Sprint\nversion: 2\ncolumns:\n- id: todo\n  title: To Do\n- id: done\n  title: Done\n  order: 9\n  completion: true\nrules:\n- small tasks\nagentInstructions: be nice\n---\n\nNotes here\n",
        );
        let loaded = load(&path).expect("load");
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.board.title, "Sprint");
        assert_eq!(loaded.board.version, Some(serde_json::json!(2)));
        assert_eq!(loaded.board.columns.len(), 2);
        assert_eq!(loaded.board.columns[1].order, Some(9));
        assert!(loaded.board.columns[1].completion);
        assert!(loaded.board.columns.iter().all(|c| c.tasks.is_empty()));
        assert_eq!(loaded.board.agent_instructions.as_deref(), Some("be nice"));
        assert_eq!(loaded.body, "Notes here\n");
    }

    #[test]
    fn duplicate_columns_become_warnings() {
        let (_dir, path) = write_config(
            "---\ntitle: B\ncolumns:\n- id: todo\n  title: First\n- id: todo\n  title: Second\n---\n",
        );
        let loaded = load(&path).expect("load");
        assert_eq!(loaded.board.columns.len(), 1);
        assert_eq!(loaded.board.columns[0].title, "First");
        assert_eq!(
            loaded.warnings,
            vec![ConfigWarning::DuplicateColumn {
                id: "todo".to_string(),
                index: 1
            }]
        );
    }

    #[test]
    fn embedded_tasks_are_stripped_with_warning() {
        let (_dir, path) = write_config(
            "---\ntitle: B\ncolumns:\n- id: todo\n  title: To Do\n  tasks:\n  - id: task-1\n    title: One\n---\n",
        );
        let loaded = load(&path).expect("load");
        assert!(loaded.board.columns[0].tasks.is_empty());
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn blank_column_id_rejected() {
        let (_dir, path) = write_config("---\ntitle: B\ncolumns:\n- id: ''\n  title: X\n---\n");
        assert!(matches!(load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_front_matter_rejected() {
        let (_dir, path) = write_config("# Just markdown\n");
        assert!(matches!(load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load(dir.path().join("absent.md")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn save_writes_config_without_tasks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.md");
        let mut board = Board::new("Saved");
        board.columns = Board::default_columns();
        board.columns[0].tasks.push(crate::task::TaskRecord {
            id: "task-1".to_string(),
            title: "One".to_string(),
            ..Default::default()
        });

        save(&path, &board, "").expect("save");
        let loaded = load(&path).expect("load");
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.board, board.without_tasks());
    }
}
