use std::fs;

use taskboard::board::{build_full_board, load_board, Board};
use taskboard::error::Error;
use taskboard::store::TaskStore;
use taskboard::workspace::Workspace;

mod support;

use support::{record, TestBoard};

fn ids(board: &Board, column: &str) -> Vec<String> {
    board
        .column(column)
        .map(|column| column.tasks.iter().map(|task| task.id.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn columns_keep_declared_order_and_tasks_sort_by_position_then_id() {
    let board = TestBoard::init().expect("board");
    board
        .write_active("1.md", "---\nid: task-b\ntitle: B\ncolumn: todo\nposition: 2\n---\n")
        .expect("write");
    board
        .write_active("2.md", "---\nid: task-a\ntitle: A\ncolumn: todo\nposition: 2\n---\n")
        .expect("write");
    board
        .write_active("3.md", "---\nid: task-c\ntitle: C\ncolumn: todo\n---\n")
        .expect("write");
    board
        .write_active("4.md", "---\nid: task-d\ntitle: D\ncolumn: todo\nposition: 0.5\n---\n")
        .expect("write");
    board
        .write_active("5.md", "---\nid: task-e\ntitle: E\ncolumn: done\nposition: 1\n---\n")
        .expect("write");

    let full = build_full_board(board.config_path()).expect("build");
    let column_ids: Vec<&str> = full.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(column_ids, vec!["todo", "doing", "done"]);
    assert_eq!(ids(&full, "todo"), vec!["task-d", "task-a", "task-b", "task-c"]);
    assert!(ids(&full, "doing").is_empty());
    assert_eq!(ids(&full, "done"), vec!["task-e"]);
    assert_eq!(full.title, "Test Board");
}

#[test]
fn rebuild_is_stable_across_calls() {
    let board = TestBoard::init().expect("board");
    for n in 1..=5 {
        board
            .write_active(
                &format!("task-{n}.md"),
                &record(&format!("task-{n}"), &format!("Task {n}"), Some("doing")),
            )
            .expect("write");
    }
    let first = build_full_board(board.config_path()).expect("build");
    let second = build_full_board(board.config_path()).expect("build");
    assert_eq!(first, second);
    assert_eq!(first.task_count(), 5);
}

#[test]
fn description_backfills_from_body_unless_front_matter_has_one() {
    let board = TestBoard::init().expect("board");
    board
        .write_active(
            "task-1.md",
            "---\nid: task-1\ntitle: One\ncolumn: todo\n---\n\n## Description\nFrom the body\n\n## Log\n- note\n",
        )
        .expect("write");
    board
        .write_active(
            "task-2.md",
            "---\nid: task-2\ntitle: Two\ncolumn: todo\ndescription: From fields\n---\n\n## Description\nFrom the body\n",
        )
        .expect("write");
    board
        .write_active(
            "task-3.md",
            "---\nid: task-3\ntitle: Three\ncolumn: todo\n---\n\nJust prose\n",
        )
        .expect("write");

    let full = build_full_board(board.config_path()).expect("build");
    let todo = full.column("todo").expect("todo column");
    assert_eq!(todo.tasks[0].description.as_deref(), Some("From the body"));
    assert_eq!(todo.tasks[1].description.as_deref(), Some("From fields"));
    assert_eq!(todo.tasks[2].description, None);
}

#[test]
fn unplaced_tasks_land_in_implicit_todo_column() {
    let board = TestBoard::with_config(
        "---\ntitle: No todo\ncolumns:\n- id: doing\n  title: Doing\n- id: done\n  title: Done\n---\n",
    )
    .expect("board");
    board
        .write_active("task-1.md", &record("task-1", "Lost", Some("ghost")))
        .expect("write");
    board
        .write_active("task-2.md", &record("task-2", "Placed", Some("doing")))
        .expect("write");
    board
        .write_active("task-3.md", &record("task-3", "Homeless", None))
        .expect("write");

    let full = build_full_board(board.config_path()).expect("build");
    let column_ids: Vec<&str> = full.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(column_ids, vec!["doing", "done", "todo"]);
    assert_eq!(ids(&full, "todo"), vec!["task-1", "task-3"]);
    assert_eq!(ids(&full, "doing"), vec!["task-2"]);
}

#[test]
fn unknown_column_goes_to_declared_todo() {
    let board = TestBoard::init().expect("board");
    board
        .write_active("task-1.md", &record("task-1", "Lost", Some("review")))
        .expect("write");

    let full = build_full_board(board.config_path()).expect("build");
    assert_eq!(full.columns.len(), 3);
    assert_eq!(ids(&full, "todo"), vec!["task-1"]);
}

#[test]
fn archived_tasks_are_not_on_the_board() {
    let board = TestBoard::init().expect("board");
    let store = board.store();
    let task = store
        .create(taskboard::task::NewTask::new("Finish", "doing"), "")
        .expect("create");
    store.complete(&task.path).expect("complete");

    let full = build_full_board(board.config_path()).expect("build");
    assert_eq!(full.task_count(), 0);
}

#[test]
fn embedded_config_tasks_are_ignored_in_per_file_layout() {
    let board = TestBoard::with_config(
        "---\ntitle: Mixed\ncolumns:\n- id: todo\n  title: To Do\n  tasks:\n  - id: task-9\n    title: Stale\n---\n",
    )
    .expect("board");
    board
        .write_active("task-1.md", &record("task-1", "Fresh", Some("todo")))
        .expect("write");

    let full = build_full_board(board.config_path()).expect("build");
    assert_eq!(ids(&full, "todo"), vec!["task-1"]);
}

#[test]
fn load_board_reads_legacy_document_without_task_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("kanban.md");
    fs::write(
        &config_path,
        "---\ntitle: Legacy\ncolumns:\n- id: todo\n  title: To Do\n  tasks:\n  - id: task-2\n    title: Second\n  - id: task-1\n    title: First\n---\n",
    )
    .expect("write");

    assert!(!Workspace::resolve(&config_path).is_v2());
    let board = load_board(&config_path).expect("load");
    assert_eq!(board.title, "Legacy");
    assert_eq!(ids(&board, "todo"), vec!["task-2", "task-1"]);
}

#[test]
fn load_board_uses_task_dir_when_present() {
    let board = TestBoard::init().expect("board");
    board
        .write_active("task-1.md", &record("task-1", "One", Some("todo")))
        .expect("write");
    let loaded = load_board(board.config_path()).expect("load");
    assert_eq!(loaded, build_full_board(board.config_path()).expect("build"));
}

#[test]
fn missing_config_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_board(dir.path().join("absent.md")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn malformed_config_is_invalid_config() {
    let board = TestBoard::with_config("title: no front matter\n").expect("board");
    let err = build_full_board(board.config_path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn workspace_dirs_sit_next_to_config() {
    let board = TestBoard::init().expect("board");
    let ws = board.workspace();
    assert_eq!(ws.config_dir, board.path());
    assert_eq!(ws.active_dir, board.path().join("board"));
    assert_eq!(ws.archive_dir, board.path().join("logs"));
    assert!(ws.is_v2());

    let store = TaskStore::for_workspace(ws);
    assert_eq!(store.active_dir(), ws.active_dir.as_path());
    assert_eq!(store.archive_dir(), ws.archive_dir.as_path());
}
