//! taskboard task command implementations.

use serde::Serialize;

use crate::board::compose_body;
use crate::cli::Context;
use crate::config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::store::{TaskLocation, TaskState, TaskStore};
use crate::task::{NewTask, StoredTask, TaskFilter};
use crate::workspace::Workspace;

pub struct NewOptions {
    pub title: String,
    pub column: Option<String>,
    pub position: Option<f64>,
    pub id: Option<String>,
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    pub parent: Option<String>,
    pub due: Option<String>,
    pub description: Option<String>,
    pub subtasks: Vec<String>,
}

pub struct ListOptions {
    pub column: Option<String>,
    pub tag: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub parent: Option<String>,
    pub archived: bool,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    tasks: &'a [StoredTask],
}

fn open_store(ctx: &Context) -> Result<(Workspace, TaskStore)> {
    let workspace = Workspace::resolve(&ctx.config);
    if !workspace.is_v2() {
        return Err(Error::Validation(format!(
            "{} has no board/ directory; run `taskboard init` or `taskboard board migrate`",
            workspace.config_dir.display()
        )));
    }
    let store = TaskStore::for_workspace(&workspace);
    Ok((workspace, store))
}

fn locate(store: &TaskStore, id: &str) -> Result<TaskLocation> {
    store
        .locate(id.trim())
        .ok_or_else(|| Error::TaskNotFound(id.trim().to_string()))
}

fn locate_active(store: &TaskStore, id: &str) -> Result<StoredTask> {
    let location = locate(store, id)?;
    if location.state == TaskState::Archived {
        return Err(Error::Validation(format!("task {id} is already archived")));
    }
    Ok(location.task)
}

fn task_line(task: &StoredTask) -> String {
    match task.record.column.as_deref() {
        Some(column) if task.record.is_active() => {
            format!("{} [{}] {}", task.record.id, column, task.record.title)
        }
        _ if task.record.is_archived() => {
            format!("{} [archived] {}", task.record.id, task.record.title)
        }
        _ => format!("{} {}", task.record.id, task.record.title),
    }
}

pub fn run_new(ctx: &Context, options: NewOptions) -> Result<()> {
    let (workspace, store) = open_store(ctx)?;

    let column = match options.column {
        Some(column) => column,
        None => config::read_config(&workspace.config_path)
            .ok()
            .and_then(|board| board.columns.first().map(|column| column.id.clone()))
            .unwrap_or_else(|| "todo".to_string()),
    };

    let position = options.position.or_else(|| {
        let last = store
            .list(&TaskFilter::column(column.trim()))
            .iter()
            .filter_map(|task| task.record.position)
            .fold(None, |max: Option<f64>, position| {
                Some(max.map_or(position, |max| max.max(position)))
            });
        Some(last.map_or(0.0, |last| last.floor() + 1.0))
    });

    let body = compose_body(options.description.as_deref(), None);
    let task = store.create(
        NewTask {
            id: options.id,
            title: options.title,
            column,
            position,
            priority: options.priority,
            tags: options.tags,
            assignee: options.assignee,
            due_date: options.due,
            subtasks: options.subtasks,
            parent_id: options.parent,
            kind: options.kind,
            ..NewTask::default()
        },
        &body,
    )?;

    let mut human = HumanOutput::new("Task created");
    human.field("ID", task.record.id.clone());
    human.field("Column", task.record.column.clone().unwrap_or_default());
    human.field("Path", task.path.display().to_string());

    emit_success(ctx.output(), "task new", &task, Some(&human))
}

pub fn run_list(ctx: &Context, options: ListOptions) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let filter = TaskFilter {
        column: options.column,
        tag: options.tag,
        priority: options.priority,
        assignee: options.assignee,
        parent_id: options.parent,
    };
    let tasks = if options.archived {
        store.list_archived(&filter)
    } else {
        store.list(&filter)
    };

    let mut human = HumanOutput::new(format!("{} task(s)", tasks.len()));
    for task in &tasks {
        human.line(task_line(task));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: &tasks,
    };
    emit_success(ctx.output(), "task list", &output, Some(&human))
}

pub fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let location = locate(&store, id)?;
    let task = &location.task;

    let mut human = HumanOutput::new(format!("{}: {}", task.record.id, task.record.title));
    match location.state {
        TaskState::Active => {
            human.field("Column", task.record.column.clone().unwrap_or_default());
        }
        TaskState::Archived => human.field("Archived", ""),
    }
    if let Some(priority) = &task.record.priority {
        human.field("Priority", priority.clone());
    }
    if !task.record.tags.is_empty() {
        human.field("Tags", task.record.tags.join(", "));
    }
    if let Some(assignee) = &task.record.assignee {
        human.field("Assignee", assignee.clone());
    }
    if let Some(parent) = &task.record.parent_id {
        human.field("Parent", parent.clone());
    }
    human.field("Path", task.path.display().to_string());
    for line in task.body.lines() {
        human.line(line.to_string());
    }

    emit_success(ctx.output(), "task show", &location, Some(&human))
}

pub fn run_move(ctx: &Context, id: &str, column: &str, position: Option<f64>) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let current = locate_active(&store, id)?;
    let task = store.move_task(&current.path, column, position)?;

    let mut human = HumanOutput::new("Task moved");
    human.field("ID", task.record.id.clone());
    human.field("Column", column.trim().to_string());
    emit_success(ctx.output(), "task move", &task, Some(&human))
}

pub fn run_done(ctx: &Context, id: &str) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let current = locate_active(&store, id)?;
    let task = store.complete(&current.path)?;

    let mut human = HumanOutput::new("Task completed");
    human.field("ID", task.record.id.clone());
    human.field("Archived to", task.path.display().to_string());
    emit_success(ctx.output(), "task done", &task, Some(&human))
}

pub fn run_rm(ctx: &Context, id: &str) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let current = locate(&store, id)?;
    let task = store.delete(&current.task.path)?;

    let mut human = HumanOutput::new("Task deleted");
    human.field("ID", task.record.id.clone());
    emit_success(ctx.output(), "task rm", &task, Some(&human))
}

pub fn run_note(ctx: &Context, id: &str, text: &str) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let current = locate(&store, id)?;
    let task = store.append_note(&current.task.path, text, ctx.author.as_deref())?;

    let mut human = HumanOutput::new("Note added");
    human.field("ID", task.record.id.clone());
    emit_success(ctx.output(), "task note", &task, Some(&human))
}

pub fn run_search(ctx: &Context, query: &str, archived: bool) -> Result<()> {
    let (_workspace, store) = open_store(ctx)?;
    let tasks = if archived {
        store.search_archived(query)?
    } else {
        store.search(query)?
    };

    let mut human = HumanOutput::new(format!("{} match(es) for '{}'", tasks.len(), query.trim()));
    for task in &tasks {
        human.line(task_line(task));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: &tasks,
    };
    emit_success(ctx.output(), "task search", &output, Some(&human))
}
