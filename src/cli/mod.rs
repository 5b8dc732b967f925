//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::workspace::DEFAULT_CONFIG_FILE;

mod board;
mod init;
mod task;

/// taskboard - file-per-task kanban boards
///
/// Stores each task as its own markdown file next to a small board config,
/// and reassembles, hashes, and diffs whole boards.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the board config file
    #[arg(long, global = true, env = "TASKBOARD_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Author recorded on log notes
    #[arg(long, global = true, env = "TASKBOARD_AUTHOR")]
    pub author: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the board directories and a default config
    Init {
        /// Board title for a new config
        #[arg(long, default_value = "Board")]
        title: String,
    },

    /// Task record commands
    #[command(subcommand)]
    Task(TaskCommands),

    /// Whole-board commands
    #[command(subcommand)]
    Board(BoardCommands),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    New {
        /// Task title
        title: String,

        /// Column id (defaults to the first configured column)
        #[arg(long)]
        column: Option<String>,

        /// Sort key within the column (defaults to the end of the column)
        #[arg(long)]
        position: Option<f64>,

        /// Explicit id instead of the next `{prefix}-N`
        #[arg(long)]
        id: Option<String>,

        /// Document type; also the id prefix (e.g. epic)
        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        assignee: Option<String>,

        /// Parent task id
        #[arg(long)]
        parent: Option<String>,

        #[arg(long)]
        due: Option<String>,

        /// Written to the body's Description section
        #[arg(long)]
        description: Option<String>,

        /// Subtask title (repeatable)
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// List tasks
    List {
        #[arg(long)]
        column: Option<String>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        assignee: Option<String>,

        /// Only children of this task
        #[arg(long)]
        parent: Option<String>,

        /// List the archive instead of active tasks
        #[arg(long)]
        archived: bool,
    },

    /// Show one task
    Show {
        id: String,
    },

    /// Move a task to a column
    Move {
        id: String,

        column: String,

        #[arg(long)]
        position: Option<f64>,
    },

    /// Complete a task and move it to the archive
    Done {
        id: String,
    },

    /// Delete a task file
    Rm {
        id: String,
    },

    /// Append a note to the task's log
    Note {
        id: String,

        text: String,
    },

    /// Search titles, descriptions, bodies, and tags
    Search {
        query: String,

        /// Search the archive instead of active tasks
        #[arg(long)]
        archived: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Print the reconstructed board
    Show,

    /// Print the board's content hash
    Hash,

    /// Compare this board against another board config
    Diff {
        /// Config path of the other board (the newer snapshot)
        other: PathBuf,
    },

    /// Convert a single-document board into one file per task
    Migrate,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = Context {
            config: self.config,
            author: self.author,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init { title } => init::run(&ctx, &title),
            Commands::Task(cmd) => match cmd {
                TaskCommands::New {
                    title,
                    column,
                    position,
                    id,
                    kind,
                    priority,
                    tags,
                    assignee,
                    parent,
                    due,
                    description,
                    subtasks,
                } => task::run_new(
                    &ctx,
                    task::NewOptions {
                        title,
                        column,
                        position,
                        id,
                        kind,
                        priority,
                        tags,
                        assignee,
                        parent,
                        due,
                        description,
                        subtasks,
                    },
                ),
                TaskCommands::List {
                    column,
                    tag,
                    priority,
                    assignee,
                    parent,
                    archived,
                } => task::run_list(
                    &ctx,
                    task::ListOptions {
                        column,
                        tag,
                        priority,
                        assignee,
                        parent,
                        archived,
                    },
                ),
                TaskCommands::Show { id } => task::run_show(&ctx, &id),
                TaskCommands::Move {
                    id,
                    column,
                    position,
                } => task::run_move(&ctx, &id, &column, position),
                TaskCommands::Done { id } => task::run_done(&ctx, &id),
                TaskCommands::Rm { id } => task::run_rm(&ctx, &id),
                TaskCommands::Note { id, text } => task::run_note(&ctx, &id, &text),
                TaskCommands::Search { query, archived } => {
                    task::run_search(&ctx, &query, archived)
                }
            },
            Commands::Board(cmd) => match cmd {
                BoardCommands::Show => board::run_show(&ctx),
                BoardCommands::Hash => board::run_hash(&ctx),
                BoardCommands::Diff { other } => board::run_diff(&ctx, &other),
                BoardCommands::Migrate => board::run_migrate(&ctx),
            },
        }
    }
}

/// Global options shared by every command
pub struct Context {
    pub config: PathBuf,
    pub author: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl Context {
    pub fn output(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}
