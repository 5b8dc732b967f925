//! taskboard - file-per-task kanban store
//!
//! A board is a small config document plus a directory of task files, one
//! markdown file per task. This library creates, moves, archives, and
//! searches those files, reassembles them into a single board snapshot, and
//! compares snapshots.
//!
//! # Core Concepts
//!
//! - **Task Record**: front matter fields plus a markdown body, one per file
//! - **Active / Archive stores**: `board/` holds open tasks, `logs/` completed ones
//! - **Workspace**: the directory layout derived from the config file path
//! - **Board Snapshot**: config plus all active tasks in the embedded shape
//! - **Structural Diff**: what was added, removed, updated, or moved
//!
//! # Module Organization
//!
//! - `atomic`: staged writes and write-then-remove relocation
//! - `board`: board types, reconstruction, and body section helpers
//! - `cli`: command-line interface using clap
//! - `codec`: front matter record parsing and serialization
//! - `config`: board config loading with structured warnings
//! - `diff`: structural diff between two snapshots
//! - `error`: error types and result aliases
//! - `hash`: SHA-256 content digests
//! - `migrate`: legacy single-document to file-per-task conversion
//! - `output`: human and JSON output for CLI commands
//! - `store`: task store over the active and archive directories
//! - `task`: task record model, filters, and ordering
//! - `workspace`: workspace layout resolution

pub mod atomic;
pub mod board;
pub mod cli;
pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod migrate;
pub mod output;
pub mod store;
pub mod task;
pub mod workspace;

pub use error::{Error, Result};
