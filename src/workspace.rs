//! Workspace layout resolution
//!
//! A workspace is derived entirely from the path of its board config file:
//!
//! ```text
//! <config_dir>/
//!   board.md        # config: title, columns, rules
//!   board/          # active task files
//!   logs/           # archived task files
//! ```
//!
//! The presence of `board/` is what marks a workspace as using the
//! file-per-task layout. Without it the config file is a legacy single
//! document with tasks embedded in its columns.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Name of the active task directory
pub const ACTIVE_DIR: &str = "board";

/// Name of the archive directory
pub const ARCHIVE_DIR: &str = "logs";

/// Conventional config file name used by `taskboard init`
pub const DEFAULT_CONFIG_FILE: &str = "board.md";

/// Resolved directory layout for one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub config_dir: PathBuf,
    pub active_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Workspace {
    /// Derive the layout from a config file path. Does not touch the disk.
    pub fn resolve(config_path: impl AsRef<Path>) -> Self {
        let config_path = config_path.as_ref();
        let config_dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            active_dir: config_dir.join(ACTIVE_DIR),
            archive_dir: config_dir.join(ARCHIVE_DIR),
            config_dir,
            config_path: config_path.to_path_buf(),
        }
    }

    /// True when the active directory exists (file-per-task layout)
    pub fn is_v2(&self) -> bool {
        self.active_dir.is_dir()
    }

    /// Create the active and archive directories if missing
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.active_dir)?;
        fs::create_dir_all(&self.archive_dir)?;
        Ok(())
    }
}

pub fn resolve(config_path: impl AsRef<Path>) -> Workspace {
    Workspace::resolve(config_path)
}

pub fn is_v2(config_path: impl AsRef<Path>) -> bool {
    Workspace::resolve(config_path).is_v2()
}

pub fn ensure(config_path: impl AsRef<Path>) -> Result<Workspace> {
    let workspace = Workspace::resolve(config_path);
    workspace.ensure()?;
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_derives_sibling_directories() {
        let ws = resolve("/work/project/board.md");
        assert_eq!(ws.config_dir, PathBuf::from("/work/project"));
        assert_eq!(ws.active_dir, PathBuf::from("/work/project/board"));
        assert_eq!(ws.archive_dir, PathBuf::from("/work/project/logs"));
        assert_eq!(ws.config_path, PathBuf::from("/work/project/board.md"));
    }

    #[test]
    fn resolve_bare_file_name_uses_current_dir() {
        let ws = resolve("board.md");
        assert_eq!(ws.config_dir, PathBuf::from("."));
        assert_eq!(ws.active_dir, PathBuf::from("./board"));
    }

    #[test]
    fn is_v2_tracks_active_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("board.md");
        assert!(!is_v2(&config));

        let ws = ensure(&config).expect("ensure");
        assert!(ws.active_dir.is_dir());
        assert!(ws.archive_dir.is_dir());
        assert!(is_v2(&config));

        // idempotent
        ensure(&config).expect("ensure again");
    }

    #[test]
    fn archive_dir_alone_is_not_v2() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("board.md");
        fs::create_dir_all(dir.path().join(ARCHIVE_DIR)).expect("mkdir");
        assert!(!is_v2(&config));
    }
}
