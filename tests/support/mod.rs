#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use taskboard::store::TaskStore;
use taskboard::workspace::Workspace;
use tempfile::TempDir;

pub const CONFIG: &str = "---
title: Test Board
columns:
- id: todo
  title: To Do
- id: doing
  title: Doing
- id: done
  title: Done
  completion: true
---
";

/// A temporary workspace with a config file and both task directories
pub struct TestBoard {
    dir: TempDir,
    workspace: Workspace,
}

impl TestBoard {
    pub fn init() -> std::io::Result<Self> {
        Self::with_config(CONFIG)
    }

    pub fn with_config(config: &str) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("board.md");
        fs::write(&config_path, config)?;
        let workspace = Workspace::resolve(&config_path);
        fs::create_dir_all(&workspace.active_dir)?;
        fs::create_dir_all(&workspace.archive_dir)?;
        Ok(Self { dir, workspace })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> &Path {
        &self.workspace.config_path
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn store(&self) -> TaskStore {
        TaskStore::for_workspace(&self.workspace)
    }

    pub fn active_file(&self, name: &str) -> PathBuf {
        self.workspace.active_dir.join(name)
    }

    pub fn archive_file(&self, name: &str) -> PathBuf {
        self.workspace.archive_dir.join(name)
    }

    /// Write a raw record file into the active directory
    pub fn write_active(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.active_file(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write a raw record file into the archive directory
    pub fn write_archived(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.archive_file(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Minimal record text
pub fn record(id: &str, title: &str, column: Option<&str>) -> String {
    match column {
        Some(column) => format!("---\nid: {id}\ntitle: {title}\ncolumn: {column}\n---\n"),
        None => format!("---\nid: {id}\ntitle: {title}\n---\n"),
    }
}
